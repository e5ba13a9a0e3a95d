use std::fmt;

use log::{debug, trace, warn};

use crate::config::{Config, Halt, UnknownOpcode};
use crate::error::{Error, Result};
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::register::{Register, RegisterBank};

/// The largest memory whose top word is still addressable by a 16-bit `sp`
const MAX_MEMORY: usize = 0x1_0000;

/// A 16-bit CPU driven one instruction at a time.
///
/// The CPU only owns its registers. Memory belongs to the caller and is lent
/// to every call that needs it, so the same buffer can be inspected or patched
/// between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
  registers: RegisterBank,
  config: Config,
}

impl Cpu {
  /// Create a CPU over `memory` with the default configuration
  pub fn new<M>(memory: &M) -> Result<Self>
  where
    M: Memory + ?Sized,
  {
    Self::with_config(memory, Config::default())
  }

  /// Create a CPU over `memory`, with zeroed registers except `sp` and `fp`,
  /// which both point at the last full word of memory
  pub fn with_config<M>(memory: &M, config: Config) -> Result<Self>
  where
    M: Memory + ?Sized,
  {
    let len = memory.byte_len();
    if !(2..=MAX_MEMORY).contains(&len) {
      return Err(Error::InvalidMemorySize(len));
    }
    let top = (len - 2) as u16;
    let mut registers = RegisterBank::new();
    registers.set(Register::Sp, top);
    registers.set(Register::Fp, top);
    Ok(Self { registers, config })
  }

  pub fn config(&self) -> Config {
    self.config
  }

  /// Read a register by name
  pub fn get_register(&self, name: &str) -> Result<u16> {
    let reg: Register = name.parse()?;
    Ok(self.registers.get(reg))
  }

  /// Write a register by name
  pub fn set_register(&mut self, name: &str, value: u16) -> Result<()> {
    let reg: Register = name.parse()?;
    self.registers.set(reg, value);
    Ok(())
  }

  pub fn register(&self, reg: Register) -> u16 {
    self.registers.get(reg)
  }

  pub fn set(&mut self, reg: Register, value: u16) {
    self.registers.set(reg, value);
  }

  /// Every register and its value, in bank order
  pub fn registers(&self) -> impl Iterator<Item = (Register, u16)> + '_ {
    Register::ALL
      .into_iter()
      .map(|reg| (reg, self.registers.get(reg)))
  }

  /// Read the byte at `ip` and move `ip` past it
  pub fn fetch8<M>(&mut self, memory: &M) -> Result<u8>
  where
    M: Memory + ?Sized,
  {
    let ip = self.registers.get(Register::Ip);
    let byte = memory.get_u8(ip as usize)?;
    self.registers.set(Register::Ip, ip.wrapping_add(1));
    Ok(byte)
  }

  /// Read the word at `ip` and move `ip` past it
  pub fn fetch16<M>(&mut self, memory: &M) -> Result<u16>
  where
    M: Memory + ?Sized,
  {
    let ip = self.registers.get(Register::Ip);
    let word = memory.get_u16(ip as usize)?;
    self.registers.set(Register::Ip, ip.wrapping_add(2));
    Ok(word)
  }

  /// Execute an already fetched opcode, consuming its operands from memory
  pub fn execute<M>(&mut self, opcode: u8, memory: &mut M) -> Result<()>
  where
    M: Memory + ?Sized,
  {
    let op = match Opcode::try_from(opcode) {
      Ok(op) => op,
      Err(err) => match self.config.unknown_opcode {
        UnknownOpcode::Ignore => {
          warn!("ignoring unknown opcode {opcode:#04x}");
          return Ok(());
        }
        UnknownOpcode::Fault => return Err(err),
      },
    };
    let mut task = Task::new(self, memory);
    task.run(op)
  }

  /// Fetch and execute a single instruction
  pub fn step<M>(&mut self, memory: &mut M) -> Result<()>
  where
    M: Memory + ?Sized,
  {
    let ip = self.registers.get(Register::Ip);
    let opcode = self.fetch8(&*memory)?;
    trace!("{ip:#06x}: {opcode:#04x}");
    self.execute(opcode, memory)
  }

  /// Step until `stop` returns true or `max_steps` instructions have run.
  ///
  /// `stop` is asked before every step. Returns how many steps ran.
  pub fn run_until<M, F>(&mut self, memory: &mut M, mut stop: F, max_steps: usize) -> Result<usize>
  where
    M: Memory + ?Sized,
    F: FnMut(&Cpu, &M) -> bool,
  {
    let mut steps = 0;
    while steps < max_steps && !stop(self, memory) {
      self.step(memory)?;
      steps += 1;
    }
    Ok(steps)
  }

  /// Step under a [`Halt`] policy, never running more than `max_steps`
  pub fn run<M>(&mut self, memory: &mut M, halt: Halt, max_steps: usize) -> Result<usize>
  where
    M: Memory + ?Sized,
  {
    match halt {
      Halt::Steps(n) => self.run_until(memory, |_, _| false, n.min(max_steps)),
      Halt::Sentinel(byte) => self.run_until(
        memory,
        |cpu, memory| {
          let ip = cpu.register(Register::Ip) as usize;
          memory.get_u8(ip) == Ok(byte)
        },
        max_steps,
      ),
      Halt::Address(address) => self.run_until(
        memory,
        |cpu, _| cpu.register(Register::Ip) == address,
        max_steps,
      ),
    }
  }
}

impl fmt::Display for Cpu {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (reg, value) in self.registers() {
      writeln!(f, "{reg}: {value:#06x}")?;
    }
    Ok(())
  }
}

/// A single instruction in flight: the CPU plus the memory it was lent
struct Task<'cpu, 'mem, M: ?Sized> {
  cpu: &'cpu mut Cpu,
  memory: &'mem mut M,
}

impl<'cpu, 'mem, M> Task<'cpu, 'mem, M>
where
  M: Memory + ?Sized,
{
  fn new(cpu: &'cpu mut Cpu, memory: &'mem mut M) -> Self {
    Self { cpu, memory }
  }

  #[inline]
  fn eat8(&mut self) -> Result<u8> {
    self.cpu.fetch8(&*self.memory)
  }

  #[inline]
  fn eat16(&mut self) -> Result<u16> {
    self.cpu.fetch16(&*self.memory)
  }

  fn reg(&self, index: u8) -> Result<u16> {
    self.cpu.registers.get_raw(index)
  }

  fn set_reg(&mut self, index: u8, value: u16) -> Result<()> {
    self.cpu.registers.set_raw(index, value)
  }

  fn run(&mut self, op: Opcode) -> Result<()> {
    match op {
      Opcode::MovLitReg => mov_lit_reg(self),
      Opcode::MovRegReg => mov_reg_reg(self),
      Opcode::MovRegMem => mov_reg_mem(self),
      Opcode::MovMemReg => mov_mem_reg(self),
      Opcode::AddRegReg => add_reg_reg(self),
      Opcode::JmpNotEq => jmp_not_eq(self),
      Opcode::PshLit => psh_lit(self),
      Opcode::PshReg => psh_reg(self),
      Opcode::Pop => pop(self),
    }
  }

  fn push(&mut self, value: u16) -> Result<()> {
    let sp = self.cpu.registers.get(Register::Sp);
    self.memory.set_u16(sp as usize, value)?;
    self.cpu.registers.set(Register::Sp, sp.wrapping_sub(2));
    Ok(())
  }
}

// r[d] ← llll
fn mov_lit_reg<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let literal = task.eat16()?;
  let d = task.eat8()?;
  task.set_reg(d, literal)
}

// r[d] ← r[s]
fn mov_reg_reg<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let s = task.eat8()?;
  let d = task.eat8()?;
  let value = task.reg(s)?;
  task.set_reg(d, value)
}

// m[aaaa] ← r[s]
fn mov_reg_mem<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let s = task.eat8()?;
  let address = task.eat16()?;
  let value = task.reg(s)?;
  task.memory.set_u16(address as usize, value)
}

// r[d] ← m[aaaa]
fn mov_mem_reg<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let address = task.eat16()?;
  let d = task.eat8()?;
  let value = task.memory.get_u16(address as usize)?;
  task.set_reg(d, value)
}

// acc ← r[a] + r[b]
fn add_reg_reg<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let a = task.eat8()?;
  let b = task.eat8()?;
  let sum = task.reg(a)?.wrapping_add(task.reg(b)?);
  task.cpu.registers.set(Register::Acc, sum);
  Ok(())
}

// if llll ≠ acc : ip ← aaaa
fn jmp_not_eq<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let literal = task.eat16()?;
  let address = task.eat16()?;
  if literal != task.cpu.registers.get(Register::Acc) {
    debug!("jumping to {address:#06x}");
    task.cpu.registers.set(Register::Ip, address);
  }
  Ok(())
}

// m[sp] ← llll; sp ← sp − 2
fn psh_lit<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let literal = task.eat16()?;
  task.push(literal)
}

// m[sp] ← r[s]; sp ← sp − 2
fn psh_reg<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let s = task.eat8()?;
  let value = task.reg(s)?;
  task.push(value)
}

// sp ← sp + 2; r[d] ← m[sp]
fn pop<M>(task: &mut Task<'_, '_, M>) -> Result<()>
where
  M: Memory + ?Sized,
{
  let d = task.eat8()?;
  let sp = task.cpu.registers.get(Register::Sp);
  // the read must not wrap past the top of memory, only the register does
  let value = task.memory.get_u16(sp as usize + 2)?;
  task.set_reg(d, value)?;
  task.cpu.registers.set(Register::Sp, sp.wrapping_add(2));
  Ok(())
}
