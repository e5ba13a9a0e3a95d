use std::env;
use std::error::Error;

use emulator::config::{Config, Halt};
use emulator::cpu::Cpu;
use emulator::memory::{self, Ram};
use emulator::opcode::Opcode::*;
use emulator::register::Register::*;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

const MEMORY_SIZE: usize = 0x1_0000;
const SENTINEL: u8 = 0xFF;
const DEFAULT_BUDGET: usize = 1_000;

fn main() -> Result<(), Box<dyn Error>> {
  SimpleLogger::new().with_level(LevelFilter::Debug).init()?;

  let budget = match env::args().nth(1) {
    Some(arg) => arg.parse()?,
    None => DEFAULT_BUDGET,
  };

  #[rustfmt::skip]
  let program = [
    MovLitReg as u8, 0x12, 0x34, R1.index(),       // 0x00
    MovLitReg as u8, 0xAB, 0xCD, R2.index(),       // 0x04
    AddRegReg as u8, R1.index(), R2.index(),       // 0x08
    MovRegMem as u8, Acc.index(), 0x01, 0x00,      // 0x0b
    PshReg as u8, R1.index(),                      // 0x0f
    PshLit as u8, 0x00, 0x05,                      // 0x11
    Pop as u8, R3.index(),                         // 0x14
    MovLitReg as u8, 0xFF, 0xFF, R4.index(),       // 0x16
    AddRegReg as u8, R3.index(), R4.index(),       // 0x1a
    MovRegReg as u8, Acc.index(), R3.index(),      // 0x1d
    JmpNotEq as u8, 0x00, 0x00, 0x00, 0x1A,        // 0x20
    SENTINEL,                                      // 0x25
  ];

  let mut ram = Ram::new(MEMORY_SIZE);
  ram.load(0, &program)?;
  let mut cpu = Cpu::with_config(&ram, Config::default())?;

  let steps = cpu.run(&mut ram, Halt::Sentinel(SENTINEL), budget)?;
  info!("halted after {steps} steps\n{cpu}");
  info!("{}", memory::view(&ram, 0x0100, 8)?);
  info!("{}", memory::view(&ram, cpu.register(Sp) as usize, 4)?);
  Ok(())
}
