use std::fmt;

use crate::error::Error;

/// Every instruction is one opcode byte followed by its operands. Register
/// operands are one byte (`rr`), literals and addresses are two bytes
/// (`llll`, `aaaa`), big-endian.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Moves a literal into a register.
  ///
  /// | Encoding         | Semantics/RTL |
  /// |------------------|---------------|
  /// | `10 llll rr`     | `r[r] ← llll` |
  MovLitReg = 0x10,

  /// Copies one register into another.
  ///
  /// | Encoding         | Semantics/RTL  |
  /// |------------------|----------------|
  /// | `11 rs rd`       | `r[d] ← r[s]`  |
  MovRegReg = 0x11,

  /// Stores a register into memory.
  ///
  /// | Encoding         | Semantics/RTL     |
  /// |------------------|-------------------|
  /// | `12 rs aaaa`     | `m[aaaa] ← r[s]`  |
  MovRegMem = 0x12,

  /// Loads a register from memory.
  ///
  /// | Encoding         | Semantics/RTL     |
  /// |------------------|-------------------|
  /// | `13 aaaa rd`     | `r[d] ← m[aaaa]`  |
  MovMemReg = 0x13,

  /// Adds two registers into the accumulator, wrapping on overflow.
  ///
  /// | Encoding         | Semantics/RTL         |
  /// |------------------|-----------------------|
  /// | `14 ra rb`       | `acc ← r[a] + r[b]`   |
  AddRegReg = 0x14,

  /// Jumps when the accumulator differs from a literal.
  ///
  /// | Encoding         | Semantics/RTL                  |
  /// |------------------|--------------------------------|
  /// | `15 llll aaaa`   | `if llll ≠ acc : ip ← aaaa`    |
  JmpNotEq = 0x15,

  /// | Encoding         | Semantics/RTL                 |
  /// |------------------|-------------------------------|
  /// | `17 llll`        | `m[sp] ← llll; sp ← sp − 2`   |
  PshLit = 0x17,

  /// | Encoding         | Semantics/RTL                 |
  /// |------------------|-------------------------------|
  /// | `18 rs`          | `m[sp] ← r[s]; sp ← sp − 2`   |
  PshReg = 0x18,

  /// | Encoding         | Semantics/RTL                     |
  /// |------------------|-----------------------------------|
  /// | `1A rd`          | `sp ← sp + 2; r[d] ← m[sp]`       |
  Pop = 0x1A,
}

impl Opcode {
  pub const ALL: [Opcode; 9] = [
    Self::MovLitReg,
    Self::MovRegReg,
    Self::MovRegMem,
    Self::MovMemReg,
    Self::AddRegReg,
    Self::JmpNotEq,
    Self::PshLit,
    Self::PshReg,
    Self::Pop,
  ];

  pub fn mnemonic(self) -> &'static str {
    match self {
      Self::MovLitReg => "MOV_LIT_REG",
      Self::MovRegReg => "MOV_REG_REG",
      Self::MovRegMem => "MOV_REG_MEM",
      Self::MovMemReg => "MOV_MEM_REG",
      Self::AddRegReg => "ADD_REG_REG",
      Self::JmpNotEq => "JMP_NOT_EQ",
      Self::PshLit => "PSH_LIT",
      Self::PshReg => "PSH_REG",
      Self::Pop => "POP",
    }
  }
}

impl TryFrom<u8> for Opcode {
  type Error = Error;

  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    match byte {
      0x10 => Ok(Self::MovLitReg),
      0x11 => Ok(Self::MovRegReg),
      0x12 => Ok(Self::MovRegMem),
      0x13 => Ok(Self::MovMemReg),
      0x14 => Ok(Self::AddRegReg),
      0x15 => Ok(Self::JmpNotEq),
      0x17 => Ok(Self::PshLit),
      0x18 => Ok(Self::PshReg),
      0x1A => Ok(Self::Pop),
      _ => Err(Error::InvalidOpcode(byte)),
    }
  }
}

impl From<Opcode> for u8 {
  fn from(op: Opcode) -> Self {
    op as u8
  }
}

impl fmt::Display for Opcode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.mnemonic())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode_every_opcode() {
    for op in Opcode::ALL {
      assert_eq!(Opcode::try_from(u8::from(op)), Ok(op));
    }
  }

  #[test]
  fn codes_are_distinct() {
    let mut codes: Vec<u8> = Opcode::ALL.iter().map(|op| *op as u8).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), Opcode::ALL.len());
  }

  #[test]
  fn decode_unknown() {
    assert_eq!(Opcode::try_from(0x16), Err(Error::InvalidOpcode(0x16)));
    assert_eq!(Opcode::try_from(0x00), Err(Error::InvalidOpcode(0x00)));
    assert_eq!(Opcode::try_from(0xFF), Err(Error::InvalidOpcode(0xFF)));
  }

  #[test]
  fn display_is_mnemonic() {
    assert_eq!(Opcode::JmpNotEq.to_string(), "JMP_NOT_EQ");
    assert_eq!(Opcode::Pop.to_string(), "POP");
  }
}
