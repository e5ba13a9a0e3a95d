use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::memory::Memory;

/// The named registers, in bank order. A register's raw operand index is its
/// position here, and its byte offset in the bank is twice that.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
  Ip,
  Acc,
  R1,
  R2,
  R3,
  R4,
  R5,
  R6,
  R7,
  R8,
  Sp,
  Fp,
}

impl Register {
  pub const ALL: [Register; 12] = [
    Self::Ip,
    Self::Acc,
    Self::R1,
    Self::R2,
    Self::R3,
    Self::R4,
    Self::R5,
    Self::R6,
    Self::R7,
    Self::R8,
    Self::Sp,
    Self::Fp,
  ];

  /// Operand index used to name this register inside an instruction
  pub fn index(self) -> u8 {
    self as u8
  }

  pub fn offset(self) -> usize {
    self.index() as usize * 2
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Ip => "ip",
      Self::Acc => "acc",
      Self::R1 => "r1",
      Self::R2 => "r2",
      Self::R3 => "r3",
      Self::R4 => "r4",
      Self::R5 => "r5",
      Self::R6 => "r6",
      Self::R7 => "r7",
      Self::R8 => "r8",
      Self::Sp => "sp",
      Self::Fp => "fp",
    }
  }
}

impl FromStr for Register {
  type Err = Error;

  fn from_str(name: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|reg| reg.name() == name)
      .ok_or_else(|| Error::InvalidRegisterName(name.to_string()))
  }
}

impl fmt::Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Size in bytes of the register bank
pub const BANK_SIZE: usize = Register::ALL.len() * 2;

/// Contiguous big-endian storage for every register.
///
/// Named access through [`Register`] can never leave the bank. Raw access by
/// operand index goes through [`Memory`] and is bounds checked, so a bad index
/// in an instruction surfaces as [`Error::OutOfBounds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBank {
  bytes: [u8; BANK_SIZE],
}

impl RegisterBank {
  pub fn new() -> Self {
    Self {
      bytes: [0; BANK_SIZE],
    }
  }

  pub fn get(&self, reg: Register) -> u16 {
    let at = reg.offset();
    u16::from_be_bytes([self.bytes[at], self.bytes[at + 1]])
  }

  pub fn set(&mut self, reg: Register, value: u16) {
    let at = reg.offset();
    self.bytes[at..at + 2].copy_from_slice(&value.to_be_bytes());
  }

  pub fn get_raw(&self, index: u8) -> Result<u16> {
    self.get_u16(index as usize * 2)
  }

  pub fn set_raw(&mut self, index: u8, value: u16) -> Result<()> {
    self.set_u16(index as usize * 2, value)
  }
}

impl Default for RegisterBank {
  fn default() -> Self {
    Self::new()
  }
}

impl Memory for RegisterBank {
  fn byte_len(&self) -> usize {
    BANK_SIZE
  }

  fn get_u8(&self, address: usize) -> Result<u8> {
    self.bytes.get(address).copied().ok_or(Error::OutOfBounds {
      address,
      len: BANK_SIZE,
    })
  }

  fn set_u8(&mut self, address: usize, value: u8) -> Result<()> {
    let slot = self.bytes.get_mut(address).ok_or(Error::OutOfBounds {
      address,
      len: BANK_SIZE,
    })?;
    *slot = value;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod register {
    use super::*;

    #[test]
    fn offsets_follow_declaration_order() {
      for (i, reg) in Register::ALL.into_iter().enumerate() {
        assert_eq!(reg.offset(), i * 2);
      }
      assert_eq!(Register::Ip.offset(), 0);
      assert_eq!(Register::R1.index(), 2);
      assert_eq!(Register::Fp.offset(), 22);
    }

    #[test]
    fn parse_names() {
      for reg in Register::ALL {
        assert_eq!(reg.name().parse::<Register>(), Ok(reg));
      }
    }

    #[test]
    fn parse_is_case_sensitive() {
      assert_eq!(
        "IP".parse::<Register>(),
        Err(Error::InvalidRegisterName("IP".to_string()))
      );
      assert!("r9".parse::<Register>().is_err());
      assert!("".parse::<Register>().is_err());
    }
  }

  mod bank {
    use super::*;

    #[test]
    fn new_is_zeroed() {
      let bank = RegisterBank::new();
      for reg in Register::ALL {
        assert_eq!(bank.get(reg), 0);
      }
    }

    #[test]
    fn named_and_raw_agree() {
      let mut bank = RegisterBank::new();
      bank.set(Register::R3, 0x1234);
      assert_eq!(bank.get_raw(Register::R3.index()), Ok(0x1234));
      bank.set_raw(Register::Sp.index(), 0xBEEF).unwrap();
      assert_eq!(bank.get(Register::Sp), 0xBEEF);
    }

    #[test]
    fn raw_index_past_the_bank() {
      let mut bank = RegisterBank::new();
      assert_eq!(
        bank.get_raw(12),
        Err(Error::OutOfBounds {
          address: 24,
          len: BANK_SIZE,
        })
      );
      assert!(bank.set_raw(0xFF, 1).is_err());
      assert_eq!(bank, RegisterBank::new());
    }
  }
}
