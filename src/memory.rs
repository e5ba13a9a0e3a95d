use crate::error::{Error, Result};

/// Byte-addressable storage the CPU reads instructions and data from.
///
/// 16-bit accesses are big-endian and may start at any byte offset. Any access
/// that would touch a byte past [`Memory::byte_len`] fails with
/// [`Error::OutOfBounds`].
pub trait Memory {
  fn byte_len(&self) -> usize;

  fn get_u8(&self, address: usize) -> Result<u8>;

  fn set_u8(&mut self, address: usize, value: u8) -> Result<()>;

  fn get_u16(&self, address: usize) -> Result<u16> {
    let hi = self.get_u8(address)?;
    let lo = self.get_u8(address.wrapping_add(1))?;
    Ok(u16::from_be_bytes([hi, lo]))
  }

  fn set_u16(&mut self, address: usize, value: u16) -> Result<()> {
    // check the far byte first so a failed store leaves memory untouched
    let [hi, lo] = value.to_be_bytes();
    self.set_u8(address.wrapping_add(1), lo)?;
    self.set_u8(address, hi)
  }
}

/// A fixed-length block of zeroed bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
  bytes: Box<[u8]>,
}

impl Ram {
  pub fn new(len: usize) -> Self {
    Self {
      bytes: vec![0; len].into_boxed_slice(),
    }
  }

  /// Copy `bytes` into memory starting at `address`
  pub fn load(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
    let len = self.bytes.len();
    let end = address
      .checked_add(bytes.len())
      .filter(|end| *end <= len)
      .ok_or(Error::OutOfBounds { address, len })?;
    self.bytes[address..end].copy_from_slice(bytes);
    Ok(())
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }
}

impl From<Vec<u8>> for Ram {
  fn from(bytes: Vec<u8>) -> Self {
    Self {
      bytes: bytes.into_boxed_slice(),
    }
  }
}

impl Memory for Ram {
  fn byte_len(&self) -> usize {
    self.bytes.len()
  }

  fn get_u8(&self, address: usize) -> Result<u8> {
    self.bytes.get(address).copied().ok_or(Error::OutOfBounds {
      address,
      len: self.bytes.len(),
    })
  }

  fn set_u8(&mut self, address: usize, value: u8) -> Result<()> {
    let len = self.bytes.len();
    let slot = self
      .bytes
      .get_mut(address)
      .ok_or(Error::OutOfBounds { address, len })?;
    *slot = value;
    Ok(())
  }
}

/// Render `count` bytes starting at `address`, e.g. `0x0f01: 0x01 0x02 0x03`
pub fn view<M>(memory: &M, address: usize, count: usize) -> Result<String>
where
  M: Memory + ?Sized,
{
  let mut out = format!("{address:#06x}:");
  for offset in 0..count {
    let byte = memory.get_u8(address.wrapping_add(offset))?;
    out.push_str(&format!(" {byte:#04x}"));
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  mod ram {
    use super::*;

    #[test]
    fn new_is_zeroed() {
      let ram = Ram::new(16);
      assert_eq!(ram.byte_len(), 16);
      assert!(ram.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn u16_is_big_endian() {
      let mut ram = Ram::new(4);
      ram.set_u16(1, 0xABCD).unwrap();
      assert_eq!(ram.as_bytes(), &[0x00, 0xAB, 0xCD, 0x00]);
      assert_eq!(ram.get_u16(1), Ok(0xABCD));
      assert_eq!(ram.get_u8(1), Ok(0xAB));
    }

    #[test]
    fn u8_out_of_bounds() {
      let mut ram = Ram::new(4);
      let oob = Error::OutOfBounds { address: 4, len: 4 };
      assert_eq!(ram.get_u8(4), Err(oob.clone()));
      assert_eq!(ram.set_u8(4, 1), Err(oob));
    }

    #[test]
    fn u16_straddling_the_end_fails_without_writing() {
      let mut ram = Ram::new(4);
      assert_eq!(
        ram.get_u16(3),
        Err(Error::OutOfBounds { address: 4, len: 4 })
      );
      assert!(ram.set_u16(3, 0xFFFF).is_err());
      assert_eq!(ram.as_bytes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn load_copies_program() {
      let mut ram = Ram::new(8);
      ram.load(2, &[1, 2, 3]).unwrap();
      assert_eq!(ram.as_bytes(), &[0, 0, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn load_past_end() {
      let mut ram = Ram::new(4);
      assert_eq!(
        ram.load(2, &[1, 2, 3]),
        Err(Error::OutOfBounds { address: 2, len: 4 })
      );
    }
  }

  mod view {
    use super::*;

    #[test]
    fn formats_bytes() {
      let ram: Ram = vec![0x00, 0x01, 0x02, 0xFF].into();
      assert_eq!(view(&ram, 1, 3), Ok("0x0001: 0x01 0x02 0xff".to_string()));
    }

    #[test]
    fn empty_view() {
      let ram = Ram::new(4);
      assert_eq!(view(&ram, 0, 0), Ok("0x0000:".to_string()));
    }

    #[test]
    fn past_end() {
      let ram = Ram::new(4);
      assert!(view(&ram, 2, 8).is_err());
    }

    #[test]
    fn near_the_top_of_the_address_space() {
      let ram = Ram::new(4);
      assert_eq!(
        view(&ram, usize::MAX, 2),
        Err(Error::OutOfBounds {
          address: usize::MAX,
          len: 4,
        })
      );
    }
  }
}
