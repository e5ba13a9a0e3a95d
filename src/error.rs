/// An error that occurred while accessing or running the machine
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("no such register `{0}`")]
  InvalidRegisterName(String),

  #[error("access at {address:#06x} is out of bounds for {len} bytes")]
  OutOfBounds { address: usize, len: usize },

  #[error("unknown opcode {0:#04x}")]
  InvalidOpcode(u8),

  #[error("memory of {0} bytes cannot back a 16-bit stack pointer")]
  InvalidMemorySize(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
