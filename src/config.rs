/// What to do with a byte that does not decode to an [`Opcode`].
///
/// [`Opcode`]: crate::opcode::Opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOpcode {
  /// Skip it. The opcode byte has already been consumed, so execution carries
  /// on at the following byte.
  #[default]
  Ignore,
  /// Fail the step with [`Error::InvalidOpcode`].
  ///
  /// [`Error::InvalidOpcode`]: crate::error::Error::InvalidOpcode
  Fault,
}

/// When a run loop should stop. There is no halt instruction, so this is
/// always the host's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
  /// Stop after this many steps
  Steps(usize),
  /// Stop before executing when the byte at `ip` equals this value
  Sentinel(u8),
  /// Stop when `ip` reaches this address
  Address(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
  pub unknown_opcode: UnknownOpcode,
}

impl Config {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_unknown_opcode(mut self, policy: UnknownOpcode) -> Self {
    self.unknown_opcode = policy;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_ignores_unknown_opcodes() {
    assert_eq!(Config::new().unknown_opcode, UnknownOpcode::Ignore);
  }

  #[test]
  fn builder() {
    let config = Config::new().with_unknown_opcode(UnknownOpcode::Fault);
    assert_eq!(config.unknown_opcode, UnknownOpcode::Fault);
  }
}
