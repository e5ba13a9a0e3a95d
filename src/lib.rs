//! A tiny 16-bit virtual CPU
//!
//! Twelve 16-bit registers, a byte-addressable memory and a handful of
//! variable-length instructions: moves, an add, a conditional jump, and a
//! downward-growing stack. The machine has no halt instruction, so the host
//! decides when to stop stepping (see [`config::Halt`]).

pub mod config;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod opcode;
pub mod register;
