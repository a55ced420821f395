use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures while building a machine: bad instruction tables, oversized images, I/O.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid instruction definition for {name}: {reason}")]
    InvalidInstructionDefinition { name: String, reason: String },

    #[error("Unknown instruction name {0}")]
    UnknownMnemonic(String),

    #[error("Opcode {0:#04X} is defined more than once")]
    DuplicateOpcode(u8),

    #[error("Instruction {0} is defined more than once")]
    DuplicateMnemonic(String),

    #[error("Image is too big to fit into memory ({image} > {capacity} bytes)")]
    ImageTooLarge { image: usize, capacity: usize },

    #[error("Memory of {0} bytes is not addressable with 16-bit addresses")]
    MemoryTooLarge(usize),

    #[error("Invalid value {value:?} for {key}")]
    InvalidConfig { key: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every reason the machine can halt. The display text is the recorded halt reason.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    #[error("HALT instruction")]
    HaltInstruction,

    #[error("Illegal read to invalid register #{0:#04X}")]
    IllegalRegisterRead(u8),

    #[error("Illegal write to register #{0:#04X}")]
    IllegalRegisterWrite(u8),

    #[error("Illegal jump address ({addr:#06X} < {base:#06X})")]
    IllegalJumpTarget { addr: u16, base: u16 },

    #[error("Illegal offset provided to MBTS ({0})")]
    IllegalBitOffset(u8),

    #[error("SPAWN when no inactive threads available")]
    NoInactiveThreads,

    #[error("STOP when only one thread active")]
    OnlyOneThreadActive,

    #[error("No active threads left to run")]
    NoActiveThreads,

    #[error("Program counter overflow past {0:#06X}")]
    ProgramCounterOverflow(u16),

    #[error("Invalid memory access at {0:#06X}")]
    MemoryOutOfBounds(usize),

    #[error("Unknown opcode {opcode:#04X} at {addr:#06X}")]
    UnknownOpcode { opcode: u8, addr: u16 },
}
