use std::fmt;

use crate::constants::*;

/// Operations the engine knows how to execute. The opcode for each one comes
/// from the instruction-set table, not from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Halt,
    Yield,
    Stop,
    Spawn,
    Jump,
    JumpReg,
    JumpIfZero,
    JumpUnlessZero,
    MemToReg,
    RegToMem,
    IndirectMemToReg,
    RegToReg,
    Set,
    Add,
    Sub,
    Incr,
    Decr,
    Zero,
    LShift,
    RShift,
    And,
    Or,
    Xor,
    Not,
    Compare,
    Mbts,
}

impl Operation {
    pub fn from_name(name:&str) -> Option<Operation> {
        use Operation::*;

        let op = match name {
            "HALT" => Halt,
            "YIELD" => Yield,
            "STOP" => Stop,
            "SPAWN" => Spawn,
            "JUMP" => Jump,
            "JUMP_REG" => JumpReg,
            "JUMP_IF_ZERO" => JumpIfZero,
            "JUMP_UNLESS_ZERO" => JumpUnlessZero,
            "M2R" => MemToReg,
            "R2M" => RegToMem,
            "IM2R" => IndirectMemToReg,
            "R2R" => RegToReg,
            "SET" => Set,
            "ADD" => Add,
            "SUB" => Sub,
            "INCR" => Incr,
            "DECR" => Decr,
            "ZERO" => Zero,
            "LSHIFT" => LShift,
            "RSHIFT" => RShift,
            "AND" => And,
            "OR" => Or,
            "XOR" => Xor,
            "NOT" => Not,
            "COMPARE" => Compare,
            "MBTS" => Mbts,
            _ => return None,
        };
        Some(op)
    }

    /// Operand byte widths in program order: 1 for a register or immediate, 2 for an address.
    pub fn operand_layout(&self) -> &'static [u8] {
        use Operation::*;

        match self {
            Halt | Yield | Stop => &[],
            Spawn | Jump => &[2],
            JumpReg | Incr | Decr | Zero | LShift | RShift | Not => &[1],
            JumpIfZero | JumpUnlessZero | RegToMem => &[1, 2],
            MemToReg => &[2, 1],
            IndirectMemToReg | RegToReg | Set | Add | Sub | And | Or | Xor | Compare => &[1, 1],
            Mbts => &[1, 1],
        }
    }

    /// Whether a table entry may give this operation the operand widths `args`.
    pub fn accepts(&self, args:&[u8]) -> bool {
        match self {
            // the bit address may be a short (zero-page) or a full address
            Operation::Mbts => args == [1, 1] || args == [2, 1],
            _ => args == self.operand_layout(),
        }
    }

    /// Builds the typed instruction from raw operands.
    /// `operands` must match a layout this operation `accepts`; one-byte operands fit a u8.
    pub fn build(&self, operands:&[u16]) -> Instruction {
        use Instruction as I;

        let byte = |i:usize| operands[i] as u8;
        match self {
            Operation::Halt => I::Halt,
            Operation::Yield => I::Yield,
            Operation::Stop => I::Stop,
            Operation::Spawn => I::Spawn { addr: operands[0] },
            Operation::Jump => I::Jump { addr: operands[0] },
            Operation::JumpReg => I::JumpReg { reg: byte(0) },
            Operation::JumpIfZero => I::JumpIfZero { reg: byte(0), addr: operands[1] },
            Operation::JumpUnlessZero => I::JumpUnlessZero { reg: byte(0), addr: operands[1] },
            Operation::MemToReg => I::MemToReg { addr: operands[0], reg: byte(1) },
            Operation::RegToMem => I::RegToMem { reg: byte(0), addr: operands[1] },
            Operation::IndirectMemToReg => I::IndirectMemToReg { src: byte(0), dst: byte(1) },
            Operation::RegToReg => I::RegToReg { src: byte(0), dst: byte(1) },
            Operation::Set => I::Set { value: byte(0), reg: byte(1) },
            Operation::Add => I::Add { src: byte(0), dst: byte(1) },
            Operation::Sub => I::Sub { src: byte(0), dst: byte(1) },
            Operation::Incr => I::Incr { reg: byte(0) },
            Operation::Decr => I::Decr { reg: byte(0) },
            Operation::Zero => I::Zero { reg: byte(0) },
            Operation::LShift => I::LShift { reg: byte(0) },
            Operation::RShift => I::RShift { reg: byte(0) },
            Operation::And => I::And { src: byte(0), dst: byte(1) },
            Operation::Or => I::Or { src: byte(0), dst: byte(1) },
            Operation::Xor => I::Xor { src: byte(0), dst: byte(1) },
            Operation::Not => I::Not { reg: byte(0) },
            Operation::Compare => I::Compare { lhs: byte(0), rhs: byte(1) },
            Operation::Mbts => I::Mbts { addr: operands[0], offset: byte(1) },
        }
    }
}

/// A decoded instruction. Recomputed on every fetch, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Halt,
    Yield,
    Stop,
    Spawn { addr: u16 },
    Jump { addr: u16 },
    JumpReg { reg: u8 },
    JumpIfZero { reg: u8, addr: u16 },
    JumpUnlessZero { reg: u8, addr: u16 },
    MemToReg { addr: u16, reg: u8 },
    RegToMem { reg: u8, addr: u16 },
    /// `dst := memory[src]`, where the value of `src` is the address.
    IndirectMemToReg { src: u8, dst: u8 },
    RegToReg { src: u8, dst: u8 },
    Set { value: u8, reg: u8 },
    Add { src: u8, dst: u8 },
    /// `dst := dst - src`
    Sub { src: u8, dst: u8 },
    Incr { reg: u8 },
    Decr { reg: u8 },
    Zero { reg: u8 },
    LShift { reg: u8 },
    RShift { reg: u8 },
    And { src: u8, dst: u8 },
    Or { src: u8, dst: u8 },
    Xor { src: u8, dst: u8 },
    Not { reg: u8 },
    Compare { lhs: u8, rhs: u8 },
    Mbts { addr: u16, offset: u8 },
}

/// Assembler-style name of a register address, e.g. `A` or `PC`.
pub fn register_name(reg:u8) -> String {
    match reg {
        REG_A..=REG_H => ((b'A' + reg) as char).to_string(),
        REG_T => "T".to_string(),
        REG_TC => "TC".to_string(),
        REG_PC => "PC".to_string(),
        REG_CE => "CE".to_string(),
        REG_CG => "CG".to_string(),
        REG_CL => "CL".to_string(),
        REG_OF => "OF".to_string(),
        _ => format!("#{:#04X}", reg),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;
        let r = register_name;

        match *self {
            Halt => write!(f, "HALT"),
            Yield => write!(f, "YIELD"),
            Stop => write!(f, "STOP"),
            Spawn { addr } => write!(f, "SPAWN {:#06X}", addr),
            Jump { addr } => write!(f, "JUMP {:#06X}", addr),
            JumpReg { reg } => write!(f, "JUMP_REG {}", r(reg)),
            JumpIfZero { reg, addr } => write!(f, "JUMP_IF_ZERO {}, {:#06X}", r(reg), addr),
            JumpUnlessZero { reg, addr } => write!(f, "JUMP_UNLESS_ZERO {}, {:#06X}", r(reg), addr),
            MemToReg { addr, reg } => write!(f, "M2R {:#06X}, {}", addr, r(reg)),
            RegToMem { reg, addr } => write!(f, "R2M {}, {:#06X}", r(reg), addr),
            IndirectMemToReg { src, dst } => write!(f, "IM2R {}, {}", r(src), r(dst)),
            RegToReg { src, dst } => write!(f, "R2R {}, {}", r(src), r(dst)),
            Set { value, reg } => write!(f, "SET {:#04X}, {}", value, r(reg)),
            Add { src, dst } => write!(f, "ADD {}, {}", r(src), r(dst)),
            Sub { src, dst } => write!(f, "SUB {}, {}", r(src), r(dst)),
            Incr { reg } => write!(f, "INCR {}", r(reg)),
            Decr { reg } => write!(f, "DECR {}", r(reg)),
            Zero { reg } => write!(f, "ZERO {}", r(reg)),
            LShift { reg } => write!(f, "LSHIFT {}", r(reg)),
            RShift { reg } => write!(f, "RSHIFT {}", r(reg)),
            And { src, dst } => write!(f, "AND {}, {}", r(src), r(dst)),
            Or { src, dst } => write!(f, "OR {}, {}", r(src), r(dst)),
            Xor { src, dst } => write!(f, "XOR {}, {}", r(src), r(dst)),
            Not { reg } => write!(f, "NOT {}", r(reg)),
            Compare { lhs, rhs } => write!(f, "COMPARE {}, {}", r(lhs), r(rhs)),
            Mbts { addr, offset } => write!(f, "MBTS {:#06X}, {}", addr, offset),
        }
    }
}
