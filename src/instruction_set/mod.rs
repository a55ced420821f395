//! Instruction-set table: opcode to operation and operand widths, loaded from
//! JSON records of the form `{ "code": 12, "name": "SET", "args": [1, 1] }`.

mod instruction;

pub use instruction::{register_name, Instruction, Operation};

use std::collections::HashMap;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_OPERAND_BYTES;
use crate::errors::{Error, Fault};
use crate::memory::Memory;
use crate::utils::from_big_endian;

const BUILTIN_INSTRUCTION_SET:&str = include_str!("instructionset.json");

/// One record of the external instruction-set definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionDef {
    pub code: u8,
    pub name: String,
    pub args: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionInfo {
    pub code: u8,
    pub name: String,
    pub args: Vec<u8>,
    pub operation: Operation,
}

#[derive(Debug, Clone)]
pub struct InstructionSet {
    by_code: HashMap<u8, InstructionInfo>,
    by_name: HashMap<String, u8>,
}

impl InstructionSet {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<InstructionSet, Error> {
        InstructionSet::from_json(BUILTIN_INSTRUCTION_SET)
    }

    pub fn from_file<P: AsRef<Path>>(path:P) -> Result<InstructionSet, Error> {
        let text = fs::read_to_string(path)?;
        InstructionSet::from_json(&text)
    }

    pub fn from_json(text:&str) -> Result<InstructionSet, Error> {
        let defs:Vec<InstructionDef> = serde_json::from_str(text)?;
        InstructionSet::from_definitions(defs)
    }

    /// Builds the lookup tables, rejecting any definition the engine could not decode.
    pub fn from_definitions(defs:Vec<InstructionDef>) -> Result<InstructionSet, Error> {
        let mut by_code = HashMap::new();
        let mut by_name = HashMap::new();

        for def in defs {
            let total:u32 = def.args.iter().map(|&w| w as u32).sum();
            if total > MAX_OPERAND_BYTES as u32 {
                return Err(Error::InvalidInstructionDefinition {
                    reason: format!(
                        "args must total no more than {} bytes (definition: {:?})",
                        MAX_OPERAND_BYTES, def.args
                    ),
                    name: def.name,
                });
            }

            let operation = Operation::from_name(&def.name)
                .ok_or_else(|| Error::UnknownMnemonic(def.name.clone()))?;
            if !operation.accepts(&def.args) {
                return Err(Error::InvalidInstructionDefinition {
                    reason: format!(
                        "operand widths {:?} do not match expected {:?}",
                        def.args,
                        operation.operand_layout()
                    ),
                    name: def.name,
                });
            }

            if by_code.contains_key(&def.code) {
                return Err(Error::DuplicateOpcode(def.code));
            }
            if by_name.contains_key(&def.name) {
                return Err(Error::DuplicateMnemonic(def.name));
            }

            by_name.insert(def.name.clone(), def.code);
            by_code.insert(def.code, InstructionInfo {
                code: def.code,
                name: def.name,
                args: def.args,
                operation,
            });
        }

        log::debug!("loaded instruction set with {} instructions", by_code.len());
        Ok(InstructionSet { by_code, by_name })
    }

    pub fn info(&self, code:u8) -> Option<&InstructionInfo> {
        self.by_code.get(&code)
    }

    pub fn code(&self, name:&str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Decodes the instruction whose opcode byte is at `offset`. Two-byte
    /// operands are big-endian.
    pub fn decode(&self, memory:&Memory, offset:u16) -> Result<Instruction, Fault> {
        let opcode = memory.read_byte(offset)?;
        let info = self
            .info(opcode)
            .ok_or(Fault::UnknownOpcode { opcode, addr: offset })?;

        let mut operands = [0u16; MAX_OPERAND_BYTES as usize];
        let mut cursor = offset as usize + 1;
        for (i, &width) in info.args.iter().enumerate() {
            operands[i] = match width {
                1 => byte_at(memory, cursor)? as u16,
                2 => from_big_endian(byte_at(memory, cursor)?, byte_at(memory, cursor + 1)?),
                // from_definitions only admits widths an Operation accepts
                _ => unreachable!("operand width {} passed table validation", width),
            };
            cursor += width as usize;
        }

        Ok(info.operation.build(&operands[..info.args.len()]))
    }
}

fn byte_at(memory:&Memory, cursor:usize) -> Result<u8, Fault> {
    let addr = u16::try_from(cursor).map_err(|_| Fault::MemoryOutOfBounds(cursor))?;
    memory.read_byte(addr)
}
