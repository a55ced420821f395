//! Machine configuration.
//!
//! Built from defaults, then overridden by environment variables:
//! - `TCPU_BASE_OFFSET`: load address of the image and lowest legal jump target
//!   (decimal or `0x` hex)
//! - `TCPU_INSTRUCTION_SET`: path to a JSON instruction-set definition
//! - `TCPU_DUMP_STATE`: where to write the final machine state as JSON

use std::convert::TryFrom;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::MEM_BASE_OFFSET;
use crate::errors::Error;
use crate::instruction_set::InstructionSet;
use crate::utils::parse_number;

pub const ENV_BASE_OFFSET:&str = "TCPU_BASE_OFFSET";
pub const ENV_INSTRUCTION_SET:&str = "TCPU_INSTRUCTION_SET";
pub const ENV_DUMP_STATE:&str = "TCPU_DUMP_STATE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bytes of program space above `base_offset`.
    pub memory_size: usize,
    pub base_offset: u16,
    /// Instruction-set definition; the built-in table when unset.
    pub instruction_set_path: Option<PathBuf>,
    pub dump_state_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            memory_size: 1024,
            base_offset: MEM_BASE_OFFSET,
            instruction_set_path: None,
            dump_state_path: None,
        }
    }
}

impl Config {
    pub fn new(memory_size:usize) -> Config {
        Config { memory_size, ..Config::default() }
    }

    /// Total bytes of backing memory: everything below the base offset plus the program space.
    pub fn total_memory(&self) -> usize {
        self.base_offset as usize + self.memory_size
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), Error> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup:F) -> Result<(), Error> {
        if let Some(value) = lookup(ENV_BASE_OFFSET) {
            let invalid = || Error::InvalidConfig { key: ENV_BASE_OFFSET.to_string(), value: value.clone() };
            let parsed = parse_number(&value).map_err(|_| invalid())?;
            self.base_offset = u16::try_from(parsed).map_err(|_| invalid())?;
        }
        if let Some(path) = lookup(ENV_INSTRUCTION_SET) {
            self.instruction_set_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_DUMP_STATE) {
            self.dump_state_path = Some(PathBuf::from(path));
        }
        log::debug!("configuration: {:?}", self);
        Ok(())
    }

    pub fn instruction_set(&self) -> Result<InstructionSet, Error> {
        match &self.instruction_set_path {
            Some(path) => {
                log::info!("loading instruction set from {}", path.display());
                InstructionSet::from_file(path)
            }
            None => InstructionSet::builtin(),
        }
    }
}
