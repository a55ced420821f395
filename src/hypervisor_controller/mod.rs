//! Debugging helpers that sit outside the engine: disassembly of memory and
//! saving/restoring machine state as JSON.

use std::fs;
use std::path::Path;

use crate::constants::INSTRUCTION_SIZE;
use crate::errors::Error;
use crate::machine::{Machine, MachineState};

/// One line per 4-byte word in `start..=end`. Words that do not decode are shown as raw data.
pub fn disassemble_range(m0:&Machine, start:u16, end:u16) -> Vec<String> {
    let mut lines = Vec::new();
    let mut addr = start as usize;
    while addr <= end as usize && addr < m0.memory().len() {
        let word:Vec<String> = (addr..addr + INSTRUCTION_SIZE as usize)
            .filter_map(|a| m0.memory().as_slice().get(a))
            .map(|b| format!("{:02x}", b))
            .collect();
        let text = match m0.instruction_set().decode(m0.memory(), addr as u16) {
            Ok(instruction) => instruction.to_string(),
            Err(_) => "???".to_string(),
        };
        lines.push(format!("{:#06X}:\t{}\t{}", addr, word.join(""), text));
        addr += INSTRUCTION_SIZE as usize;
    }
    lines
}

pub fn save_state<P: AsRef<Path>>(m0:&Machine, path:P) -> Result<(), Error> {
    log::info!("saving state to {}", path.as_ref().display());
    let serialized = serde_json::to_string(&m0.snapshot())?;
    fs::write(path, serialized)?;
    Ok(())
}

pub fn load_state<P: AsRef<Path>>(m0:&mut Machine, path:P) -> Result<(), Error> {
    log::info!("loading state from {}", path.as_ref().display());
    let text = fs::read_to_string(path)?;
    let state:MachineState = serde_json::from_str(&text)?;
    m0.restore(state);
    Ok(())
}
