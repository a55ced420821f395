use std::collections::VecDeque;

use super::Device;

/// A device fed from a queue of bytes: every queued byte is one interrupt.
/// Output bytes seen while servicing interrupts are recorded in order.
#[derive(Debug, Clone)]
pub struct ScriptedDevice {
    name: String,
    memory_location: u16,
    enabled: bool,
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl ScriptedDevice {
    pub fn new(name:&str, memory_location:u16) -> ScriptedDevice {
        ScriptedDevice {
            name: name.to_string(),
            memory_location,
            enabled: false,
            input: VecDeque::new(),
            output: Vec::new(),
        }
    }

    /// Queues bytes to deliver, one per interrupt.
    pub fn push_input(&mut self, bytes:&[u8]) {
        self.input.extend(bytes.iter().copied());
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

impl Device for ScriptedDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn memory_location(&self) -> u16 {
        self.memory_location
    }

    fn has_interrupt(&mut self) -> bool {
        self.enabled && !self.input.is_empty()
    }

    fn handle_interrupt(&mut self, output:u8) -> u8 {
        self.output.push(output);
        self.input.pop_front().unwrap_or(0)
    }

    fn enable(&mut self) {
        log::info!("{} ({:#04x}) has been enabled", self.name, self.memory_location);
        self.enabled = true;
    }

    fn disable(&mut self) {
        log::info!("{} ({:#04x}) has been disabled", self.name, self.memory_location);
        self.enabled = false;
    }
}
