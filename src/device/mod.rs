//! Devices attached to the machine. A device never touches memory itself: after
//! every tick the machine reads the device's output byte, hands it to
//! `handle_interrupt`, and writes the returned byte to the device's input byte.

mod keyboard;
mod scripted;

pub use keyboard::Keyboard;
pub use scripted::ScriptedDevice;

use crate::constants::{DEVICE_INPUT_OFFSET, DEVICE_OUTPUT_OFFSET, DEVICE_STATUS_OFFSET};

pub trait Device {
    fn name(&self) -> &str;

    /// Base of the device's three-byte window (status, input, output).
    fn memory_location(&self) -> u16;

    /// Whether an interrupt is pending. Called once per tick; must not block.
    fn has_interrupt(&mut self) -> bool;

    /// Services the pending interrupt. Receives the byte at the output location
    /// and returns the byte to store at the input location. Clears the pending interrupt.
    fn handle_interrupt(&mut self, output:u8) -> u8;

    fn enable(&mut self) {
        log::info!("{} ({:#04x}) has been enabled", self.name(), self.memory_location());
    }

    fn disable(&mut self) {
        log::info!("{} ({:#04x}) has been disabled", self.name(), self.memory_location());
    }

    fn status_location(&self) -> u16 {
        self.memory_location().wrapping_add(DEVICE_STATUS_OFFSET)
    }

    fn input_location(&self) -> u16 {
        self.memory_location().wrapping_add(DEVICE_INPUT_OFFSET)
    }

    fn output_location(&self) -> u16 {
        self.memory_location().wrapping_add(DEVICE_OUTPUT_OFFSET)
    }
}
