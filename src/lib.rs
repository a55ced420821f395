//! A four-thread cooperative byte machine: fixed 4-byte instructions, eight
//! byte registers per thread, shared memory, and devices serviced after every tick.

pub mod config;
pub mod constants;
pub mod device;
pub mod errors;
pub mod hypervisor_controller;
pub mod instruction_set;
pub mod machine;
pub mod memory;
pub mod thread;
pub mod utils;


pub use config::Config;
pub use errors::{Error, Fault};
pub use machine::Machine;
