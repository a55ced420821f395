use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::constants::*;
use crate::device::Device;
use crate::errors::{Error, Fault};
use crate::instruction_set::{Instruction, InstructionSet};
use crate::memory::Memory;
use crate::thread::{next_runnable, runnable_mask, CompareFlags, ThreadSlot};

/// Everything about a machine that survives a save/load: no devices, no instruction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub memory: Memory,
    pub threads: [ThreadSlot; THREAD_COUNT],
    pub active_thread: usize,
    pub base_offset: u16,
    pub halted: bool,
    pub halt_reason: Option<Fault>,
}

pub struct Machine {
    memory: Memory,
    threads: [ThreadSlot; THREAD_COUNT],
    active_thread: usize,
    base_offset: u16,
    halted: bool,
    halt_reason: Option<Fault>,
    instruction_set: InstructionSet,
    devices: Vec<Box<dyn Device>>,
}

impl Machine {
    /// Thread 0 starts at `base_offset`; the other slots start inactive.
    pub fn new(memory:Memory, base_offset:u16, instruction_set:InstructionSet) -> Machine {
        let mut threads = [ThreadSlot::default(); THREAD_COUNT];
        threads[0].pc = base_offset;

        Machine {
            memory,
            threads,
            active_thread: 0,
            base_offset,
            halted: false,
            halt_reason: None,
            instruction_set,
            devices: Vec::new(),
        }
    }

    /// Allocates memory for `config`, loads `image` at the base offset and
    /// loads the configured instruction set.
    pub fn from_config(config:&Config, image:&[u8]) -> Result<Machine, Error> {
        if image.len() > config.memory_size {
            return Err(Error::ImageTooLarge { image: image.len(), capacity: config.memory_size });
        }
        let mut memory = Memory::new(config.total_memory())?;
        log::debug!("loading {} byte image at {:#06X}", image.len(), config.base_offset);
        memory.load(config.base_offset, image)?;
        Ok(Machine::new(memory, config.base_offset, config.instruction_set()?))
    }

    pub fn attach_device(&mut self, device:Box<dyn Device>) {
        log::debug!("attaching {} at {:#04x}", device.name(), device.memory_location());
        self.devices.push(device);
    }

    pub fn devices(&self) -> &[Box<dyn Device>] {
        &self.devices
    }

    pub fn enable_devices(&mut self) {
        for device in self.devices.iter_mut() {
            device.enable();
        }
    }

    pub fn disable_devices(&mut self) {
        for device in self.devices.iter_mut() {
            device.disable();
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn instruction_set(&self) -> &InstructionSet {
        &self.instruction_set
    }

    /// # Panics
    ///
    /// Panics if `index >= THREAD_COUNT`.
    pub fn thread(&self, index:usize) -> &ThreadSlot {
        &self.threads[index]
    }

    pub fn active_thread(&self) -> usize {
        self.active_thread
    }

    pub fn base_offset(&self) -> u16 {
        self.base_offset
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn halt_reason(&self) -> Option<&Fault> {
        self.halt_reason.as_ref()
    }

    /// Enters the terminal state. Only the first reason is kept.
    pub fn halt(&mut self, reason:Fault) {
        if self.halted {
            return;
        }
        log::info!("halted: {}", reason);
        self.halted = true;
        self.halt_reason = Some(reason);
    }

    pub fn run(&mut self) {
        while !self.halted {
            self.tick();
        }
    }

    /// Fetches, decodes and executes one instruction of the active thread,
    /// then services device interrupts. No-op once halted.
    pub fn tick(&mut self) {
        if self.halted {
            return;
        }

        if runnable_mask(&self.threads) == 0 {
            self.halt(Fault::NoActiveThreads);
            return;
        }
        // never fetch for a stopped slot; hand over to the next live one
        if !self.threads[self.active_thread].is_active() {
            self.active_thread = next_runnable(&self.threads, self.active_thread);
        }

        let thread = self.active_thread;
        let pc = self.threads[thread].pc;
        // a wrapped PC would read as an inactive slot and resume below the base offset
        self.threads[thread].pc = match pc.checked_add(INSTRUCTION_SIZE) {
            Some(next) => next,
            None => {
                self.halt(Fault::ProgramCounterOverflow(pc));
                return;
            }
        };
        log::debug!("tick thread {} @ PC {:#06X}", thread, pc);

        let result = match self.instruction_set.decode(&self.memory, pc) {
            Ok(instruction) => {
                log::debug!("execute {}", instruction);
                self.execute(instruction)
            }
            Err(fault) => Err(fault),
        };
        if let Err(fault) = result {
            self.halt(fault);
            return;
        }
        log::trace!("thread {} registers {:?} {:?}", thread, self.threads[thread].registers, self.threads[thread].flags);

        if let Err(fault) = dispatch_interrupts(&mut self.memory, &mut self.devices) {
            self.halt(fault);
        }
    }

    fn execute(&mut self, instruction:Instruction) -> Result<(), Fault> {
        use Instruction::*;

        match instruction {
            Halt => return Err(Fault::HaltInstruction),
            Yield => {
                self.active_thread = next_runnable(&self.threads, self.active_thread);
            }
            Stop => {
                if runnable_mask(&self.threads).count_ones() <= 1 {
                    return Err(Fault::OnlyOneThreadActive);
                }
                self.threads[self.active_thread].pc = 0;
                self.active_thread = (self.active_thread + 1) % THREAD_COUNT;
            }
            Spawn { addr } => {
                self.check_jump_target(addr)?;
                let slot = self
                    .threads
                    .iter()
                    .position(|t| !t.is_active())
                    .ok_or(Fault::NoInactiveThreads)?;
                log::debug!("spawn thread {} @ {:#06X}", slot, addr);
                self.threads[slot].pc = addr;
                self.active_thread = slot;
            }
            Jump { addr } => self.jump(addr)?,
            JumpReg { reg } => {
                let addr = self.register(reg)?;
                self.jump(addr)?;
            }
            JumpIfZero { reg, addr } => {
                if self.register(reg)? == 0 {
                    self.jump(addr)?;
                }
            }
            JumpUnlessZero { reg, addr } => {
                if self.register(reg)? != 0 {
                    self.jump(addr)?;
                }
            }
            MemToReg { addr, reg } => {
                let value = self.memory.read_byte(addr)?;
                *self.register_mut(reg)? = value;
            }
            RegToMem { reg, addr } => {
                let value = self.byte_register(reg)?;
                self.memory.write_byte(addr, value)?;
            }
            IndirectMemToReg { src, dst } => {
                let addr = self.register(src)?;
                let value = self.memory.read_byte(addr)?;
                *self.register_mut(dst)? = value;
            }
            RegToReg { src, dst } => {
                let value = self.byte_register(src)?;
                *self.register_mut(dst)? = value;
            }
            Set { value, reg } => *self.register_mut(reg)? = value,
            Add { src, dst } => {
                let operand = u8::try_from(self.register(src)?).ok();
                self.checked_update(dst, |v| operand.and_then(|x| v.checked_add(x)))?;
            }
            Sub { src, dst } => {
                let operand = u8::try_from(self.register(src)?).ok();
                self.checked_update(dst, |v| operand.and_then(|x| v.checked_sub(x)))?;
            }
            Incr { reg } => self.checked_update(reg, |v| v.checked_add(1))?,
            Decr { reg } => self.checked_update(reg, |v| v.checked_sub(1))?,
            Zero { reg } => *self.register_mut(reg)? = 0,
            LShift { reg } => self.checked_update(reg, |v| v.checked_mul(2))?,
            RShift { reg } => self.checked_update(reg, |v| Some(v >> 1))?,
            And { src, dst } => {
                let value = self.byte_register(src)?;
                *self.register_mut(dst)? &= value;
            }
            Or { src, dst } => {
                let value = self.byte_register(src)?;
                *self.register_mut(dst)? |= value;
            }
            Xor { src, dst } => {
                let value = self.byte_register(src)?;
                *self.register_mut(dst)? ^= value;
            }
            Not { reg } => {
                let r = self.register_mut(reg)?;
                *r = !*r;
            }
            Compare { lhs, rhs } => {
                let lhs = self.register(lhs)?;
                let rhs = self.register(rhs)?;
                self.flags_mut().compare(lhs, rhs);
            }
            Mbts { addr, offset } => {
                if offset > 7 {
                    return Err(Fault::IllegalBitOffset(offset));
                }
                let bit = self.memory.read_bit(addr, offset)?;
                self.flags_mut().compare(bit as u16, 1);
                self.memory.write_bit(addr, offset, true)?;
            }
        }
        Ok(())
    }

    /// Applies `op` to a general register. `None` means the result does not fit
    /// in a byte: overflow is set and the register keeps its value.
    fn checked_update<F: FnOnce(u8) -> Option<u8>>(&mut self, reg:u8, op:F) -> Result<(), Fault> {
        let current = *self.register_mut(reg)?;
        match op(current) {
            Some(value) => {
                *self.register_mut(reg)? = value;
                self.flags_mut().overflow = false;
            }
            None => self.flags_mut().overflow = true,
        }
        Ok(())
    }

    fn check_jump_target(&self, addr:u16) -> Result<(), Fault> {
        if addr < self.base_offset {
            return Err(Fault::IllegalJumpTarget { addr, base: self.base_offset });
        }
        Ok(())
    }

    fn jump(&mut self, addr:u16) -> Result<(), Fault> {
        self.check_jump_target(addr)?;
        self.threads[self.active_thread].pc = addr;
        Ok(())
    }

    fn flags_mut(&mut self) -> &mut CompareFlags {
        &mut self.threads[self.active_thread].flags
    }

    /// Reads a register of the active thread.
    pub fn register(&self, reg:u8) -> Result<u16, Fault> {
        self.register_for_thread(reg, self.active_thread)
    }

    /// Reads a register as seen by `thread`. Special registers are computed;
    /// `PC` is the only one wider than a byte.
    ///
    /// # Panics
    ///
    /// Panics if `thread >= THREAD_COUNT`.
    pub fn register_for_thread(&self, reg:u8, thread:usize) -> Result<u16, Fault> {
        let slot = &self.threads[thread];
        let value = match reg {
            REG_A..=REG_H => slot.registers[reg as usize] as u16,
            REG_T => self.active_thread as u16,
            REG_TC => runnable_mask(&self.threads) as u16,
            REG_PC => slot.pc,
            REG_CE => slot.flags.eq as u16,
            REG_CG => slot.flags.gt as u16,
            REG_CL => slot.flags.lt as u16,
            REG_OF => slot.flags.overflow as u16,
            _ => return Err(Fault::IllegalRegisterRead(reg)),
        };
        Ok(value)
    }

    // Byte contexts see the low byte of PC.
    fn byte_register(&self, reg:u8) -> Result<u8, Fault> {
        self.register(reg).map(|v| v as u8)
    }

    /// Only the general registers A-H are writable.
    fn register_mut(&mut self, reg:u8) -> Result<&mut u8, Fault> {
        self.threads[self.active_thread]
            .registers
            .get_mut(reg as usize)
            .ok_or(Fault::IllegalRegisterWrite(reg))
    }

    pub fn snapshot(&self) -> MachineState {
        MachineState {
            memory: self.memory.clone(),
            threads: self.threads,
            active_thread: self.active_thread,
            base_offset: self.base_offset,
            halted: self.halted,
            halt_reason: self.halt_reason.clone(),
        }
    }

    /// Replaces memory and thread state; devices and the instruction set are kept.
    pub fn restore(&mut self, state:MachineState) {
        self.memory = state.memory;
        self.threads = state.threads;
        self.active_thread = state.active_thread % THREAD_COUNT;
        self.base_offset = state.base_offset;
        self.halted = state.halted;
        self.halt_reason = state.halt_reason;
    }
}

/// For every device with a pending interrupt: its output byte goes in, the
/// returned byte lands at its input location.
fn dispatch_interrupts(memory:&mut Memory, devices:&mut [Box<dyn Device>]) -> Result<(), Fault> {
    for device in devices.iter_mut() {
        if device.has_interrupt() {
            log::debug!("{} has an available interrupt", device.name());
            let output = memory.read_byte(device.output_location())?;
            let input = device.handle_interrupt(output);
            memory.write_byte(device.input_location(), input)?;
        }
    }
    Ok(())
}

impl fmt::Display for Machine {
    fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "          A\tB\tC\tD\tE\tF\tG\tH")?;
        for (i, slot) in self.threads.iter().enumerate() {
            let marker = if i == self.active_thread { '*' } else { ' ' };
            write!(f, "{}{} @ {:#06X}\t:", marker, i, slot.pc)?;
            for r in slot.registers.iter() {
                write!(f, " {}\t", r)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
