use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Fault};
use crate::utils;

/// Fixed-size, byte-addressable memory shared by every thread slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    pub fn new(size:usize) -> Result<Memory, Error> {
        if size > u16::MAX as usize + 1 {
            return Err(Error::MemoryTooLarge(size));
        }
        Ok(Memory { bytes: vec![0; size] })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Copies `image` into memory starting at `offset`.
    pub fn load(&mut self, offset:u16, image:&[u8]) -> Result<(), Error> {
        let start = offset as usize;
        let capacity = self.bytes.len().saturating_sub(start);
        if image.len() > capacity {
            return Err(Error::ImageTooLarge { image: image.len(), capacity });
        }
        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn read_byte(&self, addr:u16) -> Result<u8, Fault> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds(addr as usize))
    }

    pub fn write_byte(&mut self, addr:u16, value:u8) -> Result<(), Fault> {
        let slot = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(Fault::MemoryOutOfBounds(addr as usize))?;
        *slot = value;
        Ok(())
    }

    /// Reads one bit of the byte at `addr`; offset 0 is the most-significant bit.
    /// `offset` must be in 0..=7.
    pub fn read_bit(&self, addr:u16, offset:u8) -> Result<u8, Fault> {
        Ok(utils::get_bit(self.read_byte(addr)?, offset) as u8)
    }

    /// Sets or clears one bit of the byte at `addr`, leaving the other seven alone.
    pub fn write_bit(&mut self, addr:u16, offset:u8, value:bool) -> Result<(), Fault> {
        let mut byte = self.read_byte(addr)?;
        if value {
            utils::set_bit(&mut byte, offset);
        } else {
            utils::clear_bit(&mut byte, offset);
        }
        self.write_byte(addr, byte)
    }
}

impl Index<u16> for Memory {
    type Output = u8;

    fn index(&self, addr:u16) -> &u8 {
        &self.bytes[addr as usize]
    }
}

impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, addr:u16) -> &mut u8 {
        &mut self.bytes[addr as usize]
    }
}
