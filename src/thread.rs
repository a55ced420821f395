use serde::{Deserialize, Serialize};

use crate::constants::{NUM_REG, THREAD_COUNT};

/// Result of the last comparison, plus the overflow bit of the last arithmetic or shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareFlags {
    pub eq: bool,
    pub lt: bool,
    pub gt: bool,
    pub overflow: bool,
}

impl CompareFlags {
    /// Unsigned comparison of `lhs` against `rhs`. Always clears overflow.
    pub fn compare(&mut self, lhs:u16, rhs:u16) {
        self.eq = lhs == rhs;
        self.lt = lhs < rhs;
        self.gt = lhs > rhs;
        self.overflow = false;
    }
}

/// One hardware thread slot. A program counter of 0 means the slot is inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSlot {
    pub pc: u16,
    pub registers: [u8; NUM_REG],
    pub flags: CompareFlags,
}

impl ThreadSlot {
    pub fn is_active(&self) -> bool {
        self.pc != 0
    }
}

/// Bit `i` is set iff slot `i` is active.
pub fn runnable_mask(threads:&[ThreadSlot; THREAD_COUNT]) -> u8 {
    threads
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_active())
        .fold(0u8, |mask, (i, _)| mask | (1u8 << i))
}

/// First active slot after `from`, wrapping around; `from` itself if no other slot is active.
pub fn next_runnable(threads:&[ThreadSlot; THREAD_COUNT], from:usize) -> usize {
    (1..=THREAD_COUNT)
        .map(|step| (from + step) % THREAD_COUNT)
        .find(|&i| threads[i].is_active())
        .unwrap_or(from)
}
