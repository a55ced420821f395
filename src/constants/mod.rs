pub const INSTRUCTION_SIZE:u16 = 4; // opcode byte + up to 3 operand bytes
pub const MAX_OPERAND_BYTES:u8 = (INSTRUCTION_SIZE - 1) as u8;
pub const THREAD_COUNT:usize = 4;
pub const NUM_REG:usize = 8; // A-H

pub const MEM_BASE_OFFSET:u16 = 0x80; // images load here; jumps below it are illegal

pub const REG_A:u8 = 0x00;
pub const REG_B:u8 = 0x01;
pub const REG_C:u8 = 0x02;
pub const REG_D:u8 = 0x03;
pub const REG_E:u8 = 0x04;
pub const REG_F:u8 = 0x05;
pub const REG_G:u8 = 0x06;
pub const REG_H:u8 = 0x07;

// special registers are read-only and computed, not stored
pub const REG_T:u8 = 0x80;  // 2 bits, active thread index
pub const REG_TC:u8 = 0x81; // 4 bits, runnable thread mask
pub const REG_PC:u8 = 0x82; // 16 bits wide, hence the gap at 0x83
pub const REG_CE:u8 = 0x84;
pub const REG_CG:u8 = 0x85;
pub const REG_CL:u8 = 0x86;
pub const REG_OF:u8 = 0x87;

// device window, relative to a device's memory location
pub const DEVICE_STATUS_OFFSET:u16 = 0;
pub const DEVICE_INPUT_OFFSET:u16 = 1;
pub const DEVICE_OUTPUT_OFFSET:u16 = 2;

pub const KEYBOARD_MEMORY_LOCATION:u16 = 0x0C;
pub const KEYBOARD_BUFFER_SIZE:usize = 25; // keeps only the most recent keys
