use std::num::ParseIntError;

// Bit offsets count from the most-significant bit: offset 0 is 0x80, offset 7 is 0x01.
fn mask(offset:u8) -> u8 {
    0x80 >> offset
}

pub fn set_bit(data:&mut u8, offset:u8) {
    *data |= mask(offset);
}

pub fn clear_bit(data:&mut u8, offset:u8) {
    *data &= !mask(offset);
}

pub fn get_bit(data:u8, offset:u8) -> bool {
    (data & mask(offset)) > 0
}

/**
 * Joins two bytes stored big-endian (high byte first) into a u16
 * e.g., (0x01, 0x80) returns 0x0180
 */
pub fn from_big_endian(hi:u8, lo:u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

/**
 * Parses a number written either in decimal or as `0x`-prefixed hex
 */
pub fn parse_number(text:&str) -> Result<u64, ParseIntError> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        text.parse::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_offsets_are_msb_first() {
        let mut b:u8 = 0;
        set_bit(&mut b, 0);
        assert_eq!(b, 0x80);
        set_bit(&mut b, 7);
        assert_eq!(b, 0x81);
        assert!(get_bit(b, 0));
        assert!(!get_bit(b, 1));
        clear_bit(&mut b, 0);
        assert_eq!(b, 0x01);
    }

    #[test]
    fn test_from_big_endian() {
        assert_eq!(from_big_endian(0x01, 0x80), 0x0180);
        assert_eq!(from_big_endian(0x00, 0xFF), 0x00FF);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("128"), Ok(128));
        assert_eq!(parse_number("0x80"), Ok(128));
        assert_eq!(parse_number(" 0X0c "), Ok(12));
        assert!(parse_number("zz").is_err());
    }
}
