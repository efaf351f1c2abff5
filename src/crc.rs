//! CCITT CRC-16 used for frame integrity.
//!
//! The update is the reflected CCITT polynomial (`0x8408`) processed one byte at a
//! time, seeded with [`CRC_INIT`]. The CRC is appended low byte first, so running
//! the same update over the two trailer bytes brings the register back to zero.

use crate::consts::CRC_INIT;

/// Returns the seed of a fresh running CRC.
pub const fn crc_init() -> u16 {
    CRC_INIT
}

/// Feeds one byte through the running CRC.
pub const fn crc_ccitt_update(crc: u16, data: u8) -> u16 {
    let mut d = data as u16;
    d ^= lo8(crc);
    d ^= d << 4;
    d = (d as u8) as u16; // keep only the low byte for the next steps

    ((d << 8) | hi8(crc)) ^ (((d >> 4) as u8) as u16) ^ (d << 3)
}

/// Runs [`crc_ccitt_update`] over every byte of `bytes`.
pub fn crc_ccitt(crc: u16, bytes: &[u8]) -> u16 {
    bytes.iter().fold(crc, |crc, &b| crc_ccitt_update(crc, b))
}

/// True iff a running CRC that has already consumed its own trailer is zero.
pub const fn crc_matches(crc: u16) -> bool {
    crc == 0x0000
}

const fn lo8(x: u16) -> u16 {
    x & 0xff
}

const fn hi8(x: u16) -> u16 {
    x >> 8
}
