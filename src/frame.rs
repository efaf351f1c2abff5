//! Packet header codec.
//!
//! A packet starts with its length byte, optionally followed by a control byte:
//!
//! ```text
//!  bit   7   6   5   4   3   2   1   0
//!      +---------------+---------------+
//!      | config nibble | !length & 0xF |
//!      +---------------+---------------+
//! ```
//!
//! The low nibble duplicates the length in complemented form so a receiver can drop
//! a frame with a garbled length before waiting for its body. The high nibble is
//! carried through untouched for the application. Neither protects the payload;
//! that is the CRC's job (see [`crate::crc`]).

use crate::config::LinkConfig;
use crate::consts::{CONTROL_CHECK_MASK, CONTROL_CONFIG_SHIFT, MAX_HEADER_LEN};
use thiserror::Error;

/// Reasons a received header is rejected.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum HeaderError {
    /// The control byte's check bits do not match the length byte.
    #[error("control byte does not match length")]
    ControlMismatch,
    /// The length byte declares an empty payload.
    #[error("zero length frame")]
    ZeroLength,
}

/// The control byte of a packet header.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Control(u8);

impl Control {
    /// Builds the control byte for a packet of `length` bytes.
    ///
    /// Only the low four bits of `config` are used.
    pub const fn new(length: u8, config: u8) -> Self {
        Self(Self::check_bits_for(length) | ((config & CONTROL_CHECK_MASK) << CONTROL_CONFIG_SHIFT))
    }

    /// Wraps a raw control byte as read off the wire.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Length check bits (low nibble).
    pub const fn check_bits(self) -> u8 {
        self.0 & CONTROL_CHECK_MASK
    }

    /// Application config nibble (high nibble).
    pub const fn config(self) -> u8 {
        self.0 >> CONTROL_CONFIG_SHIFT
    }

    /// True iff the check bits agree with `length`.
    pub const fn matches(self, length: u8) -> bool {
        self.check_bits() == Self::check_bits_for(length)
    }

    const fn check_bits_for(length: u8) -> u8 {
        !length & CONTROL_CHECK_MASK
    }
}

/// Writes the header for a `length` byte payload into `out`.
///
/// Returns the number of header bytes written, which is
/// [`LinkConfig::header_len`].
pub fn encode_header(
    length: u8,
    config_nibble: u8,
    config: &LinkConfig,
    out: &mut [u8; MAX_HEADER_LEN],
) -> usize {
    out[0] = length;
    if config.control_byte {
        out[1] = Control::new(length, config_nibble).raw();
    }
    config.header_len()
}

/// Validates a received header.
///
/// The control byte is checked before the length, so a header that is both
/// empty and inconsistent reports [`HeaderError::ControlMismatch`]. `control` is
/// ignored when the control byte is disabled.
pub fn validate_header(length: u8, control: u8, config: &LinkConfig) -> Result<(), HeaderError> {
    if config.control_byte && !Control::from_raw(control).matches(length) {
        return Err(HeaderError::ControlMismatch);
    }
    if length == 0 {
        return Err(HeaderError::ZeroLength);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_layout() {
        let control = Control::new(0x13, 0xA);
        assert_eq!(control.raw(), 0xAC);
        assert_eq!(control.check_bits(), 0xC);
        assert_eq!(control.config(), 0xA);
        assert!(control.matches(0x13));
        assert!(control.matches(0x23)); // only the low nibble is checked
        assert!(!control.matches(0x12));
    }

    #[test]
    fn test_config_is_truncated_to_nibble() {
        assert_eq!(Control::new(0xFF, 0x3F).config(), 0xF);
    }

    #[test]
    fn test_encode_header_with_control() {
        let mut out = [0u8; MAX_HEADER_LEN];
        let n = encode_header(5, 0x1, &LinkConfig::DEFAULT, &mut out);
        assert_eq!(n, 2);
        assert_eq!(out, [5, 0x1A]);
    }

    #[test]
    fn test_encode_header_without_control() {
        let mut out = [0u8; MAX_HEADER_LEN];
        let config = LinkConfig::DEFAULT.with_control_byte(false);
        let n = encode_header(5, 0x1, &config, &mut out);
        assert_eq!(n, 1);
        assert_eq!(out[0], 5);
    }

    #[test]
    fn test_validate_accepts_every_nonzero_length() {
        for length in 1..=u8::MAX {
            let control = Control::new(length, 0x7).raw();
            assert_eq!(validate_header(length, control, &LinkConfig::DEFAULT), Ok(()));
        }
    }

    #[test]
    fn test_validate_rejects_zero_length() {
        let control = Control::new(0, 0).raw();
        assert_eq!(
            validate_header(0, control, &LinkConfig::DEFAULT),
            Err(HeaderError::ZeroLength)
        );
        let config = LinkConfig::DEFAULT.with_control_byte(false);
        assert_eq!(validate_header(0, 0, &config), Err(HeaderError::ZeroLength));
    }

    #[test]
    fn test_control_mismatch_wins_over_zero_length() {
        assert_eq!(
            validate_header(0, 0x00, &LinkConfig::DEFAULT),
            Err(HeaderError::ControlMismatch)
        );
    }

    #[test]
    fn test_single_bit_flip_in_check_bits_is_rejected() {
        let length = 0x42;
        let control = Control::new(length, 0x5).raw();
        for bit in 0..4 {
            assert_eq!(
                validate_header(length, control ^ (1 << bit), &LinkConfig::DEFAULT),
                Err(HeaderError::ControlMismatch)
            );
            assert_eq!(
                validate_header(length ^ (1 << bit), control, &LinkConfig::DEFAULT),
                Err(HeaderError::ControlMismatch)
            );
        }
    }

    #[test]
    fn test_config_nibble_flip_is_not_a_header_error() {
        let control = Control::new(9, 0x5).raw() ^ 0x80;
        assert_eq!(validate_header(9, control, &LinkConfig::DEFAULT), Ok(()));
    }
}
