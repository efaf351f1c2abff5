//! Link feature selection.
//!
//! [`LinkConfig`] chooses which optional frame fields exist on the wire and how
//! each direction reacts to a failed frame. Both ends of a link must agree on
//! `crc` and `control_byte`; the retry policies are local.

use crate::consts::{CONTROL_FIELD_LEN, CRC_LEN, LENGTH_FIELD_LEN};

/// Selects the optional parts of the link layer.
///
/// ## Example
///
/// ```rust
/// use rfm12_link::config::LinkConfig;
///
/// // Minimal variant: bare length-delimited frames, abort on every error.
/// let config = LinkConfig::DEFAULT
///     .with_crc(false)
///     .with_control_byte(false)
///     .with_tx_retry(false)
///     .with_rx_retry(false);
/// assert_eq!(config.header_len(), 1);
/// assert_eq!(config.trailer_len(), 0);
/// ```
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct LinkConfig {
    /// Append a CCITT CRC to every frame and verify it on reception.
    pub crc: bool,
    /// Send a control byte after the length: four length check bits for early
    /// rejection plus a four bit application config nibble.
    pub control_byte: bool,
    /// Restart the frame from the first byte after a transmitter underrun
    /// instead of giving up.
    pub tx_retry: bool,
    /// Keep listening after a rejected frame instead of dropping to idle.
    pub rx_retry: bool,
}

impl LinkConfig {
    /// Every feature enabled.
    pub const DEFAULT: Self = Self {
        crc: true,
        control_byte: true,
        tx_retry: true,
        rx_retry: true,
    };

    /// Sets [`crc`](LinkConfig::crc).
    pub const fn with_crc(mut self, crc: bool) -> Self {
        self.crc = crc;
        self
    }

    /// Sets [`control_byte`](LinkConfig::control_byte).
    pub const fn with_control_byte(mut self, control_byte: bool) -> Self {
        self.control_byte = control_byte;
        self
    }

    /// Sets [`tx_retry`](LinkConfig::tx_retry).
    pub const fn with_tx_retry(mut self, tx_retry: bool) -> Self {
        self.tx_retry = tx_retry;
        self
    }

    /// Sets [`rx_retry`](LinkConfig::rx_retry).
    pub const fn with_rx_retry(mut self, rx_retry: bool) -> Self {
        self.rx_retry = rx_retry;
        self
    }

    /// Number of header bytes on the wire.
    pub const fn header_len(&self) -> usize {
        if self.control_byte {
            LENGTH_FIELD_LEN + CONTROL_FIELD_LEN
        } else {
            LENGTH_FIELD_LEN
        }
    }

    /// Number of trailer bytes on the wire.
    pub const fn trailer_len(&self) -> usize {
        if self.crc { CRC_LEN } else { 0 }
    }

    /// Header plus trailer: everything in a packet except the payload.
    pub const fn overhead_len(&self) -> usize {
        self.header_len() + self.trailer_len()
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
