//! Receive engine.
//!
//! Accumulates the bytes the FIFO hands out into the packet buffer, one per
//! interrupt, and decides at two boundaries: once the header is complete the
//! header is validated and the boundary is pushed out to cover the body; once
//! the body is complete the CRC is checked. Nothing is validated before its
//! region has been fully captured.

use crate::config::LinkConfig;
use crate::consts::PACKET_CAPACITY;
use crate::crc::{crc_ccitt_update, crc_init, crc_matches};
use crate::frame::{Control, HeaderError, validate_header};
use thiserror::Error;

/// Why a frame in progress was thrown away.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub(crate) enum RxFault {
    /// The header failed validation.
    #[error("bad header: {0}")]
    Header(HeaderError),
    /// The CRC check failed.
    #[error("CRC mismatch")]
    Crc,
}

/// Outcome of feeding one byte to the [`Receiver`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum RxEvent {
    /// The current region is not complete yet.
    Pending,
    /// The header is complete and valid; the body follows.
    HeaderAccepted,
    /// The body is complete and passed the CRC check.
    FrameComplete,
    /// The frame is invalid and must be dropped.
    Rejected(RxFault),
}

/// Incoming packet buffer, its cursor pair and the running CRC.
#[derive(Debug)]
pub(crate) struct Receiver {
    buf: [u8; PACKET_CAPACITY],
    cursor: usize,
    end: usize,
    crc: u16,
}

impl Receiver {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; PACKET_CAPACITY],
            cursor: 0,
            end: 0,
            crc: crc_init(),
        }
    }

    /// Rewinds to the start of the buffer, waiting for a header.
    pub(crate) fn reset(&mut self, config: &LinkConfig) {
        self.cursor = 0;
        self.end = config.header_len();
        self.crc = crc_init();
    }

    /// Detaches the cursor pair; further bytes are ignored until [`reset`](Self::reset).
    pub(crate) fn clear(&mut self) {
        self.cursor = 0;
        self.end = 0;
    }

    /// Stores `byte` at the cursor and checks the region boundary.
    ///
    /// `in_body` selects which boundary is pending: the header's, or the body's.
    pub(crate) fn push(&mut self, byte: u8, in_body: bool, config: &LinkConfig) -> RxEvent {
        if self.cursor >= self.end {
            return RxEvent::Pending;
        }
        self.buf[self.cursor] = byte;
        self.cursor += 1;
        if config.crc {
            self.crc = crc_ccitt_update(self.crc, byte);
        }
        if self.cursor < self.end {
            return RxEvent::Pending;
        }

        if !in_body {
            let length = self.buf[0];
            let control = if config.control_byte { self.buf[1] } else { 0 };
            match validate_header(length, control, config) {
                Ok(()) => {
                    self.end = config.header_len() + usize::from(length) + config.trailer_len();
                    RxEvent::HeaderAccepted
                }
                Err(err) => RxEvent::Rejected(RxFault::Header(err)),
            }
        } else if !config.crc || crc_matches(self.crc) {
            RxEvent::FrameComplete
        } else {
            RxEvent::Rejected(RxFault::Crc)
        }
    }

    /// Declared payload length of the buffered packet.
    pub(crate) fn length(&self) -> u8 {
        self.buf[0]
    }

    /// Payload of the buffered packet.
    pub(crate) fn payload(&self, config: &LinkConfig) -> &[u8] {
        let start = config.header_len();
        &self.buf[start..start + usize::from(self.length())]
    }

    /// Config nibble of the buffered packet, zero without a control byte.
    pub(crate) fn config_nibble(&self, config: &LinkConfig) -> u8 {
        if config.control_byte {
            Control::from_raw(self.buf[1]).config()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CRC_LEN;
    use crate::tx::Transmitter;

    /// Feeds the packet part of a transmitted frame (no sync, no pad) to `rx`.
    fn feed(rx: &mut Receiver, packet: &[u8], config: &LinkConfig) -> Vec<RxEvent> {
        let mut in_body = false;
        let mut events = Vec::new();
        for &b in packet {
            let event = rx.push(b, in_body, config);
            if event == RxEvent::HeaderAccepted {
                in_body = true;
            }
            events.push(event);
        }
        events
    }

    fn packet_for(payload: &[u8], nibble: u8, config: &LinkConfig) -> Vec<u8> {
        let mut tx = Transmitter::new();
        let _ = tx.load(payload, nibble, config);
        let wire = tx.wire();
        wire[4..wire.len() - 1].to_vec()
    }

    #[test]
    fn test_receives_valid_packet() {
        let config = LinkConfig::DEFAULT;
        let packet = packet_for(b"hello", 0x9, &config);
        let mut rx = Receiver::new();
        rx.reset(&config);

        let events = feed(&mut rx, &packet, &config);
        assert_eq!(events[0], RxEvent::Pending);
        assert_eq!(events[1], RxEvent::HeaderAccepted);
        assert!(events[2..events.len() - 1].iter().all(|e| *e == RxEvent::Pending));
        assert_eq!(events.last(), Some(&RxEvent::FrameComplete));
        assert_eq!(rx.length(), 5);
        assert_eq!(rx.payload(&config), b"hello");
        assert_eq!(rx.config_nibble(&config), 0x9);
    }

    #[test]
    fn test_round_trip_all_lengths() {
        let config = LinkConfig::DEFAULT;
        for len in 1..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 + len) as u8).collect();
            let packet = packet_for(&payload, (len & 0xF) as u8, &config);
            let mut rx = Receiver::new();
            rx.reset(&config);
            let events = feed(&mut rx, &packet, &config);
            assert_eq!(events.last(), Some(&RxEvent::FrameComplete), "len {len}");
            assert_eq!(rx.payload(&config), &payload[..]);
        }
    }

    #[test]
    fn test_every_single_bit_flip_is_rejected() {
        let config = LinkConfig::DEFAULT;
        let packet = packet_for(b"integrity", 0x2, &config);
        for index in 0..packet.len() {
            for bit in 0..8 {
                let mut corrupted = packet.clone();
                corrupted[index] ^= 1 << bit;
                // The control nibble only covers the low length bits: a flip
                // above them passes the header and the receiver wants more bytes.
                let needed = config.header_len() + usize::from(corrupted[0]) + CRC_LEN;
                if corrupted.len() < needed {
                    corrupted.resize(needed, 0x00);
                }
                let mut rx = Receiver::new();
                rx.reset(&config);
                let events = feed(&mut rx, &corrupted, &config);
                assert!(
                    !events.contains(&RxEvent::FrameComplete),
                    "byte {index} bit {bit} slipped through"
                );
                if index == 0 && bit >= 4 {
                    assert_eq!(
                        events.last(),
                        Some(&RxEvent::Rejected(RxFault::Crc)),
                        "length bit {bit}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_length_bit_flip_is_a_header_error() {
        let config = LinkConfig::DEFAULT;
        let packet = packet_for(b"integrity", 0x2, &config);
        for bit in 0..4 {
            let mut corrupted = packet.clone();
            corrupted[0] ^= 1 << bit;
            let mut rx = Receiver::new();
            rx.reset(&config);
            let events = feed(&mut rx, &corrupted[..2], &config);
            assert_eq!(
                events[1],
                RxEvent::Rejected(RxFault::Header(HeaderError::ControlMismatch))
            );
        }
    }

    #[test]
    fn test_zero_length_rejected_without_control_byte() {
        let config = LinkConfig::DEFAULT.with_control_byte(false);
        let mut rx = Receiver::new();
        rx.reset(&config);
        assert_eq!(
            rx.push(0, false, &config),
            RxEvent::Rejected(RxFault::Header(HeaderError::ZeroLength))
        );
    }

    #[test]
    fn test_without_crc_body_ends_at_payload() {
        let config = LinkConfig::DEFAULT.with_crc(false);
        let packet = packet_for(b"abc", 0, &config);
        assert_eq!(packet.len(), 5);
        let mut rx = Receiver::new();
        rx.reset(&config);
        let events = feed(&mut rx, &packet, &config);
        assert_eq!(events.last(), Some(&RxEvent::FrameComplete));
        assert_eq!(rx.payload(&config), b"abc");
        assert_eq!(rx.config_nibble(&config), 0);
    }

    #[test]
    fn test_cleared_receiver_ignores_bytes() {
        let config = LinkConfig::DEFAULT;
        let mut rx = Receiver::new();
        rx.clear();
        assert_eq!(rx.push(3, false, &config), RxEvent::Pending);
        assert_eq!(rx.push(0x0C, false, &config), RxEvent::Pending);
    }
}
