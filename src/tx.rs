//! Transmit engine.
//!
//! Owns the outgoing frame buffer and the send cursor. The buffer holds the
//! whole frame exactly as it goes on the air:
//!
//! ```text
//! [AA AA 2D D4][length][control?][payload ...][crc lo?][crc hi?][pad]
//! ```
//!
//! The first byte is loaded into the transmit register when the frame is
//! started; every later byte is handed out by [`Transmitter::next_byte`] from
//! the byte-ready interrupt, so the cursor starts at 1.

use crate::config::LinkConfig;
use crate::consts::{
    FRAME_CAPACITY, MAX_HEADER_LEN, MAX_PAYLOAD_LEN, PAD_BYTE, SYNC_LEN, SYNC_PATTERN,
};
use crate::crc::{crc_ccitt, crc_init};
use crate::frame::encode_header;
use heapless::Vec;

/// Outgoing frame buffer and its cursor pair.
#[derive(Debug)]
pub(crate) struct Transmitter {
    buf: Vec<u8, FRAME_CAPACITY>,
    cursor: usize,
    end: usize,
}

impl Transmitter {
    pub(crate) const fn new() -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            end: 0,
        }
    }

    /// Builds the frame for `payload` and rewinds the cursor.
    ///
    /// Returns the first wire byte, which the caller must load into the
    /// transmit register to start the frame. `payload` must hold
    /// `1..=MAX_PAYLOAD_LEN` bytes.
    pub(crate) fn load(&mut self, payload: &[u8], config_nibble: u8, config: &LinkConfig) -> u8 {
        debug_assert!(!payload.is_empty() && payload.len() <= MAX_PAYLOAD_LEN);
        let length = payload.len() as u8;

        // FRAME_CAPACITY covers the largest frame, so none of these can fail.
        self.buf.clear();
        let _ = self.buf.extend_from_slice(&SYNC_PATTERN);
        let mut header = [0u8; MAX_HEADER_LEN];
        let header_len = encode_header(length, config_nibble, config, &mut header);
        let _ = self.buf.extend_from_slice(&header[..header_len]);
        let _ = self.buf.extend_from_slice(payload);
        if config.crc {
            let crc = crc_ccitt(crc_init(), &self.buf[SYNC_LEN..]);
            let _ = self.buf.extend_from_slice(&crc.to_le_bytes());
        }
        let _ = self.buf.push(PAD_BYTE);

        self.end = self.buf.len();
        self.rewind()
    }

    /// Hands out the byte under the cursor and advances it.
    ///
    /// Returns `None` once the pad byte has gone out.
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        if self.cursor >= self.end {
            return None;
        }
        let byte = self.buf[self.cursor];
        self.cursor += 1;
        Some(byte)
    }

    /// Restarts the frame from the beginning.
    ///
    /// Returns the first wire byte.
    pub(crate) fn rewind(&mut self) -> u8 {
        self.cursor = 1;
        self.buf.first().copied().unwrap_or(SYNC_PATTERN[0])
    }

    /// Detaches the cursor pair from the buffer.
    pub(crate) fn clear(&mut self) {
        self.cursor = 0;
        self.end = 0;
    }

    /// The frame as it is sent, pad byte included. Empty after [`clear`](Self::clear).
    pub(crate) fn wire(&self) -> &[u8] {
        &self.buf[..self.end]
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub(crate) fn end(&self) -> usize {
        self.end
    }
}
