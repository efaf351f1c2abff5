//! Constants used across the link layer.
//!
//! This module defines the wire layout sizes, the synchronization pattern,
//! the RFM12 status-word bit masks and the chip command words the
//! [`rfm12`](crate::rfm12) driver issues.
//!
//! ## Key Concepts
//!
//! - **Frame**: `[sync: 4][length: 1][control: 1?][payload: length][crc: 2?]`
//! - **Header**: the length byte plus the optional control byte.
//! - **Trailer**: the optional little-endian CCITT CRC.
//! - **Status word**: 16 bits clocked out of the chip by a `0x0000` command.
//!
//! Sizes are given for the fully featured frame; [`LinkConfig`](crate::config::LinkConfig)
//! selects which optional fields are actually present on the wire.

/// Frame synchronization pattern.
///
/// `0xAA 0xAA` is the preamble the receiver trains its clock recovery on,
/// `0x2D 0xD4` is the pattern the RFM12 FIFO fills after.
pub const SYNC_PATTERN: [u8; SYNC_LEN] = [0xAA, 0xAA, 0x2D, 0xD4];

/// Length (in bytes) of [`SYNC_PATTERN`].
pub const SYNC_LEN: usize = 4;

/// Length (in bytes) of the length field.
pub const LENGTH_FIELD_LEN: usize = 1;

/// Length (in bytes) of the control byte, when enabled.
pub const CONTROL_FIELD_LEN: usize = 1;

/// Length (in bytes) of the CRC trailer, when enabled.
pub const CRC_LEN: usize = 2;

/// Largest header: length byte plus control byte.
pub const MAX_HEADER_LEN: usize = LENGTH_FIELD_LEN + CONTROL_FIELD_LEN;

/// Size of the message area of a packet buffer.
///
/// The receive buffer is dimensioned for this many payload bytes even though
/// the 8-bit length field can only describe [`MAX_PAYLOAD_LEN`] of them.
pub const MAX_MESSAGE_SIZE: usize = 256;

/// Largest payload a frame can carry, bounded by the 8-bit length field.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Capacity of the receive buffer: header, message area and CRC trailer.
pub const PACKET_CAPACITY: usize = MAX_HEADER_LEN + MAX_MESSAGE_SIZE + CRC_LEN;

/// Capacity of the transmit buffer: sync pattern, packet and the trailing pad byte.
pub const FRAME_CAPACITY: usize = SYNC_LEN + PACKET_CAPACITY + PAD_LEN;

/// Number of dummy bytes clocked out after the CRC.
///
/// Keeps the carrier up long enough for the remote receiver to drain its
/// synchronizer before the transmitter goes quiet.
pub const PAD_LEN: usize = 1;

/// Value of the pad byte.
pub const PAD_BYTE: u8 = 0xAA;

/// Seed of the running CCITT CRC.
pub const CRC_INIT: u16 = 0xFFFF;

/// Bit offset of the application config nibble inside the control byte.
pub const CONTROL_CONFIG_SHIFT: u8 = 4;

/// Mask of the length check bits inside the control byte.
pub const CONTROL_CHECK_MASK: u8 = 0x0F;

// Status word bits.

/// TX register ready (transmit) / FIFO has data (receive).
pub const STATUS_RGIT_FFIT: u16 = 1 << 15;
/// Power-on reset.
pub const STATUS_POR: u16 = 1 << 14;
/// TX register underrun (transmit) / FIFO overflow (receive).
pub const STATUS_RGUR_FFOV: u16 = 1 << 13;
/// Wake-up timer overflow.
pub const STATUS_WKUP: u16 = 1 << 12;
/// Interrupt on the external input pin.
pub const STATUS_EXT: u16 = 1 << 11;
/// Low battery detected.
pub const STATUS_LBD: u16 = 1 << 10;
/// FIFO is empty.
pub const STATUS_FFEM: u16 = 1 << 9;
/// RSSI above threshold (receive) / antenna tuning signal (transmit).
pub const STATUS_RSSI_ATS: u16 = 1 << 8;
/// Data quality detector.
pub const STATUS_DQD: u16 = 1 << 7;
/// Clock recovery locked.
pub const STATUS_CRL: u16 = 1 << 6;
/// AFC cycle toggle.
pub const STATUS_ATGL: u16 = 1 << 5;
/// AFC offset value.
pub const STATUS_OFFS_MASK: u16 = 0x001F;

// Command words.

/// Reading with an all-zero command clocks out the status word.
pub const CMD_STATUS_READ: u16 = 0x0000;
/// Receiver FIFO read.
pub const CMD_RX_READ: u16 = 0xB000;
/// Transmitter register write; the data byte is ORed into the low byte.
pub const CMD_TX_WRITE: u16 = 0xB800;

/// Power management base.
pub const CMD_POWER: u16 = 0x8200;
/// Power management: enable receiver.
pub const POWER_ER: u16 = 1 << 7;
/// Power management: baseband on.
pub const POWER_EBB: u16 = 1 << 6;
/// Power management: enable transmitter.
pub const POWER_ET: u16 = 1 << 5;
/// Power management: synthesizer on.
pub const POWER_ES: u16 = 1 << 4;
/// Power management: crystal oscillator on.
pub const POWER_EX: u16 = 1 << 3;
/// Power management: disable clock output.
pub const POWER_DC: u16 = 1 << 0;

/// FIFO and reset mode base.
pub const CMD_FIFO: u16 = 0xCA00;
/// FIFO: interrupt after 8 bits received.
pub const FIFO_IT_LEVEL_8: u16 = 8 << 4;
/// FIFO: fill enable; filling stops when cleared.
pub const FIFO_FF: u16 = 1 << 1;
/// FIFO: disable the highly sensitive reset.
pub const FIFO_DRESET: u16 = 1 << 0;
/// FIFO fill disabled (synchronization pattern start).
pub const CMD_FIFO_OFF: u16 = CMD_FIFO | FIFO_IT_LEVEL_8 | FIFO_DRESET;
/// FIFO fill armed; fills after the synchronization pattern.
pub const CMD_FIFO_ON: u16 = CMD_FIFO_OFF | FIFO_FF;
