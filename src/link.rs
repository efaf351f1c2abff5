//! Interrupt-driven packet link over a [`Radio`].
//!
//! This module provides [`Link`], the single owner of the transport state: the
//! current [`LinkMode`], the transmit and receive engines, the statistics and the
//! radio itself. The main context starts a transfer with
//! [`prepare`](Link::prepare) or [`arm_rx`](Link::arm_rx) and then waits; the
//! radio interrupt calls [`on_interrupt`](Link::on_interrupt), which moves bytes
//! between the chip and the buffers until the frame reaches a terminal state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rfm12_link::{config::LinkConfig, link::Link};
//!
//! let mut link = Link::new(radio, LinkConfig::DEFAULT)?;
//!
//! link.prepare(b"ping", 0x1)?;
//! while link.poll_tx().is_err() {
//!     if nirq.is_low()? {
//!         link.on_interrupt()?;
//!     }
//! }
//!
//! link.arm_rx()?;
//! while link.poll_rx().is_err() {
//!     if nirq.is_low()? {
//!         link.on_interrupt()?;
//!     }
//! }
//! if let Some(payload) = link.take_frame() {
//!     // use payload
//! }
//! ```
//!
//! ## Buffers
//!
//! There is exactly one transmit and one receive buffer. Starting a transfer
//! while the previous received frame has not been read discards that frame;
//! the link does not guard against it.
//!
//! ## Waiting
//!
//! A `Link` only moves when [`on_interrupt`](Link::on_interrupt) runs, so it
//! has no blocking wait of its own. [`poll_tx`](Link::poll_tx) and
//! [`poll_rx`](Link::poll_rx) report `WouldBlock` until the transfer ends. A
//! receive with retry enabled ends only once a valid frame arrives, and a
//! transmit ends once the chip has asked for every byte. Call
//! [`idle`](Link::idle) to abandon a transfer.
//!
//! To block, either share the link with the interrupt through the `isr`
//! helpers (`global_link_wait_tx`, `global_link_wait_rx`), which release the
//! lock between polls, or sample nIRQ with the `poll` helpers.

use crate::config::LinkConfig;
use crate::consts::MAX_PAYLOAD_LEN;
use crate::fmt::{debug, trace, warning};
use crate::hal::{IrqGuard, Radio, RadioMode};
use crate::rx::{Receiver, RxEvent, RxFault};
use crate::stats::Stats;
use crate::tx::Transmitter;
use core::convert::Infallible;
use core::fmt::Debug;
use thiserror::Error;

/// State of the transport.
///
/// Receive-side and transmit-side modes are mutually exclusive: only one
/// direction's buffer and cursors are live at a time.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LinkMode {
    /// Nothing in progress, interrupt masked.
    #[default]
    Idle,
    /// Receiver armed, waiting for the length and control bytes.
    RxWaitingHeader,
    /// Header accepted, collecting payload and CRC.
    RxInBody,
    /// A valid frame is in the receive buffer. Interrupt masked.
    RxComplete,
    /// The last frame was fully sent. Interrupt masked, carrier still keyed.
    TxIdle,
    /// A frame is being clocked out.
    TxInProgress,
}

impl LinkMode {
    /// True while the receiver is collecting a frame.
    pub const fn is_receiving(self) -> bool {
        matches!(self, LinkMode::RxWaitingHeader | LinkMode::RxInBody)
    }

    /// True while a frame is being transmitted.
    pub const fn is_transmitting(self) -> bool {
        matches!(self, LinkMode::TxInProgress)
    }

    /// True while either direction owns the interrupt.
    pub const fn is_busy(self) -> bool {
        self.is_receiving() || self.is_transmitting()
    }
}

/// Errors returned to the caller.
///
/// Frame-level failures (bad header, CRC mismatch, underrun, overrun) never
/// show up here; they are counted in [`Stats`] and handled by the link itself.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LinkError<E: Debug> {
    /// The radio bus failed. The link state is consistent, but the radio
    /// command that failed was not carried out.
    #[error("radio bus error: {0:?}")]
    Radio(E),
    /// Payloads must hold `1..=255` bytes.
    #[error("payload length {0} out of range")]
    InvalidLength(usize),
    /// The other direction, or this one, is still in progress.
    #[error("link busy in mode {0:?}")]
    Busy(LinkMode),
}

/// A half-duplex packet link.
///
/// ## Type Parameters
///
/// - `R`: the transceiver, see [`Radio`].
///
/// ## Notes
///
/// - Only one `Link` should drive a given radio.
/// - Everything that reconfigures the link masks the radio interrupt while it
///   writes the shared state, and unmasks it once the state is complete.
#[derive(Debug)]
pub struct Link<R: Radio> {
    radio: R,
    config: LinkConfig,
    mode: LinkMode,
    tx: Transmitter,
    rx: Receiver,
    stats: Stats,
}

impl<R: Radio> Link<R> {
    /// Creates a link on `radio` and puts it to idle.
    ///
    /// The interrupt source is left masked and the chip in low-power mode.
    pub fn new(radio: R, config: LinkConfig) -> Result<Self, LinkError<R::Error>> {
        let mut link = Self {
            radio,
            config,
            mode: LinkMode::Idle,
            tx: Transmitter::new(),
            rx: Receiver::new(),
            stats: Stats::default(),
        };
        link.idle()?;
        Ok(link)
    }

    /// Abandons any transfer in progress and powers the chip down.
    ///
    /// A received frame that was not yet read is dropped.
    pub fn idle(&mut self) -> Result<(), LinkError<R::Error>> {
        let mut radio = IrqGuard::acquire(&mut self.radio);
        radio.keep_masked();
        self.mode = LinkMode::Idle;
        self.tx.clear();
        self.rx.clear();
        radio.set_mode(RadioMode::Eco).map_err(LinkError::Radio)
    }

    /// Keys the transmitter ahead of the next [`prepare`](Link::prepare).
    ///
    /// Gives a remote receiver time to lock onto the carrier when the link
    /// alternates between receiving and transmitting. Abandons any transfer
    /// in progress.
    pub fn tx_pre_init(&mut self) -> Result<(), LinkError<R::Error>> {
        let mut radio = IrqGuard::acquire(&mut self.radio);
        radio.keep_masked();
        self.mode = LinkMode::Idle;
        self.tx.clear();
        self.rx.clear();
        radio.set_mode(RadioMode::Transmit).map_err(LinkError::Radio)
    }

    /// Starts transmitting `payload`.
    ///
    /// Builds the frame, keys the transmitter if needed and loads the first
    /// byte; the interrupt does the rest. `config_nibble` travels in the high
    /// half of the control byte (ignored without one).
    ///
    /// # Errors
    /// - [`LinkError::InvalidLength`] unless `1 <= payload.len() <= 255`
    /// - [`LinkError::Busy`] while a frame is being sent or received
    /// - [`LinkError::Radio`] if starting the transmitter failed; the link is
    ///   then idle
    pub fn prepare(&mut self, payload: &[u8], config_nibble: u8) -> Result<(), LinkError<R::Error>> {
        if payload.is_empty() || payload.len() > MAX_PAYLOAD_LEN {
            return Err(LinkError::InvalidLength(payload.len()));
        }
        if self.mode.is_busy() {
            return Err(LinkError::Busy(self.mode));
        }

        let mut radio = IrqGuard::acquire(&mut self.radio);
        let first = self.tx.load(payload, config_nibble, &self.config);
        self.rx.clear();
        self.mode = LinkMode::TxInProgress;

        let started = radio
            .ensure_mode(RadioMode::Transmit)
            .and_then(|()| radio.transmit_byte(first))
            .and_then(|()| radio.read_status().map(|_| ()));
        if let Err(err) = started {
            radio.keep_masked();
            self.mode = LinkMode::Idle;
            self.tx.clear();
            return Err(LinkError::Radio(err));
        }
        trace!("tx: started {} byte frame", payload.len());
        Ok(())
    }

    /// Arms the receiver for the next frame.
    ///
    /// Invalidates the frame returned by [`take_frame`](Link::take_frame).
    ///
    /// # Errors
    /// - [`LinkError::Busy`] while a frame is being sent or received
    /// - [`LinkError::Radio`] if switching the chip to receive failed; the
    ///   link is then idle
    pub fn arm_rx(&mut self) -> Result<(), LinkError<R::Error>> {
        if self.mode.is_busy() {
            return Err(LinkError::Busy(self.mode));
        }

        let mut radio = IrqGuard::acquire(&mut self.radio);
        self.tx.clear();
        self.rx.reset(&self.config);
        self.mode = LinkMode::RxWaitingHeader;

        let armed = if radio.mode() == RadioMode::Receive {
            radio.reset_fifo()
        } else {
            radio.set_mode(RadioMode::Receive)
        }
        .and_then(|()| radio.read_status().map(|_| ()));
        if let Err(err) = armed {
            radio.keep_masked();
            self.mode = LinkMode::Idle;
            self.rx.clear();
            return Err(LinkError::Radio(err));
        }
        trace!("rx: armed");
        Ok(())
    }

    /// Non-blocking check for the end of a transmission.
    pub fn poll_tx(&self) -> nb::Result<(), Infallible> {
        if self.mode == LinkMode::TxInProgress {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Non-blocking check for the end of a reception: a frame arrived, or the
    /// receiver gave up.
    pub fn poll_rx(&self) -> nb::Result<(), Infallible> {
        if self.rx_ready() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// True once the last frame has been sent completely.
    pub fn tx_ready(&self) -> bool {
        self.mode == LinkMode::TxIdle
    }

    /// True once the receiver has either a frame or nothing left to do.
    pub fn rx_ready(&self) -> bool {
        matches!(self.mode, LinkMode::RxComplete | LinkMode::Idle)
    }

    /// The payload of the received frame, if one is waiting.
    ///
    /// Does not consume the frame: repeated calls return the same bytes until
    /// the receiver is re-armed or a transmission is started.
    pub fn take_frame(&self) -> Option<&[u8]> {
        if self.mode == LinkMode::RxComplete {
            Some(self.rx.payload(&self.config))
        } else {
            None
        }
    }

    /// The config nibble of the received frame, if one is waiting.
    pub fn rx_config(&self) -> Option<u8> {
        if self.mode == LinkMode::RxComplete {
            Some(self.rx.config_nibble(&self.config))
        } else {
            None
        }
    }

    /// Current transport state.
    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// The features this link was built with.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// The raw bytes of the frame being (or last) transmitted, sync pattern and
    /// pad byte included. Empty when no frame is loaded.
    pub fn tx_wire(&self) -> &[u8] {
        self.tx.wire()
    }

    /// The underlying radio.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Gives the radio back.
    pub fn release(self) -> R {
        self.radio
    }

    /// Services one radio interrupt.
    ///
    /// Call this from the radio's interrupt handler. It reads the status word,
    /// which acknowledges the interrupt, then:
    ///
    /// 1. on underrun/overrun, hands over to the retry or abort policy of the
    ///    active direction;
    /// 2. while transmitting, loads the next byte or finishes the frame;
    /// 3. while receiving, pops a byte from the FIFO and feeds the receiver.
    ///
    /// Every path performs a complete state transition and does a bounded
    /// amount of work.
    ///
    /// # Errors
    /// Only bus failures are reported; see [`LinkError::Radio`].
    pub fn on_interrupt(&mut self) -> Result<(), LinkError<R::Error>> {
        let status = self.radio.read_status().map_err(LinkError::Radio)?;

        if status.under_overrun() {
            return match self.mode {
                LinkMode::TxInProgress => self.on_underrun(),
                LinkMode::RxWaitingHeader | LinkMode::RxInBody => self.on_overrun(),
                mode => {
                    warning!("under/overrun while {:?}", mode);
                    Ok(())
                }
            };
        }

        match self.mode {
            LinkMode::TxInProgress => self.on_byte_ready(),
            LinkMode::RxWaitingHeader | LinkMode::RxInBody => {
                let byte = self.radio.read_fifo().map_err(LinkError::Radio)?;
                self.on_byte_received(byte)
            }
            mode => {
                warning!("spurious interrupt while {:?}, status {}", mode, status.raw());
                Ok(())
            }
        }
    }

    fn on_byte_ready(&mut self) -> Result<(), LinkError<R::Error>> {
        match self.tx.next_byte() {
            Some(byte) => self.radio.transmit_byte(byte).map_err(LinkError::Radio),
            None => {
                // Pad byte is out. The carrier stays keyed so the remote
                // receiver keeps its clock until the frame has drained.
                self.mode = LinkMode::TxIdle;
                self.stats.count_tx();
                self.radio.disable_irq();
                trace!("tx: frame sent");
                Ok(())
            }
        }
    }

    fn on_underrun(&mut self) -> Result<(), LinkError<R::Error>> {
        self.stats.count_ctr_err();
        if self.config.tx_retry {
            debug!("tx: underrun, restarting frame");
            let first = self.tx.rewind();
            self.radio.transmit_byte(first).map_err(LinkError::Radio)
        } else {
            debug!("tx: underrun, aborting frame");
            self.mode = LinkMode::Idle;
            self.tx.clear();
            self.radio.disable_irq();
            self.radio.set_mode(RadioMode::Default).map_err(LinkError::Radio)
        }
    }

    fn on_overrun(&mut self) -> Result<(), LinkError<R::Error>> {
        self.stats.count_ctr_err();
        debug!("rx: FIFO overrun");
        self.reset_to_waiting_header()
    }

    fn on_byte_received(&mut self, byte: u8) -> Result<(), LinkError<R::Error>> {
        let in_body = self.mode == LinkMode::RxInBody;
        match self.rx.push(byte, in_body, &self.config) {
            RxEvent::Pending => Ok(()),
            RxEvent::HeaderAccepted => {
                self.mode = LinkMode::RxInBody;
                Ok(())
            }
            RxEvent::FrameComplete => {
                self.mode = LinkMode::RxComplete;
                self.stats.count_rx();
                self.radio.disable_irq();
                trace!("rx: {} byte frame received", self.rx.length());
                self.radio.set_mode(RadioMode::Default).map_err(LinkError::Radio)
            }
            RxEvent::Rejected(fault) => {
                match fault {
                    RxFault::Header(_) => self.stats.count_ctr_err(),
                    RxFault::Crc => self.stats.count_crc_err(),
                }
                debug!("rx: dropped frame: {:?}", fault);
                self.reset_to_waiting_header()
            }
        }
    }

    /// Error path of the receiver: listen again, or give up.
    fn reset_to_waiting_header(&mut self) -> Result<(), LinkError<R::Error>> {
        if self.config.rx_retry {
            self.rx.reset(&self.config);
            self.mode = LinkMode::RxWaitingHeader;
            self.radio.reset_fifo().map_err(LinkError::Radio)
        } else {
            self.mode = LinkMode::Idle;
            self.rx.clear();
            self.radio.disable_irq();
            self.radio.set_mode(RadioMode::Default).map_err(LinkError::Radio)
        }
    }
}
