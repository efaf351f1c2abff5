//! Blocking link driver for targets without an external interrupt.
//!
//! The RFM12 pulls nIRQ low while any status flag is pending. Instead of an
//! interrupt vector, these helpers sample that pin and call the dispatcher
//! whenever it is low, sleeping `poll_us` microseconds between samples while
//! it is high. Build the radio with `()` as its interrupt control.
//!
//! # Example
//! ```rust,ignore
//! use rfm12_link::poll::{receive_blocking, transmit_blocking};
//!
//! transmit_blocking(&mut link, &mut nirq, &mut delay, b"ping", 0, 10)?;
//! if let Some(reply) = receive_blocking(&mut link, &mut nirq, &mut delay, 10)? {
//!     // use reply
//! }
//! ```
//!
//! # Notes
//! - These loops never time out. With receive retry enabled,
//!   [`receive_blocking`] returns only once a valid frame has arrived.
//! - The sample period must be shorter than one byte time on the air, or the
//!   FIFO overruns and the transmitter underruns.

use crate::hal::Radio;
use crate::link::{Link, LinkError};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use thiserror::Error;

/// Errors raised while polling.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PollError<RE: Debug, PE: Debug> {
    /// The link failed.
    #[error("link error: {0}")]
    Link(LinkError<RE>),
    /// Reading the nIRQ pin failed.
    #[error("nIRQ pin error: {0:?}")]
    Pin(PE),
}

impl<RE: Debug, PE: Debug> From<LinkError<RE>> for PollError<RE, PE> {
    fn from(err: LinkError<RE>) -> Self {
        PollError::Link(err)
    }
}

/// Services the link once if nIRQ is asserted.
///
/// Returns whether the dispatcher ran.
pub fn service_pending<R: Radio, P: InputPin>(
    link: &mut Link<R>,
    irq: &mut P,
) -> Result<bool, PollError<R::Error, P::Error>> {
    if irq.is_low().map_err(PollError::Pin)? {
        link.on_interrupt()?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Sends `payload` and returns once the frame is out, or the transmitter
/// has given up after an underrun.
pub fn transmit_blocking<R: Radio, P: InputPin, D: DelayNs>(
    link: &mut Link<R>,
    irq: &mut P,
    delay: &mut D,
    payload: &[u8],
    config_nibble: u8,
    poll_us: u32,
) -> Result<(), PollError<R::Error, P::Error>> {
    link.prepare(payload, config_nibble)?;
    while link.poll_tx().is_err() {
        if !service_pending(link, irq)? {
            delay.delay_us(poll_us);
        }
    }
    Ok(())
}

/// Arms the receiver and waits for the outcome.
///
/// Returns the payload, or `None` if the receiver gave up on a bad frame.
pub fn receive_blocking<'a, R: Radio, P: InputPin, D: DelayNs>(
    link: &'a mut Link<R>,
    irq: &mut P,
    delay: &mut D,
    poll_us: u32,
) -> Result<Option<&'a [u8]>, PollError<R::Error, P::Error>> {
    link.arm_rx()?;
    while link.poll_rx().is_err() {
        if !service_pending(link, irq)? {
            delay.delay_us(poll_us);
        }
    }
    Ok(link.take_frame())
}
