//! Hardware contract consumed by the link layer.
//!
//! The [`Radio`] trait is everything [`Link`](crate::link::Link) needs from the
//! transceiver: mode switching, byte level transmit, a synchronous word exchange
//! for status and FIFO reads, a FIFO reset, and control over the interrupt
//! source. [`Rfm12`](crate::rfm12::Rfm12) implements it over SPI; tests implement
//! it with a scripted mock.
//!
//! ## Interrupt source as a lock
//!
//! The link's state is written from the interrupt handler while a frame is in
//! flight and from the main context only while the interrupt source is masked.
//! [`IrqGuard`] is that mask: it disables the source on creation and enables it
//! again when dropped, unless the holder decides the source must stay off.

use crate::consts::{
    CMD_RX_READ, CMD_STATUS_READ, STATUS_ATGL, STATUS_CRL, STATUS_DQD, STATUS_EXT, STATUS_FFEM,
    STATUS_LBD, STATUS_OFFS_MASK, STATUS_POR, STATUS_RGIT_FFIT, STATUS_RGUR_FFOV,
    STATUS_RSSI_ATS, STATUS_WKUP,
};
use core::fmt::Debug;
use core::ops::{Deref, DerefMut};

/// Operating mode of the transceiver.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RadioMode {
    /// Low power: everything but the clock logic off.
    #[default]
    Eco,
    /// Transmitter and synthesizer on, carrier keyed.
    Transmit,
    /// Receiver and baseband on, FIFO armed for the sync pattern.
    Receive,
    /// Oscillator, synthesizer and baseband on; neither transmitting nor receiving.
    Default,
}

/// The transceiver operations the link layer calls.
///
/// Every method may be called from interrupt context and must not block for
/// longer than one bus transaction.
pub trait Radio {
    /// Bus error type.
    type Error: Debug;

    /// Switches the chip's power/operating mode.
    ///
    /// Selecting the mode the chip is already in still issues the command.
    /// Switching to [`RadioMode::Receive`] also re-arms the FIFO.
    fn set_mode(&mut self, mode: RadioMode) -> Result<(), Self::Error>;

    /// The mode last selected with [`set_mode`](Radio::set_mode).
    fn mode(&self) -> RadioMode;

    /// Loads the next byte into the transmit register.
    ///
    /// Completion is signalled later by the interrupt.
    fn transmit_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Clocks a 16-bit command out and returns the 16 bits clocked in.
    fn exchange_word(&mut self, word: u16) -> Result<u16, Self::Error>;

    /// Clears the receive FIFO so it waits for a fresh sync pattern.
    fn reset_fifo(&mut self) -> Result<(), Self::Error>;

    /// Unmasks the radio interrupt.
    fn enable_irq(&mut self);

    /// Masks the radio interrupt. Takes effect immediately.
    fn disable_irq(&mut self);

    /// Reads (and thereby acknowledges) the status word.
    fn read_status(&mut self) -> Result<Status, Self::Error> {
        self.exchange_word(CMD_STATUS_READ).map(Status::from_raw)
    }

    /// Pops one byte from the receive FIFO.
    fn read_fifo(&mut self) -> Result<u8, Self::Error> {
        self.exchange_word(CMD_RX_READ).map(|word| word as u8)
    }

    /// Switches mode only if the chip is not already in `mode`.
    fn ensure_mode(&mut self, mode: RadioMode) -> Result<(), Self::Error> {
        if self.mode() != mode {
            self.set_mode(mode)
        } else {
            Ok(())
        }
    }
}

/// Decoded status word.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Status(u16);

impl Status {
    /// Wraps a raw status word.
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// The raw word.
    pub const fn raw(self) -> u16 {
        self.0
    }

    const fn has(self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    /// RGIT/FFIT: transmit register ready for the next byte, or FIFO holds a byte.
    pub const fn byte_ready(self) -> bool {
        self.has(STATUS_RGIT_FFIT)
    }

    /// RGUR/FFOV: transmit register underrun, or receive FIFO overflow.
    pub const fn under_overrun(self) -> bool {
        self.has(STATUS_RGUR_FFOV)
    }

    /// POR: power-on reset occurred.
    pub const fn power_on_reset(self) -> bool {
        self.has(STATUS_POR)
    }

    /// WKUP: wake-up timer overflow.
    pub const fn wake_up(self) -> bool {
        self.has(STATUS_WKUP)
    }

    /// EXT: external interrupt input went low.
    pub const fn external(self) -> bool {
        self.has(STATUS_EXT)
    }

    /// LBD: supply below the low battery threshold.
    pub const fn low_battery(self) -> bool {
        self.has(STATUS_LBD)
    }

    /// FFEM: receive FIFO empty.
    pub const fn fifo_empty(self) -> bool {
        self.has(STATUS_FFEM)
    }

    /// RSSI/ATS: signal strength above threshold.
    pub const fn rssi(self) -> bool {
        self.has(STATUS_RSSI_ATS)
    }

    /// DQD: data quality detector reports a good signal.
    pub const fn data_quality(self) -> bool {
        self.has(STATUS_DQD)
    }

    /// CRL: clock recovery locked.
    pub const fn clock_locked(self) -> bool {
        self.has(STATUS_CRL)
    }

    /// ATGL: AFC cycle toggled.
    pub const fn afc_toggle(self) -> bool {
        self.has(STATUS_ATGL)
    }

    /// OFFS: AFC frequency offset, sign bit included.
    pub const fn afc_offset(self) -> u8 {
        (self.0 & STATUS_OFFS_MASK) as u8
    }
}

/// Interrupt source mask held for the duration of a (re)configuration.
///
/// Dereferences to the radio so the holder can keep issuing commands while
/// the interrupt is off.
#[derive(Debug)]
pub struct IrqGuard<'a, R: Radio> {
    radio: &'a mut R,
    release: bool,
}

impl<'a, R: Radio> IrqGuard<'a, R> {
    /// Masks the interrupt of `radio`.
    pub fn acquire(radio: &'a mut R) -> Self {
        radio.disable_irq();
        Self {
            radio,
            release: true,
        }
    }

    /// Leaves the interrupt masked when the guard is dropped.
    pub fn keep_masked(&mut self) {
        self.release = false;
    }
}

impl<R: Radio> Deref for IrqGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.radio
    }
}

impl<R: Radio> DerefMut for IrqGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.radio
    }
}

impl<R: Radio> Drop for IrqGuard<'_, R> {
    fn drop(&mut self) {
        if self.release {
            self.radio.enable_irq();
        }
    }
}
