//! # rfm12-link
//!
//! A portable, no_std packet link layer for HopeRF RFM12/RFM12B FSK transceivers.
//!
//! The chip moves one byte per interrupt: it asks for the next transmit byte, or
//! hands out the next received one. This crate turns that into whole frames:
//! - `embedded-hal` SPI for the chip itself ([`rfm12`])
//! - an interrupt dispatcher that feeds and drains the chip ([`link`])
//! - length, control byte and CCITT CRC framing with retry or abort on error
//! - interrupt-safe global access with `critical-section` ([`isr`]), or a
//!   blocking pin-polling driver ([`poll`])
//!
//! ## Crate features
//! | Feature                | Description |
//! |------------------------|-------------|
//! | `std`                  | Disables `#![no_std]` |
//! | `global-isr` (default) | `critical_section` global link and macros |
//! | `poll-loop`            | nIRQ polling with `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`            | Uses `defmt` logging |
//! | `log`                  | Uses `log` logging |
//!
//! ## Frame format
//!
//! ```text
//! [AA AA 2D D4][length][control][payload ...][crc lo][crc hi][AA]
//! ```
//!
//! The sync pattern is consumed by the chip's FIFO; the receiver only sees the
//! bytes from the length onwards. The control byte and the CRC can each be
//! turned off with [`LinkConfig`], on both ends.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rfm12_link::{init_rf_link, rf_link_interrupt, setup_rf_link, isr, LinkConfig};
//! use rfm12_link::rfm12::{Rfm12, Rfm12Config};
//!
//! init_rf_link!(Rfm12<MySpi, MyIrq>);
//!
//! #[interrupt]
//! fn INT0() {
//!     let _ = rf_link_interrupt!();
//! }
//!
//! fn main() {
//!     let mut radio = Rfm12::new(spi, nirq, Rfm12Config::default());
//!     radio.init().unwrap();
//!     setup_rf_link!(radio, LinkConfig::DEFAULT).unwrap();
//!
//!     isr::global_link_with(&RF_LINK, |link| link.prepare(b"hello", 0));
//!     isr::global_link_wait_tx(&RF_LINK);
//!
//!     isr::global_link_with(&RF_LINK, |link| link.arm_rx());
//!     isr::global_link_wait_rx(&RF_LINK);
//!     let reply = isr::global_link_with(&RF_LINK, |link| {
//!         link.take_frame().map(heapless::Vec::<u8, 256>::from_slice)
//!     });
//! }
//! ```
//!
//! Without an interrupt vector, `poll::transmit_blocking` and
//! `poll::receive_blocking` sample nIRQ instead.
//!
//! ## Integration Notes
//!
//! - Only one [`Link`] should drive a given chip.
//! - The link is half duplex: starting a transmission discards a received
//!   frame that has not been read, and vice versa.
//! - Frame errors are never returned to the caller; they are counted in
//!   [`Stats`] and handled by the configured retry policy.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "global-isr")]
pub use critical_section;

pub use heapless;

mod fmt;

pub mod config;
pub mod consts;
pub mod crc;
pub mod frame;
pub mod hal;
pub mod link;
pub mod rfm12;
pub mod stats;

mod rx;
mod tx;

#[cfg(feature = "global-isr")]
pub mod isr;

#[cfg(feature = "poll-loop")]
pub mod poll;

#[cfg(test)]
mod mock;

pub use config::LinkConfig;
pub use hal::{Radio, RadioMode, Status};
pub use link::{Link, LinkError, LinkMode};
pub use stats::Stats;
