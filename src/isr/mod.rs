//! Global link instance for interrupt-driven firmware.
//!
//! The radio interrupt and the main loop both need the [`Link`]. These helpers
//! keep it in a `static` behind a `critical_section::Mutex`, install it from
//! `main()` and service it from the interrupt vector:
//!
//! - `global_link_init`: `const` initializer for the static
//! - `global_link_setup`: builds the link inside a critical section
//! - `global_link_interrupt`: calls the dispatcher from the interrupt vector
//! - `global_link_with`: runs a closure against the link (`prepare`, `arm_rx`, ...)
//! - `global_link_wait_tx` / `global_link_wait_rx`: spin waits that release the
//!   lock between polls so the interrupt keeps running
//!
//! The macros `init_rf_link!`, `setup_rf_link!` and `rf_link_interrupt!` wrap
//! the same calls around a static named `RF_LINK`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rfm12_link::{isr::*, config::LinkConfig};
//!
//! static RF_LINK: GlobalLink<MyRadio> = global_link_init();
//!
//! #[interrupt]
//! fn INT0() {
//!     let _ = global_link_interrupt(&RF_LINK);
//! }
//!
//! fn main() {
//!     global_link_setup(&RF_LINK, radio, LinkConfig::DEFAULT).unwrap();
//!     global_link_with(&RF_LINK, |link| link.prepare(b"hello", 0));
//!     global_link_wait_tx(&RF_LINK);
//! }
//! ```

use crate::config::LinkConfig;
use crate::hal::Radio;
use crate::link::{Link, LinkError};
use core::cell::RefCell;
use core::convert::Infallible;
use critical_section::Mutex;
use nb::block;

mod macros;

/// A [`Link`] shared between the main context and the radio interrupt.
pub type GlobalLink<R> = Mutex<RefCell<Option<Link<R>>>>;

/// Used to initialize the global static [`GlobalLink`].
///
/// # Example
/// ```rust,ignore
/// static RF_LINK: GlobalLink<MyRadio> = global_link_init();
/// ```
pub const fn global_link_init<R: Radio>() -> GlobalLink<R> {
    Mutex::new(RefCell::new(None))
}

/// Builds a [`Link`] on `radio` and stores it in `global`, replacing any
/// previous instance.
///
/// Must run before the radio interrupt is enabled at the MCU level.
pub fn global_link_setup<R: Radio>(
    global: &'static GlobalLink<R>,
    radio: R,
    config: LinkConfig,
) -> Result<(), LinkError<R::Error>> {
    critical_section::with(|cs| {
        let link = Link::new(radio, config)?;
        let _ = global.borrow(cs).replace(Some(link));
        Ok(())
    })
}

/// Services one radio interrupt.
///
/// Does nothing if the link was never set up.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn INT0() {
///     let _ = global_link_interrupt(&RF_LINK);
/// }
/// ```
pub fn global_link_interrupt<R: Radio>(
    global: &'static GlobalLink<R>,
) -> Result<(), LinkError<R::Error>> {
    critical_section::with(|cs| match global.borrow(cs).borrow_mut().as_mut() {
        Some(link) => link.on_interrupt(),
        None => Ok(()),
    })
}

/// Runs `f` on the link inside a critical section.
///
/// Returns `None` if the link was never set up.
pub fn global_link_with<R: Radio, T>(
    global: &'static GlobalLink<R>,
    f: impl FnOnce(&mut Link<R>) -> T,
) -> Option<T> {
    critical_section::with(|cs| global.borrow(cs).borrow_mut().as_mut().map(f))
}

/// One non-blocking look at the transmitter. A missing link counts as done.
pub fn global_link_poll_tx<R: Radio>(global: &'static GlobalLink<R>) -> nb::Result<(), Infallible> {
    critical_section::with(|cs| match global.borrow(cs).borrow().as_ref() {
        Some(link) => link.poll_tx(),
        None => Ok(()),
    })
}

/// One non-blocking look at the receiver. A missing link counts as done.
pub fn global_link_poll_rx<R: Radio>(global: &'static GlobalLink<R>) -> nb::Result<(), Infallible> {
    critical_section::with(|cs| match global.borrow(cs).borrow().as_ref() {
        Some(link) => link.poll_rx(),
        None => Ok(()),
    })
}

/// Spins until the transmission in progress has finished.
///
/// Each poll takes its own critical section.
pub fn global_link_wait_tx<R: Radio>(global: &'static GlobalLink<R>) {
    let _ = block!(global_link_poll_tx(global));
}

/// Spins until a frame has arrived or the receiver has gone idle.
///
/// Each poll takes its own critical section.
pub fn global_link_wait_rx<R: Radio>(global: &'static GlobalLink<R>) {
    let _ = block!(global_link_poll_rx(global));
}
