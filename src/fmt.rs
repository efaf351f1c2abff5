//! Logging shims.
//!
//! Forwards to `log` or `defmt` depending on the enabled feature and expands to
//! nothing when neither is enabled, so logging calls cost nothing in the
//! interrupt path of a minimal build. Stick to `{}` and `{:?}` placeholders;
//! they mean the same thing to both back-ends.

#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::log::trace!($s $(, $x)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::log::debug!($s $(, $x)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! warning {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::log::warn!($s $(, $x)*);
        #[cfg(feature = "defmt-0-3")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(not(any(feature = "log", feature = "defmt-0-3")))]
        let _ = ($( & $x ),*);
    }};
}

pub(crate) use {debug, trace, warning};

#[cfg(test)]
mod tests {
    #[test]
    fn test_every_level_accepts_format_arguments() {
        let mode = crate::link::LinkMode::Idle;
        let count = 3u8;
        trace!("plain message");
        debug!("count {}", count);
        warning!("spurious interrupt while {:?}, status {}", mode, 0x8000u16,);
        assert_eq!(count, 3);
    }
}
