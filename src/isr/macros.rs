/// Declares a static global `RF_LINK` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `RF_LINK` suitable for use in
/// interrupt-based environments, where both the main thread and the radio ISR
/// need to safely access the shared link state.
///
/// # Arguments
/// - `$radio`: The concrete radio type (must implement `Radio`)
///
/// # Example
/// ```rust,ignore
/// init_rf_link!(Rfm12<MySpi, MyIrq>);
/// ```
#[macro_export]
macro_rules! init_rf_link {
    ( $radio:ty ) => {
        pub static RF_LINK: $crate::isr::GlobalLink<$radio> = $crate::isr::global_link_init();
    };
}

/// Installs a new link on `$radio` in the global `RF_LINK`.
///
/// Expands to a `Result<(), LinkError<_>>`.
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     setup_rf_link!(radio, LinkConfig::DEFAULT).unwrap();
/// }
/// ```
///
/// # Notes
/// - Requires `init_rf_link!` to have been used earlier in the same scope.
#[macro_export]
macro_rules! setup_rf_link {
    ( $radio:expr, $config:expr ) => {
        $crate::isr::global_link_setup(&RF_LINK, $radio, $config)
    };
}

/// Services one radio interrupt on the global `RF_LINK`.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn INT0() {
///     let _ = rf_link_interrupt!();
/// }
/// ```
#[macro_export]
macro_rules! rf_link_interrupt {
    () => {
        $crate::isr::global_link_interrupt(&RF_LINK)
    };
}
