//! RFM12 transceiver over SPI.
//!
//! [`Rfm12`] implements [`Radio`] for the HopeRF RFM12/RFM12B. Every chip
//! command is a single 16-bit word sent most significant byte first with the
//! chip select held for the whole word; reads (status, FIFO) return the word
//! clocked in during the same transfer.
//!
//! The chip's nIRQ line is not part of the SPI bus, so masking it is delegated
//! to an [`IrqControl`] supplied by the application, typically a thin wrapper
//! around the MCU's external interrupt enable bit. Use `()` when the line is
//! polled instead.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rfm12_link::rfm12::{Rfm12, Rfm12Config};
//!
//! let mut radio = Rfm12::new(spi, nirq, Rfm12Config::default());
//! let status = radio.init()?;
//! ```

use crate::consts::{
    CMD_FIFO_OFF, CMD_FIFO_ON, CMD_POWER, CMD_STATUS_READ, CMD_TX_WRITE, POWER_DC, POWER_EBB,
    POWER_ER, POWER_ES, POWER_ET, POWER_EX,
};
use crate::hal::{Radio, RadioMode, Status};
use core::fmt::Debug;
use embedded_hal::spi::SpiDevice;
use thiserror::Error;

/// Power management word for each [`RadioMode`].
const PM_TX: u16 = CMD_POWER | POWER_ET | POWER_ES | POWER_EX | POWER_DC;
const PM_RX: u16 = CMD_POWER | POWER_ER | POWER_EBB | POWER_ES | POWER_EX | POWER_DC;
const PM_DEFAULT: u16 = CMD_POWER | POWER_EBB | POWER_ES | POWER_EX | POWER_DC;
const PM_ECO: u16 = CMD_POWER | POWER_DC;

const CMD_CONFIG: u16 = 0x8000;
const CONFIG_EL: u16 = 1 << 7;
const CONFIG_EF: u16 = 1 << 6;
const CMD_FREQUENCY: u16 = 0xA000;
const CMD_DATA_RATE: u16 = 0xC600;
const DATA_RATE_CS: u16 = 1 << 7;

/// Largest centre frequency word the synthesizer accepts.
const FREQUENCY_MAX: u16 = 3903;
/// Smallest centre frequency word the synthesizer accepts.
const FREQUENCY_MIN: u16 = 96;

/// Errors raised by [`Rfm12`].
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Rfm12Error<E: Debug> {
    /// The SPI transfer failed.
    #[error("SPI error: {0:?}")]
    Spi(E),
}

/// Masks and unmasks the interrupt the chip's nIRQ line is wired to.
pub trait IrqControl {
    /// Unmasks the interrupt.
    fn enable(&mut self);
    /// Masks the interrupt. Must take effect before returning.
    fn disable(&mut self);
}

/// No interrupt: the nIRQ line is polled.
impl IrqControl for () {
    fn enable(&mut self) {}
    fn disable(&mut self) {}
}

/// Frequency band of the module.
///
/// The band is fixed by the module's antenna matching; it also selects the
/// constants of the centre frequency formula.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Band {
    /// 315 MHz
    Mhz315,
    /// 433 MHz
    #[default]
    Mhz433,
    /// 868 MHz
    Mhz868,
    /// 915 MHz
    Mhz915,
}

impl Band {
    /// Band select bits of the configuration command.
    pub const fn bits(self) -> u16 {
        match self {
            Band::Mhz315 => 0,
            Band::Mhz433 => 1 << 4,
            Band::Mhz868 => 1 << 5,
            Band::Mhz915 => (1 << 5) | (1 << 4),
        }
    }

    /// `(C1, C2)` of `f = 10 * C1 * (C2 + F / 4000)` MHz.
    const fn constants(self) -> (f64, f64) {
        match self {
            Band::Mhz315 => (1.0, 31.0),
            Band::Mhz433 => (1.0, 43.0),
            Band::Mhz868 => (2.0, 43.0),
            Band::Mhz915 => (3.0, 30.0),
        }
    }
}

/// Computes the frequency setting command for `mhz` in `band`.
///
/// Returns `None` when the frequency falls outside what the band's
/// synthesizer can reach.
///
/// ```
/// use rfm12_link::rfm12::{frequency_command, Band};
///
/// assert_eq!(frequency_command(Band::Mhz433, 431.0), Some(0xA190));
/// assert_eq!(frequency_command(Band::Mhz433, 900.0), None);
/// ```
pub fn frequency_command(band: Band, mhz: f64) -> Option<u16> {
    let (c1, c2) = band.constants();
    let f = libm::round((mhz / (10.0 * c1) - c2) * 4000.0);
    if f < f64::from(FREQUENCY_MIN) || f > f64::from(FREQUENCY_MAX) {
        return None;
    }
    Some(CMD_FREQUENCY | f as u16)
}

/// Computes the data rate command for `bps` bits per second.
///
/// Picks the prescaler automatically. Returns `None` for rates the chip
/// cannot produce (about 337 bps to 172 kbps).
///
/// ```
/// use rfm12_link::rfm12::data_rate_command;
///
/// assert_eq!(data_rate_command(4800), Some(0xC647));
/// assert_eq!(data_rate_command(0), None);
/// ```
pub fn data_rate_command(bps: u32) -> Option<u16> {
    if bps == 0 {
        return None;
    }
    let kbps = f64::from(bps) / 1000.0;
    let divider = |cs: f64| libm::round(10000.0 / 29.0 / (1.0 + cs * 7.0) / kbps - 1.0);

    let r = divider(0.0);
    let (r, cs) = if r > 127.0 { (divider(1.0), DATA_RATE_CS) } else { (r, 0) };
    if !(0.0..=127.0).contains(&r) {
        return None;
    }
    Some(CMD_DATA_RATE | cs | r as u16)
}

/// Crystal load capacitance code for `pf` picofarads (8.5 to 16 pF, 0.5 pF steps).
pub fn crystal_load_code(pf: f32) -> u8 {
    let code = libm::roundf((pf - 8.5) * 2.0);
    code.clamp(0.0, 15.0) as u8
}

/// Power-up command table.
///
/// `Default` gives the configuration the link was tuned with: 433 MHz band,
/// 12 pF load, 431 MHz, 57.5 kbps, VDI always on, 134 kHz receiver bandwidth,
/// FIFO interrupt after 8 bits, automatic frequency control and 90 kHz
/// deviation at full power. Words are sent by [`Rfm12::init`] in field order.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Rfm12Config {
    /// Module band.
    pub band: Band,
    /// Crystal load code, see [`crystal_load_code`].
    pub crystal_load: u8,
    /// Frequency setting command, see [`frequency_command`].
    pub frequency: u16,
    /// Data rate command, see [`data_rate_command`].
    pub data_rate: u16,
    /// Receiver control command (VDI, bandwidth, LNA gain, RSSI threshold).
    pub receiver_control: u16,
    /// Data filter and clock recovery command.
    pub data_filter: u16,
    /// FIFO and reset mode command.
    pub fifo: u16,
    /// AFC command.
    pub afc: u16,
    /// TX configuration command (deviation, output power).
    pub tx_control: u16,
    /// Wake-up timer command.
    pub wake_up: u16,
    /// Low duty-cycle command.
    pub duty_cycle: u16,
    /// Low battery detector and clock divider command.
    pub battery: u16,
}

impl Default for Rfm12Config {
    fn default() -> Self {
        Self {
            band: Band::Mhz433,
            crystal_load: 7,
            frequency: CMD_FREQUENCY | 0x0190,
            data_rate: CMD_DATA_RATE | 0x05,
            receiver_control: 0x97A0,
            data_filter: 0xC2AC,
            fifo: CMD_FIFO_OFF,
            afc: 0xC483,
            tx_control: 0x9850,
            wake_up: 0xE000,
            duty_cycle: 0xC800,
            battery: 0xC0E0,
        }
    }
}

impl Rfm12Config {
    /// The configuration command: internal data register, FIFO mode, band and load.
    pub const fn config_command(&self) -> u16 {
        CMD_CONFIG | CONFIG_EL | CONFIG_EF | self.band.bits() | (self.crystal_load as u16 & 0x0F)
    }

    /// Every power-up command, in the order they are sent.
    pub fn commands(&self) -> [u16; 12] {
        [
            self.config_command(),
            PM_DEFAULT,
            self.frequency,
            self.data_rate,
            self.receiver_control,
            self.data_filter,
            self.fifo,
            self.afc,
            self.tx_control,
            self.wake_up,
            self.duty_cycle,
            self.battery,
        ]
    }
}

/// An RFM12 on an SPI bus.
///
/// ## Type Parameters
///
/// - `SPI`: the bus with the chip's select line, see [`SpiDevice`]
/// - `IRQ`: mask control for the nIRQ interrupt, see [`IrqControl`]
#[derive(Debug)]
pub struct Rfm12<SPI, IRQ> {
    spi: SPI,
    irq: IRQ,
    mode: RadioMode,
    config: Rfm12Config,
}

impl<SPI: SpiDevice, IRQ: IrqControl> Rfm12<SPI, IRQ> {
    /// Wraps the bus. Nothing is sent until [`init`](Self::init).
    pub fn new(spi: SPI, irq: IRQ, config: Rfm12Config) -> Self {
        Self {
            spi,
            irq,
            mode: RadioMode::Default,
            config,
        }
    }

    /// Sends the power-up command table and reads the status word once,
    /// which clears the power-on reset flag.
    pub fn init(&mut self) -> Result<Status, Rfm12Error<SPI::Error>> {
        for command in self.config.commands() {
            self.command(command)?;
        }
        self.mode = RadioMode::Default;
        self.status()
    }

    /// Reads and decodes the status word.
    ///
    /// Reading the status acknowledges a pending interrupt.
    pub fn status(&mut self) -> Result<Status, Rfm12Error<SPI::Error>> {
        self.transfer(CMD_STATUS_READ).map(Status::from_raw)
    }

    /// Sends one raw command word.
    pub fn command(&mut self, word: u16) -> Result<(), Rfm12Error<SPI::Error>> {
        self.spi.write(&word.to_be_bytes()).map_err(Rfm12Error::Spi)
    }

    /// The configuration sent by [`init`](Self::init).
    pub fn config(&self) -> &Rfm12Config {
        &self.config
    }

    /// Gives the bus and the interrupt control back.
    pub fn release(self) -> (SPI, IRQ) {
        (self.spi, self.irq)
    }

    fn transfer(&mut self, word: u16) -> Result<u16, Rfm12Error<SPI::Error>> {
        let mut buf = word.to_be_bytes();
        self.spi.transfer_in_place(&mut buf).map_err(Rfm12Error::Spi)?;
        Ok(u16::from_be_bytes(buf))
    }
}

impl<SPI: SpiDevice, IRQ: IrqControl> Radio for Rfm12<SPI, IRQ> {
    type Error = Rfm12Error<SPI::Error>;

    fn set_mode(&mut self, mode: RadioMode) -> Result<(), Self::Error> {
        match mode {
            RadioMode::Transmit => self.command(PM_TX)?,
            RadioMode::Receive => {
                self.command(PM_RX)?;
                self.reset_fifo()?;
            }
            RadioMode::Default => self.command(PM_DEFAULT)?,
            RadioMode::Eco => self.command(PM_ECO)?,
        }
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> RadioMode {
        self.mode
    }

    fn transmit_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.command(CMD_TX_WRITE | u16::from(byte))
    }

    fn exchange_word(&mut self, word: u16) -> Result<u16, Self::Error> {
        self.transfer(word)
    }

    fn reset_fifo(&mut self) -> Result<(), Self::Error> {
        self.command(CMD_FIFO_OFF)?;
        self.command(CMD_FIFO_ON)
    }

    fn enable_irq(&mut self) {
        self.irq.enable();
    }

    fn disable_irq(&mut self) {
        self.irq.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CMD_RX_READ;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[derive(Debug, Default)]
    struct CountingIrq {
        enabled: bool,
        toggles: u32,
    }

    impl IrqControl for CountingIrq {
        fn enable(&mut self) {
            self.enabled = true;
            self.toggles += 1;
        }
        fn disable(&mut self) {
            self.enabled = false;
            self.toggles += 1;
        }
    }

    fn write(word: u16) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(word.to_be_bytes().to_vec()),
            SpiTransaction::transaction_end(),
        ]
    }

    fn transfer(word: u16, response: u16) -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(
                word.to_be_bytes().to_vec(),
                response.to_be_bytes().to_vec(),
            ),
            SpiTransaction::transaction_end(),
        ]
    }

    #[test]
    fn test_default_command_table() {
        assert_eq!(
            Rfm12Config::default().commands(),
            [
                0x80D7, 0x8259, 0xA190, 0xC605, 0x97A0, 0xC2AC, 0xCA81, 0xC483, 0x9850, 0xE000,
                0xC800, 0xC0E0
            ]
        );
    }

    #[test]
    fn test_init_sends_table_then_reads_status() {
        let config = Rfm12Config::default();
        let mut expected: Vec<SpiTransaction<u8>> =
            config.commands().iter().flat_map(|&w| write(w)).collect();
        expected.extend(transfer(CMD_STATUS_READ, 0x4000));

        let spi = SpiMock::new(&expected);
        let mut radio = Rfm12::new(spi, (), config);
        let status = radio.init().unwrap();
        assert!(status.power_on_reset());
        assert_eq!(radio.mode(), RadioMode::Default);

        let (mut spi, ()) = radio.release();
        spi.done();
    }

    #[test]
    fn test_power_modes() {
        let mut expected = Vec::new();
        expected.extend(write(0x8239));
        expected.extend(write(0x82D9));
        expected.extend(write(0xCA81));
        expected.extend(write(0xCA83));
        expected.extend(write(0x8259));
        expected.extend(write(0x8201));

        let spi = SpiMock::new(&expected);
        let mut radio = Rfm12::new(spi, (), Rfm12Config::default());
        radio.set_mode(RadioMode::Transmit).unwrap();
        assert_eq!(radio.mode(), RadioMode::Transmit);
        radio.set_mode(RadioMode::Receive).unwrap();
        radio.set_mode(RadioMode::Default).unwrap();
        radio.set_mode(RadioMode::Eco).unwrap();
        assert_eq!(radio.mode(), RadioMode::Eco);

        let (mut spi, ()) = radio.release();
        spi.done();
    }

    #[test]
    fn test_byte_level_commands() {
        let mut expected = Vec::new();
        expected.extend(write(0xB8AA));
        expected.extend(transfer(CMD_RX_READ, 0x00D4));
        expected.extend(transfer(CMD_STATUS_READ, 0x8000));

        let spi = SpiMock::new(&expected);
        let mut radio = Rfm12::new(spi, (), Rfm12Config::default());
        radio.transmit_byte(0xAA).unwrap();
        assert_eq!(radio.read_fifo().unwrap(), 0xD4);
        assert!(radio.read_status().unwrap().byte_ready());

        let (mut spi, ()) = radio.release();
        spi.done();
    }

    #[test]
    fn test_irq_control_is_forwarded() {
        let expected: [SpiTransaction<u8>; 0] = [];
        let spi = SpiMock::new(&expected);
        let mut radio = Rfm12::new(spi, CountingIrq::default(), Rfm12Config::default());
        radio.enable_irq();
        assert!(radio.irq.enabled);
        radio.disable_irq();
        assert!(!radio.irq.enabled);

        let (mut spi, irq) = radio.release();
        assert_eq!(irq.toggles, 2);
        spi.done();
    }

    #[test]
    fn test_frequency_command() {
        assert_eq!(frequency_command(Band::Mhz433, 431.0), Some(0xA190));
        assert_eq!(frequency_command(Band::Mhz433, 434.0), Some(0xA640));
        assert_eq!(frequency_command(Band::Mhz868, 868.0), Some(0xA640));
        assert_eq!(frequency_command(Band::Mhz915, 915.0), Some(0xA7D0));
        assert_eq!(frequency_command(Band::Mhz433, 430.0), None);
        assert_eq!(frequency_command(Band::Mhz315, 433.0), None);
    }

    #[test]
    fn test_data_rate_command() {
        assert_eq!(data_rate_command(4_800), Some(0xC647));
        assert_eq!(data_rate_command(10_000), Some(0xC621));
        assert_eq!(data_rate_command(20_000), Some(0xC610));
        // Slow rates switch the prescaler on.
        assert_eq!(data_rate_command(1_200), Some(0xC6A3));
        assert_eq!(data_rate_command(100), None);
        assert_eq!(data_rate_command(1_000_000), None);
    }

    #[test]
    fn test_crystal_load_code() {
        assert_eq!(crystal_load_code(12.0), 7);
        assert_eq!(crystal_load_code(8.5), 0);
        assert_eq!(crystal_load_code(16.0), 15);
        assert_eq!(crystal_load_code(20.0), 15);
    }

    #[test]
    fn test_band_bits_in_config_command() {
        let config = Rfm12Config {
            band: Band::Mhz868,
            crystal_load: crystal_load_code(10.0),
            ..Rfm12Config::default()
        };
        assert_eq!(config.config_command(), 0x80E3);
    }
}
