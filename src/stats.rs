//! Link statistics.

/// Frame and error counters.
///
/// Only the interrupt handler increments these. Readers get a snapshot through
/// [`Link::stats`](crate::link::Link::stats); counters wrap on overflow.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Stats {
    /// Frames fully clocked out, pad byte included.
    pub packets_tx: u32,
    /// Frames received with a valid header and CRC.
    pub packets_rx: u32,
    /// Transmit underruns, receive overruns, control byte mismatches and zero
    /// length headers.
    pub ctr_err: u16,
    /// Frames rejected by the CRC check.
    pub crc_err: u16,
}

impl Stats {
    pub(crate) fn count_tx(&mut self) {
        self.packets_tx = self.packets_tx.wrapping_add(1);
    }

    pub(crate) fn count_rx(&mut self) {
        self.packets_rx = self.packets_rx.wrapping_add(1);
    }

    pub(crate) fn count_ctr_err(&mut self) {
        self.ctr_err = self.ctr_err.wrapping_add(1);
    }

    pub(crate) fn count_crc_err(&mut self) {
        self.crc_err = self.crc_err.wrapping_add(1);
    }

    /// Sum of every error counter.
    pub fn errors(&self) -> u32 {
        u32::from(self.ctr_err) + u32::from(self.crc_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_sums_both_counters_without_overflow() {
        let mut stats = Stats::default();
        assert_eq!(stats.errors(), 0);
        stats.count_ctr_err();
        stats.count_crc_err();
        stats.count_crc_err();
        assert_eq!(stats.errors(), 3);

        stats.ctr_err = u16::MAX;
        stats.crc_err = u16::MAX;
        assert_eq!(stats.errors(), 2 * u32::from(u16::MAX));
        // Frame counters are not errors.
        stats.count_tx();
        stats.count_rx();
        assert_eq!(stats.errors(), 2 * u32::from(u16::MAX));
    }
}
