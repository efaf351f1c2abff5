//! Scripted [`Radio`] used by the unit tests.

#![allow(dead_code)]

use crate::consts::{CMD_RX_READ, CMD_STATUS_READ};
use crate::hal::{Radio, RadioMode};
use std::collections::VecDeque;

/// One recorded HAL call.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Call {
    SetMode(RadioMode),
    TransmitByte(u8),
    Exchange(u16),
    ResetFifo,
    EnableIrq,
    DisableIrq,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) struct MockError;

#[derive(Debug, Default)]
pub(crate) struct MockRadio {
    pub calls: Vec<Call>,
    pub mode: RadioMode,
    pub irq_enabled: bool,
    /// Answers to status reads, oldest first.
    pub status: VecDeque<u16>,
    /// Answer to status reads once `status` is exhausted.
    pub idle_status: u16,
    /// Bytes waiting in the receive FIFO.
    pub fifo: VecDeque<u8>,
    /// Fail every bus exchange.
    pub broken: bool,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every byte handed to `transmit_byte`, in order.
    pub fn transmitted(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::TransmitByte(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Radio for MockRadio {
    type Error = MockError;

    fn set_mode(&mut self, mode: RadioMode) -> Result<(), MockError> {
        self.calls.push(Call::SetMode(mode));
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> RadioMode {
        self.mode
    }

    fn transmit_byte(&mut self, byte: u8) -> Result<(), MockError> {
        self.calls.push(Call::TransmitByte(byte));
        Ok(())
    }

    fn exchange_word(&mut self, word: u16) -> Result<u16, MockError> {
        self.calls.push(Call::Exchange(word));
        if self.broken {
            return Err(MockError);
        }
        Ok(match word {
            CMD_STATUS_READ => self.status.pop_front().unwrap_or(self.idle_status),
            CMD_RX_READ => self.fifo.pop_front().map_or(0, u16::from),
            _ => 0,
        })
    }

    fn reset_fifo(&mut self) -> Result<(), MockError> {
        self.calls.push(Call::ResetFifo);
        Ok(())
    }

    fn enable_irq(&mut self) {
        self.calls.push(Call::EnableIrq);
        self.irq_enabled = true;
    }

    fn disable_irq(&mut self) {
        self.calls.push(Call::DisableIrq);
        self.irq_enabled = false;
    }
}
