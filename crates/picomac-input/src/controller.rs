//! Register-level driver for the handheld's keyboard microcontroller.
//!
//! The controller sits at I2C address [`KEYBOARD_I2C_ADDR`]. Every access is a one-byte
//! register select write followed by a read; multi-byte values are little-endian.

use crate::bus::{BusError, KeyboardBus};

pub const KEYBOARD_I2C_ADDR: u8 = 0x1F;

/// Bits of [`Register::KeyStatus`] that hold the number of queued events.
const KEY_STATUS_COUNT_MASK: u16 = 0x1F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Version = 0x01,
    Config = 0x02,
    InterruptStatus = 0x03,
    KeyStatus = 0x04,
    Backlight = 0x05,
    Debounce = 0x06,
    PollFrequency = 0x07,
    Reset = 0x08,
    Fifo = 0x09,
    KeyboardBacklight = 0x0A,
    Battery = 0x0B,
}

impl Register {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0x01 => Self::Version,
            0x02 => Self::Config,
            0x03 => Self::InterruptStatus,
            0x04 => Self::KeyStatus,
            0x05 => Self::Backlight,
            0x06 => Self::Debounce,
            0x07 => Self::PollFrequency,
            0x08 => Self::Reset,
            0x09 => Self::Fifo,
            0x0A => Self::KeyboardBacklight,
            0x0B => Self::Battery,
            _ => return None,
        })
    }
}

/// Raw byte transport to an I2C peripheral. Implementations apply their own bounded timeout
/// and report it as [`BusError::Timeout`].
pub trait I2cTransport {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError>;
    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

#[derive(Debug)]
pub struct KeyboardController<T> {
    transport: T,
    addr: u8,
}

impl<T: I2cTransport> KeyboardController<T> {
    pub fn new(transport: T) -> Self {
        Self::with_address(transport, KEYBOARD_I2C_ADDR)
    }

    pub fn with_address(transport: T, addr: u8) -> Self {
        Self { transport, addr }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn read_u16(&mut self, reg: Register) -> Result<u16, BusError> {
        self.transport.write(self.addr, &[reg as u8])?;
        let mut buf = [0u8; 2];
        self.transport.read(self.addr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn firmware_version(&mut self) -> Result<u8, BusError> {
        self.transport.write(self.addr, &[Register::Version as u8])?;
        let mut buf = [0u8; 1];
        self.transport.read(self.addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Number of events waiting in the controller FIFO.
    pub fn queue_len(&mut self) -> Result<usize, BusError> {
        let status = self.read_u16(Register::KeyStatus)?;
        Ok(usize::from(status & KEY_STATUS_COUNT_MASK))
    }
}

impl<T: I2cTransport> KeyboardBus for KeyboardController<T> {
    fn read_fifo(&mut self) -> Result<u16, BusError> {
        self.read_u16(Register::Fifo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeI2c {
        writes: Vec<(u8, Vec<u8>)>,
        reads: VecDeque<Result<Vec<u8>, BusError>>,
    }

    impl I2cTransport for FakeI2c {
        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
            self.writes.push((addr, bytes.to_vec()));
            Ok(())
        }

        fn read(&mut self, _addr: u8, buf: &mut [u8]) -> Result<(), BusError> {
            let data = self.reads.pop_front().unwrap_or(Err(BusError::Nack))?;
            buf.copy_from_slice(&data[..buf.len()]);
            Ok(())
        }
    }

    #[test]
    fn fifo_read_selects_register_then_reads_le_word() {
        let mut i2c = FakeI2c::default();
        i2c.reads.push_back(Ok(vec![0x01, 0x61]));
        let mut ctrl = KeyboardController::new(i2c);

        assert_eq!(ctrl.read_fifo(), Ok(0x6101));
        assert_eq!(
            ctrl.transport().writes,
            vec![(KEYBOARD_I2C_ADDR, vec![Register::Fifo as u8])]
        );
    }

    #[test]
    fn queue_len_masks_status_bits() {
        let mut i2c = FakeI2c::default();
        i2c.reads.push_back(Ok(vec![0xE3, 0x00]));
        let mut ctrl = KeyboardController::new(i2c);
        assert_eq!(ctrl.queue_len(), Ok(3));
    }

    #[test]
    fn register_ids_round_trip() {
        for id in 0x01..=0x0B {
            assert_eq!(Register::from_u8(id).map(|r| r as u8), Some(id));
        }
        assert_eq!(Register::from_u8(0x00), None);
        assert_eq!(Register::from_u8(0x0C), None);
    }

    #[test]
    fn read_errors_propagate() {
        let mut i2c = FakeI2c::default();
        i2c.reads.push_back(Err(BusError::Timeout));
        let mut ctrl = KeyboardController::new(i2c);
        assert_eq!(ctrl.read_fifo(), Err(BusError::Timeout));
    }

    #[test]
    fn drain_reads_until_empty() {
        let mut i2c = FakeI2c::default();
        i2c.reads.push_back(Ok(vec![0x01, 0x61]));
        i2c.reads.push_back(Ok(vec![0x03, 0x61]));
        i2c.reads.push_back(Ok(vec![0x00, 0x00]));
        let mut ctrl = KeyboardController::new(i2c);
        assert_eq!(ctrl.drain(64), 2);
    }
}
