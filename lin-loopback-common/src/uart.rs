//! The UART surface the tester drives.
//!
//! Implemented by the firmware for a UART peripheral in hardware LIN mode and by
//! the host tools for a simulated loopback bus.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordLength {
    Bits7,
    Bits8,
    Bits9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineConfig {
    pub baudrate: u32,
    pub word_length: WordLength,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl LineConfig {
    /// 8N1, the only framing LIN allows.
    pub fn lin(baudrate: u32) -> Self {
        Self {
            baudrate,
            word_length: WordLength::Bits8,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    pub fn is_lin_compatible(&self) -> bool {
        self.word_length == WordLength::Bits8
            && self.parity == Parity::None
            && self.stop_bits == StopBits::One
    }
}

/// LIN mode selection.
///
/// Selecting a mode with `tx_enable` set arms a break field of `break_length` bits
/// in front of the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinMode {
    pub rx_enable: bool,
    pub tx_enable: bool,
    pub break_length: u8,
}

impl LinMode {
    pub fn rx_tx(break_length: u8) -> Self {
        Self {
            rx_enable: true,
            tx_enable: true,
            break_length,
        }
    }
}

/// Interrupt enable mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupts(u8);

impl Interrupts {
    /// Framing, parity, noise and overrun errors.
    pub const RECEIVE_LINE_STATUS: Self = Self(0x01);
    /// A received byte is waiting to be read.
    pub const RECEIVE_DATA_AVAILABLE: Self = Self(0x02);
    /// LIN break detected.
    pub const LIN_BREAK: Self = Self(0x04);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0x07)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for Interrupts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Snapshot of the pending interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    pub break_detected: bool,
    pub rx_data_available: bool,
    pub line_error: Option<LineError>,
}

impl InterruptStatus {
    pub fn is_pending(&self) -> bool {
        self.break_detected || self.rx_data_available || self.line_error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    Framing,
    Noise,
    Overrun,
    Parity,
}

pub trait LinUart {
    type Error: core::fmt::Debug;

    fn open(&mut self, baudrate: u32) -> Result<(), Self::Error>;

    fn set_line_config(&mut self, config: LineConfig) -> Result<(), Self::Error>;

    fn select_lin_mode(&mut self, mode: LinMode) -> Result<(), Self::Error>;

    /// Blocks until all of `buf` is handed to the transmitter.
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    fn enable_interrupt(&mut self, interrupts: Interrupts);

    fn disable_interrupt(&mut self, interrupts: Interrupts);

    fn close(&mut self);

    fn interrupt_status(&mut self) -> InterruptStatus;

    fn clear_break_detected(&mut self);

    fn clear_line_errors(&mut self);

    /// Next byte of the receive register, if any.
    fn read_byte(&mut self) -> Option<u8>;
}
