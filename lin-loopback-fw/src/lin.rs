use core::convert::Infallible;

use lin_loopback_common::uart::{
    InterruptStatus, Interrupts, LineConfig, LineError, LinMode, LinUart,
};
use stm32h7xx_hal::{
    hal_02::serial::{Read, Write},
    nb,
    pac::UART7,
    serial::{
        Event, Rx, Serial, Tx,
        config::{self, BitOrder, Config},
    },
    time::Hertz,
};

/// Breaks at least this long are detected with the 11 bit threshold.
const LONG_BREAK_BITS: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum UartError {
    /// LIN needs 8N1, LSB first.
    UnsupportedFraming(LineConfig),
    Closed,
}

/// UART7 driven in its hardware LIN mode.
pub struct Uart7Lin {
    serial: Serial<UART7>,
    config: Config,
    open: bool,
    break_armed: bool,
}

impl Uart7Lin {
    pub fn new(serial: Serial<UART7>, config: Config) -> Self {
        assert!(config.bitorder == BitOrder::LsbFirst);
        assert!(!config.swaptxrx && !config.invertrx && !config.inverttx && !config.halfduplex);

        Self {
            serial,
            config,
            open: false,
            break_armed: false,
        }
    }

    fn registers() -> &'static <UART7 as core::ops::Deref>::Target {
        unsafe { &*UART7::ptr() }
    }

    /// Reapplies the LIN specific bits a reconfiguration clears.
    fn modify_serial() {
        let register_block = Self::registers();

        // Disable peripheral, enable FIFO and LIN mode and enable again
        register_block.cr1.modify(|_, w| w.ue().disabled());
        register_block.cr1.modify(|_, w| w.fifoen().set_bit());
        register_block.cr2.modify(|_, w| w.linen().enabled());
        register_block.cr1.modify(|_, w| w.ue().enabled());
    }

    fn reconfigure(&mut self) {
        while !self.serial.is_idle() {}
        self.serial.reconfigure(self.config);
        Self::modify_serial();
    }

    fn send_break() {
        let registers = Self::registers();
        // Wait for active transmit to finish
        while registers.isr.read().tc().bit_is_clear() {}
        registers.rqr.write(|w| w.sbkrq().set_bit());
    }
}

impl LinUart for Uart7Lin {
    type Error = UartError;

    fn open(&mut self, baudrate: u32) -> Result<(), UartError> {
        defmt::info!("Open UART7 at {} bit/s", baudrate);
        self.config = self.config.baudrate(Hertz::from_raw(baudrate));
        self.reconfigure();
        self.open = true;
        Ok(())
    }

    fn set_line_config(&mut self, line_config: LineConfig) -> Result<(), UartError> {
        if !self.open {
            return Err(UartError::Closed);
        }
        if !line_config.is_lin_compatible() {
            return Err(UartError::UnsupportedFraming(line_config));
        }

        let config = self
            .config
            .baudrate(Hertz::from_raw(line_config.baudrate))
            .wordlength_8()
            .parity_none()
            .stopbits(config::StopBits::Stop1);

        self.config = config;
        self.reconfigure();
        Ok(())
    }

    fn select_lin_mode(&mut self, mode: LinMode) -> Result<(), UartError> {
        if !self.open {
            return Err(UartError::Closed);
        }
        let registers = Self::registers();

        registers.cr1.modify(|_, w| w.ue().disabled());
        registers
            .cr2
            .modify(|_, w| w.lbdl().bit(mode.break_length >= LONG_BREAK_BITS));
        registers
            .cr1
            .modify(|_, w| w.re().bit(mode.rx_enable).te().bit(mode.tx_enable));
        registers.cr1.modify(|_, w| w.ue().enabled());

        self.break_armed = mode.tx_enable;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), UartError> {
        if !self.open {
            return Err(UartError::Closed);
        }
        if core::mem::take(&mut self.break_armed) {
            Self::send_break();
        }

        let mut tx: Tx<UART7> = unsafe { core::mem::zeroed() };
        for byte in buf {
            let written: Result<(), Infallible> = nb::block!(tx.write(*byte));
            if let Err(never) = written {
                match never {}
            }
        }
        Ok(())
    }

    fn enable_interrupt(&mut self, interrupts: Interrupts) {
        let registers = Self::registers();
        if interrupts.contains(Interrupts::RECEIVE_LINE_STATUS) {
            registers.cr1.modify(|_, w| w.peie().set_bit());
            registers.cr3.modify(|_, w| w.eie().set_bit());
        }
        if interrupts.contains(Interrupts::RECEIVE_DATA_AVAILABLE) {
            self.serial.listen(Event::Rxne);
        }
        if interrupts.contains(Interrupts::LIN_BREAK) {
            registers.cr2.modify(|_, w| w.lbdie().enabled());
        }
    }

    fn disable_interrupt(&mut self, interrupts: Interrupts) {
        let registers = Self::registers();
        if interrupts.contains(Interrupts::RECEIVE_LINE_STATUS) {
            registers.cr1.modify(|_, w| w.peie().clear_bit());
            registers.cr3.modify(|_, w| w.eie().clear_bit());
        }
        if interrupts.contains(Interrupts::RECEIVE_DATA_AVAILABLE) {
            self.serial.unlisten(Event::Rxne);
        }
        if interrupts.contains(Interrupts::LIN_BREAK) {
            registers.cr2.modify(|_, w| w.lbdie().disabled());
        }
    }

    fn close(&mut self) {
        defmt::info!("Close UART7");
        while !self.serial.is_idle() {}
        Self::registers().cr1.modify(|_, w| w.ue().disabled());
        self.open = false;
    }

    fn interrupt_status(&mut self) -> InterruptStatus {
        let isr = Self::registers().isr.read();
        let rx: Rx<UART7> = unsafe { core::mem::zeroed() };

        // A break also shows up as a framing error on the 0x00 it leaves behind
        let line_error = if isr.ore().bit_is_set() {
            Some(LineError::Overrun)
        } else if isr.pe().bit_is_set() {
            Some(LineError::Parity)
        } else if isr.ne().bit_is_set() {
            Some(LineError::Noise)
        } else if isr.fe().bit_is_set() && isr.lbdf().bit_is_clear() {
            Some(LineError::Framing)
        } else {
            None
        };

        InterruptStatus {
            break_detected: isr.lbdf().bit_is_set(),
            rx_data_available: rx.is_rxne(),
            line_error,
        }
    }

    fn clear_break_detected(&mut self) {
        let registers = Self::registers();
        registers.icr.write(|w| w.lbdcf().set_bit());

        // Drop the break character. Reading through `Rx` would only report the
        // framing error and leave the 0x00 in the FIFO.
        if registers.isr.read().fe().bit_is_set() {
            registers.icr.write(|w| w.fecf().set_bit());
            let _ = registers.rdr.read();
        }
    }

    fn clear_line_errors(&mut self) {
        Self::registers().icr.write(|w| {
            w.fecf()
                .set_bit()
                .necf()
                .set_bit()
                .orecf()
                .set_bit()
                .pecf()
                .set_bit()
        });
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut rx: Rx<UART7> = unsafe { core::mem::zeroed() };
        if !rx.is_rxne() {
            return None;
        }
        match rx.read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(err)) => {
                defmt::warn!("Receive error: {:?}", defmt::Debug2Format(&err));
                None
            }
        }
    }
}
