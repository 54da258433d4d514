//! Header/response sender and echo checker of the loopback test.
//!
//! [`LinTester`] owns the send and receive buffers that both the main flow and the
//! receive interrupt work on. [`LinMaster`] pairs it with the UART so an interrupt
//! handler only has to call [`LinMaster::handle_interrupt`].

use core::fmt;

use heapless::Vec;

use crate::config::{LinTestConfig, MismatchPolicy};
use crate::error::Error;
use crate::lin::{
    DATA_INDEX, DATA_LEN, FRAME_LEN, LinChecksum, LinFrame, MAX_ID, ProtectedIdentifier,
    SYNC_BYTE, frame_checksum,
};
use crate::uart::{InterruptStatus, Interrupts, LineConfig, LineError, LinMode, LinUart};

/// Capacity of the receive accumulator.
pub const RX_BUFFER_SIZE: usize = 64;
/// Sync, pid and data are compared. The checksum only gets reported.
pub const COMPARE_LEN: usize = FRAME_LEN - 1;

/// Interrupt sources the test runs with.
pub const TEST_INTERRUPTS: Interrupts = Interrupts::RECEIVE_LINE_STATUS
    .union(Interrupts::RECEIVE_DATA_AVAILABLE)
    .union(Interrupts::LIN_BREAK);

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TesterState {
    Idle,
    HeaderSent { id: u8, break_detected: bool },
    AwaitingResponseEcho { id: u8 },
    FrameComplete { id: u8, passed: bool },
}

impl TesterState {
    fn id(&self) -> Option<u8> {
        match *self {
            TesterState::Idle => None,
            TesterState::HeaderSent { id, .. }
            | TesterState::AwaitingResponseEcho { id }
            | TesterState::FrameComplete { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaderReport {
    pub id: u8,
    pub pid: ProtectedIdentifier,
    /// `false` if `id` does not fit into 6 bits. The header went out anyway.
    pub id_in_range: bool,
}

/// First differing byte of a sent/echoed frame pair.
///
/// Displays the sent byte in hex and the received byte in decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mismatch {
    pub index: usize,
    pub sent: u8,
    pub received: u8,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "In[{}] = {:x} , Out[{}] = {}",
            self.index, self.sent, self.index, self.received
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Passed,
    Failed(Mismatch),
}

/// Result of checking one echoed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameReport {
    /// The frame as it was received.
    pub frame: LinFrame,
    pub verdict: Verdict,
}

impl FrameReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Passed
    }
}

impl fmt::Display for FrameReport {
    /// One row of the `[ID] [DATA] [CheckSum] [Result]` table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {:02x} \t", self.frame.pid.0)?;
        for byte in self.frame.data {
            write!(f, "{byte:02x},")?;
        }
        write!(f, "  {:02x} \t", self.frame.checksum)?;
        match self.verdict {
            Verdict::Passed => write!(f, "\tOK"),
            Verdict::Failed(mismatch) => write!(f, "...Failed ({mismatch})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinEvent {
    BreakDetected,
    FrameChecked(FrameReport),
    /// The receive buffer was full.
    ByteDropped(u8),
    LineError(LineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOutcome {
    /// Arrived before the break of the current header.
    Ignored,
    Stored,
    Dropped,
    FrameChecked(FrameReport),
}

/// Index and values of the first byte where `sent` and `received` differ.
pub fn compare(sent: &[u8], received: &[u8], len: usize) -> Result<(), Mismatch> {
    match sent
        .iter()
        .zip(received)
        .take(len)
        .position(|(sent, received)| sent != received)
    {
        Some(index) => Err(Mismatch {
            index,
            sent: sent[index],
            received: received[index],
        }),
        None => Ok(()),
    }
}

pub struct LinTester {
    send_buf: [u8; FRAME_LEN],
    write_pos: usize,
    rx_buf: Vec<u8, RX_BUFFER_SIZE>,
    waiting: bool,
    state: TesterState,
    mismatch_policy: MismatchPolicy,
    header_break_length: u8,
}

impl LinTester {
    pub fn new(config: &LinTestConfig) -> Self {
        Self {
            send_buf: [0; FRAME_LEN],
            write_pos: 0,
            rx_buf: Vec::new(),
            waiting: true,
            state: TesterState::Idle,
            mismatch_policy: config.mismatch_policy,
            header_break_length: config.header_break_length,
        }
    }

    pub fn state(&self) -> TesterState {
        self.state
    }

    /// Whether the break of the last header is still outstanding.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Number of bytes in the receive accumulator.
    pub fn rx_position(&self) -> usize {
        self.rx_buf.len()
    }

    pub fn send_header<U: LinUart>(
        &mut self,
        uart: &mut U,
        id: u8,
    ) -> Result<HeaderReport, Error<U::Error>> {
        self.write_pos = 0;
        self.waiting = true;
        self.state = TesterState::HeaderSent {
            id,
            break_detected: false,
        };

        uart.select_lin_mode(LinMode::rx_tx(self.header_break_length))?;

        let pid = ProtectedIdentifier::from_id(id);
        self.push_send(SYNC_BYTE);
        self.push_send(pid.0);
        uart.write(&self.send_buf[..self.write_pos])?;

        Ok(HeaderReport {
            id,
            pid,
            id_in_range: id <= MAX_ID,
        })
    }

    /// Sends `pattern` and its checksum, returns the checksum.
    pub fn send_response<U: LinUart>(
        &mut self,
        uart: &mut U,
        mode: LinChecksum,
        pattern: &[u8; DATA_LEN],
    ) -> Result<u8, Error<U::Error>> {
        let TesterState::HeaderSent { id, .. } = self.state else {
            return Err(Error::ResponseWithoutHeader { state: self.state });
        };

        for byte in pattern {
            self.push_send(*byte);
        }
        let checksum = frame_checksum(&self.send_buf, mode);
        self.push_send(checksum);

        self.state = TesterState::AwaitingResponseEcho { id };
        uart.write(&self.send_buf[DATA_INDEX..self.write_pos])?;
        Ok(checksum)
    }

    pub fn on_break_detected(&mut self) {
        self.waiting = false;
        if let TesterState::HeaderSent { id, .. } = self.state {
            self.state = TesterState::HeaderSent {
                id,
                break_detected: true,
            };
        }
    }

    pub fn on_byte_received(&mut self, byte: u8) -> ByteOutcome {
        if self.waiting {
            return ByteOutcome::Ignored;
        }
        if self.rx_buf.push(byte).is_err() {
            return ByteOutcome::Dropped;
        }
        if self.rx_buf.len() != FRAME_LEN {
            return ByteOutcome::Stored;
        }
        ByteOutcome::FrameChecked(self.check_frame())
    }

    fn check_frame(&mut self) -> FrameReport {
        let mut received = [0; FRAME_LEN];
        received.copy_from_slice(&self.rx_buf[..FRAME_LEN]);

        let verdict = match compare(&self.send_buf, &received, COMPARE_LEN) {
            Ok(()) => Verdict::Passed,
            Err(mismatch) => Verdict::Failed(mismatch),
        };
        let passed = verdict == Verdict::Passed;
        if passed || self.mismatch_policy == MismatchPolicy::Reset {
            self.rx_buf.clear();
        }

        let frame = LinFrame::from_bytes(&received);
        let id = self.state.id().unwrap_or(frame.pid.get_id());
        self.state = TesterState::FrameComplete { id, passed };

        FrameReport { frame, verdict }
    }

    fn push_send(&mut self, byte: u8) {
        self.send_buf[self.write_pos] = byte;
        self.write_pos += 1;
    }
}

/// The UART together with the tester state it feeds.
pub struct LinMaster<U> {
    pub uart: U,
    pub tester: LinTester,
}

impl<U: LinUart> LinMaster<U> {
    pub fn new(uart: U, config: &LinTestConfig) -> Self {
        Self {
            uart,
            tester: LinTester::new(config),
        }
    }

    /// Opens the UART in LIN mode and enables the receive interrupts.
    pub fn start(&mut self, config: &LinTestConfig) -> Result<(), Error<U::Error>> {
        self.uart.open(config.bitrate)?;
        self.uart.set_line_config(LineConfig::lin(config.bitrate))?;
        self.uart
            .select_lin_mode(LinMode::rx_tx(config.initial_break_length))?;
        self.uart.enable_interrupt(TEST_INTERRUPTS);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.uart
            .disable_interrupt(Interrupts::RECEIVE_DATA_AVAILABLE | Interrupts::LIN_BREAK);
        self.uart.close();
    }

    pub fn send_header(&mut self, id: u8) -> Result<HeaderReport, Error<U::Error>> {
        self.tester.send_header(&mut self.uart, id)
    }

    pub fn send_response(
        &mut self,
        mode: LinChecksum,
        pattern: &[u8; DATA_LEN],
    ) -> Result<u8, Error<U::Error>> {
        self.tester.send_response(&mut self.uart, mode, pattern)
    }

    /// Services every pending interrupt source and reports what happened.
    pub fn handle_interrupt(&mut self, mut on_event: impl FnMut(LinEvent)) {
        let InterruptStatus {
            break_detected,
            rx_data_available,
            line_error,
        } = self.uart.interrupt_status();

        if break_detected {
            self.uart.clear_break_detected();
            self.tester.on_break_detected();
            on_event(LinEvent::BreakDetected);
        }

        if let Some(line_error) = line_error {
            self.uart.clear_line_errors();
            on_event(LinEvent::LineError(line_error));
        }

        if rx_data_available {
            while let Some(byte) = self.uart.read_byte() {
                match self.tester.on_byte_received(byte) {
                    ByteOutcome::Ignored | ByteOutcome::Stored => {}
                    ByteOutcome::Dropped => on_event(LinEvent::ByteDropped(byte)),
                    ByteOutcome::FrameChecked(report) => on_event(LinEvent::FrameChecked(report)),
                }
            }
        }
    }
}

/// Tally of one test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestSummary {
    pub passed: u16,
    pub failed: u16,
    pub timed_out: u16,
    pub unverified: u16,
    pub dropped_bytes: u32,
    pub line_errors: u32,
}

impl TestSummary {
    /// Counts everything but break notifications.
    pub fn record_event(&mut self, event: &LinEvent) {
        match event {
            LinEvent::BreakDetected => {}
            LinEvent::FrameChecked(report) if report.passed() => self.passed += 1,
            LinEvent::FrameChecked(_) => self.failed += 1,
            LinEvent::ByteDropped(_) => self.dropped_bytes += 1,
            LinEvent::LineError(_) => self.line_errors += 1,
        }
    }

    pub fn record_timeout(&mut self) {
        self.timed_out += 1;
    }

    pub fn record_unverified(&mut self) {
        self.unverified += 1;
    }

    pub fn frames(&self) -> u16 {
        self.passed + self.failed + self.timed_out + self.unverified
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.timed_out == 0 && self.unverified == 0
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames: {} passed, {} failed, {} timed out, {} unverified",
            self.frames(),
            self.passed,
            self.failed,
            self.timed_out,
            self.unverified
        )?;
        if self.dropped_bytes > 0 || self.line_errors > 0 {
            write!(
                f,
                " ({} bytes dropped, {} line errors)",
                self.dropped_bytes, self.line_errors
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::string::ToString;
    use std::vec;

    use super::*;
    use crate::config::TEST_PATTERN;

    /// Loops every write back into its receive register.
    #[derive(Default)]
    struct MockUart {
        baudrate: Option<u32>,
        line_config: Option<LineConfig>,
        modes: vec::Vec<LinMode>,
        written: vec::Vec<u8>,
        rx: VecDeque<u8>,
        break_armed: bool,
        break_pending: bool,
        line_error: Option<LineError>,
        enabled: Interrupts,
        closed: bool,
        reject_modes: bool,
    }

    impl LinUart for MockUart {
        type Error = ();

        fn open(&mut self, baudrate: u32) -> Result<(), ()> {
            self.baudrate = Some(baudrate);
            self.closed = false;
            Ok(())
        }

        fn set_line_config(&mut self, config: LineConfig) -> Result<(), ()> {
            self.line_config = Some(config);
            Ok(())
        }

        fn select_lin_mode(&mut self, mode: LinMode) -> Result<(), ()> {
            if self.reject_modes {
                return Err(());
            }
            self.break_armed = mode.tx_enable;
            self.modes.push(mode);
            Ok(())
        }

        fn write(&mut self, buf: &[u8]) -> Result<(), ()> {
            if self.closed {
                return Err(());
            }
            if core::mem::take(&mut self.break_armed) {
                self.break_pending = true;
            }
            self.written.extend_from_slice(buf);
            self.rx.extend(buf);
            Ok(())
        }

        fn enable_interrupt(&mut self, interrupts: Interrupts) {
            self.enabled = self.enabled | interrupts;
        }

        fn disable_interrupt(&mut self, interrupts: Interrupts) {
            self.enabled = self.enabled.difference(interrupts);
        }

        fn close(&mut self) {
            self.closed = true;
        }

        fn interrupt_status(&mut self) -> InterruptStatus {
            InterruptStatus {
                break_detected: self.break_pending,
                rx_data_available: !self.rx.is_empty(),
                line_error: self.line_error,
            }
        }

        fn clear_break_detected(&mut self) {
            self.break_pending = false;
        }

        fn clear_line_errors(&mut self) {
            self.line_error = None;
        }

        fn read_byte(&mut self) -> Option<u8> {
            self.rx.pop_front()
        }
    }

    fn master(policy: MismatchPolicy) -> LinMaster<MockUart> {
        let config = LinTestConfig {
            mismatch_policy: policy,
            ..Default::default()
        };
        let mut master = LinMaster::new(MockUart::default(), &config);
        master.start(&config).unwrap();
        master
    }

    fn service(master: &mut LinMaster<MockUart>) -> vec::Vec<LinEvent> {
        let mut events = vec::Vec::new();
        master.handle_interrupt(|event| events.push(event));
        events
    }

    /// Header, echo of the header, response and its echo. `corrupt` replaces a
    /// byte of the echoed response before it is read.
    fn run_frame(
        master: &mut LinMaster<MockUart>,
        id: u8,
        corrupt: Option<(usize, u8)>,
    ) -> vec::Vec<LinEvent> {
        master.send_header(id).unwrap();
        let mut events = service(master);
        master
            .send_response(LinChecksum::Enhanced, &TEST_PATTERN)
            .unwrap();
        if let Some((index, value)) = corrupt {
            master.uart.rx[index - DATA_INDEX] = value;
        }
        events.extend(service(master));
        events
    }

    #[test]
    fn start_configures_lin_mode() {
        let master = master(MismatchPolicy::Retain);
        assert_eq!(master.uart.baudrate, Some(9600));
        assert!(master.uart.line_config.unwrap().is_lin_compatible());
        assert_eq!(master.uart.modes, [LinMode::rx_tx(5)]);
        assert_eq!(master.uart.enabled, TEST_INTERRUPTS);
        assert_eq!(master.tester.state(), TesterState::Idle);
    }

    #[test]
    fn failed_start_leaves_interrupts_disabled() {
        let config = LinTestConfig::default();
        let uart = MockUart {
            reject_modes: true,
            ..Default::default()
        };
        let mut master = LinMaster::new(uart, &config);

        assert_eq!(master.start(&config), Err(Error::Uart(())));
        assert_eq!(master.uart.enabled, Interrupts::empty());
        assert!(master.uart.written.is_empty());
    }

    #[test]
    fn stop_disables_receive_and_closes() {
        let mut master = master(MismatchPolicy::Retain);
        master.stop();
        assert_eq!(master.uart.enabled, Interrupts::RECEIVE_LINE_STATUS);
        assert!(master.uart.closed);
        assert_eq!(master.send_header(0), Err(Error::Uart(())));
    }

    #[test]
    fn header_sends_sync_and_pid() {
        let mut master = master(MismatchPolicy::Retain);
        let report = master.send_header(2).unwrap();

        assert_eq!(report.pid, ProtectedIdentifier(0x42));
        assert!(report.id_in_range);
        assert_eq!(master.uart.written, [SYNC_BYTE, 0x42]);
        assert_eq!(master.uart.modes.last(), Some(&LinMode::rx_tx(13)));
        assert!(master.tester.is_waiting());
        assert_eq!(
            master.tester.state(),
            TesterState::HeaderSent {
                id: 2,
                break_detected: false
            }
        );
    }

    #[test]
    fn out_of_range_id_is_sent_anyway() {
        let mut master = master(MismatchPolicy::Retain);
        let report = master.send_header(0x40).unwrap();
        assert!(!report.id_in_range);
        assert_eq!(master.uart.written, [SYNC_BYTE, 0xC0]);
    }

    #[test]
    fn response_appends_pattern_and_checksum() {
        let mut master = master(MismatchPolicy::Retain);
        master.send_header(0).unwrap();
        service(&mut master);
        let checksum = master
            .send_response(LinChecksum::Enhanced, &TEST_PATTERN)
            .unwrap();

        assert_eq!(checksum, 0x7F);
        assert_eq!(master.uart.written.len(), 2 + DATA_LEN + 1);
        assert_eq!(master.uart.written[DATA_INDEX..FRAME_LEN - 1], TEST_PATTERN);
        assert_eq!(master.tester.state(), TesterState::AwaitingResponseEcho { id: 0 });
    }

    #[test]
    fn classic_checksum_skips_pid() {
        let mut master = master(MismatchPolicy::Retain);
        master.send_header(0).unwrap();
        let checksum = master
            .send_response(LinChecksum::Classic, &TEST_PATTERN)
            .unwrap();
        assert_eq!(checksum, 0x00);
    }

    #[test]
    fn response_without_header_is_rejected() {
        let mut master = master(MismatchPolicy::Retain);
        assert_eq!(
            master.send_response(LinChecksum::Enhanced, &TEST_PATTERN),
            Err(Error::ResponseWithoutHeader {
                state: TesterState::Idle
            })
        );

        run_frame(&mut master, 1, None);
        assert!(matches!(
            master.send_response(LinChecksum::Enhanced, &TEST_PATTERN),
            Err(Error::ResponseWithoutHeader {
                state: TesterState::FrameComplete { id: 1, passed: true }
            })
        ));
    }

    #[test]
    fn matching_echo_passes_and_resets_position() {
        let mut master = master(MismatchPolicy::Retain);
        let events = run_frame(&mut master, 0, None);

        let expected = LinFrame::new(ProtectedIdentifier(0x80), TEST_PATTERN, LinChecksum::Enhanced);
        assert_eq!(
            events,
            [
                LinEvent::BreakDetected,
                LinEvent::FrameChecked(FrameReport {
                    frame: expected,
                    verdict: Verdict::Passed
                })
            ]
        );
        assert_eq!(master.tester.rx_position(), 0);
        assert_eq!(
            master.tester.state(),
            TesterState::FrameComplete { id: 0, passed: true }
        );
    }

    #[test]
    fn bytes_before_break_are_ignored() {
        let mut master = master(MismatchPolicy::Retain);
        master.send_header(3).unwrap();
        master.uart.break_pending = false;
        assert!(service(&mut master).is_empty());
        assert_eq!(master.tester.rx_position(), 0);
        assert!(master.tester.is_waiting());

        assert_eq!(master.tester.on_byte_received(0x55), ByteOutcome::Ignored);
        master.tester.on_break_detected();
        assert_eq!(master.tester.on_byte_received(0x55), ByteOutcome::Stored);
        assert_eq!(master.tester.rx_position(), 1);
    }

    #[test]
    fn mismatch_retains_buffer() {
        let mut master = master(MismatchPolicy::Retain);
        let events = run_frame(&mut master, 4, Some((5, 0x13)));

        let LinEvent::FrameChecked(report) = events[1] else {
            panic!("expected a frame report, got {events:?}");
        };
        assert_eq!(
            report.verdict,
            Verdict::Failed(Mismatch {
                index: 5,
                sent: TEST_PATTERN[3],
                received: 0x13
            })
        );
        assert_eq!(master.tester.rx_position(), FRAME_LEN);

        // The stale frame shifts every later echo, nothing gets checked anymore
        let events = run_frame(&mut master, 5, None);
        assert_eq!(events, [LinEvent::BreakDetected]);
        assert_eq!(master.tester.rx_position(), 2 * FRAME_LEN);
    }

    #[test]
    fn retained_buffer_overruns() {
        let mut master = master(MismatchPolicy::Retain);
        run_frame(&mut master, 0, Some((2, 0xEE)));

        let mut dropped = 0;
        for id in 1..10 {
            dropped += run_frame(&mut master, id, None)
                .iter()
                .filter(|event| matches!(event, LinEvent::ByteDropped(_)))
                .count();
        }
        assert_eq!(master.tester.rx_position(), RX_BUFFER_SIZE);
        assert_eq!(dropped, 10 * FRAME_LEN - RX_BUFFER_SIZE);
    }

    #[test]
    fn mismatch_with_reset_policy_recovers() {
        let mut master = master(MismatchPolicy::Reset);
        let events = run_frame(&mut master, 6, Some((9, 0x00)));
        assert!(matches!(
            events[1],
            LinEvent::FrameChecked(FrameReport {
                verdict: Verdict::Failed(Mismatch { index: 9, .. }),
                ..
            })
        ));
        assert_eq!(master.tester.rx_position(), 0);

        let events = run_frame(&mut master, 7, None);
        assert!(matches!(events[1], LinEvent::FrameChecked(report) if report.passed()));
    }

    #[test]
    fn checksum_byte_is_not_compared() {
        let mut master = master(MismatchPolicy::Retain);
        let events = run_frame(&mut master, 8, Some((FRAME_LEN - 1, 0x00)));
        let LinEvent::FrameChecked(report) = events[1] else {
            panic!("expected a frame report, got {events:?}");
        };
        assert!(report.passed());
        assert_eq!(report.frame.checksum, 0x00);
    }

    #[test]
    fn line_errors_are_reported_and_cleared() {
        let mut master = master(MismatchPolicy::Retain);
        master.uart.line_error = Some(LineError::Framing);
        assert_eq!(service(&mut master), [LinEvent::LineError(LineError::Framing)]);
        assert_eq!(master.uart.line_error, None);
    }

    #[test]
    fn compare_finds_first_difference() {
        assert_eq!(compare(&[1, 2, 3], &[1, 2, 3], 3), Ok(()));
        assert_eq!(compare(&[1, 2, 3], &[1, 2, 4], 2), Ok(()));
        assert_eq!(
            compare(&[1, 2, 3], &[1, 9, 4], 3),
            Err(Mismatch {
                index: 1,
                sent: 2,
                received: 9
            })
        );
    }

    #[test]
    fn report_row_format() {
        let frame = LinFrame::new(ProtectedIdentifier(0x80), TEST_PATTERN, LinChecksum::Enhanced);
        let report = FrameReport {
            frame,
            verdict: Verdict::Passed,
        };
        assert_eq!(
            report.to_string(),
            "  80 \t00,55,aa,ff,00,55,ff,aa,  7f \t\tOK"
        );

        let report = FrameReport {
            frame,
            verdict: Verdict::Failed(Mismatch {
                index: 5,
                sent: 0xff,
                received: 0x13,
            }),
        };
        assert!(report.to_string().ends_with("...Failed (In[5] = ff , Out[5] = 19)"));
    }

    #[test]
    fn summary_counts_events() {
        let mut summary = TestSummary::default();
        let mut master = master(MismatchPolicy::Reset);
        for event in run_frame(&mut master, 0, None)
            .iter()
            .chain(&run_frame(&mut master, 1, Some((4, 0x01))))
        {
            summary.record_event(event);
        }
        summary.record_timeout();

        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.frames(), 3);
        assert!(!summary.is_success());
        assert_eq!(
            summary.to_string(),
            "3 frames: 1 passed, 1 failed, 1 timed out, 0 unverified"
        );
    }
}
