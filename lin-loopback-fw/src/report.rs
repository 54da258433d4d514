//! Console output of the test over defmt.

use lin_loopback_common::{FrameReport, TestSummary, Verdict};

const RULE: &str = "+-----------------------------------------------------------+";

pub fn print_banner() {
    defmt::println!("{=str}", RULE);
    defmt::println!("|                    LIN Function Test                      |");
    defmt::println!("{=str}", RULE);
    defmt::println!("| Wire UART7 TX to RX. Each header and response is read     |");
    defmt::println!("| back and compared with what was sent.                     |");
    defmt::println!("{=str}", RULE);
}

pub fn print_table_header() {
    defmt::println!("{=str}", RULE);
    defmt::println!("|[ID]   [DATA]                   [CheckSum] [Result]        |");
    defmt::println!("{=str}", RULE);
}

pub fn print_row(report: &FrameReport) {
    let frame = &report.frame;
    match report.verdict {
        Verdict::Passed => defmt::println!(
            "  {=u8:02x} \t{=[u8]:02x}  {=u8:02x} \t\tOK",
            frame.pid.0,
            &frame.data[..],
            frame.checksum
        ),
        Verdict::Failed(mismatch) => defmt::println!(
            "  {=u8:02x} \t{=[u8]:02x}  {=u8:02x} \t...Failed (In[{=usize}] = {=u8:x} , Out[{=usize}] = {=u8})",
            frame.pid.0,
            &frame.data[..],
            frame.checksum,
            mismatch.index,
            mismatch.sent,
            mismatch.index,
            mismatch.received
        ),
    }
}

pub fn print_timeout(id: u8) {
    defmt::println!("  {=u8:02x} \t...Timeout", id);
}

pub fn print_summary(summary: &TestSummary) {
    defmt::println!("\nLIN Sample Demo End.");
    defmt::println!(
        "{=u16} frames: {=u16} passed, {=u16} failed, {=u16} timed out, {=u16} unverified",
        summary.frames(),
        summary.passed,
        summary.failed,
        summary.timed_out,
        summary.unverified
    );
    if summary.dropped_bytes > 0 || summary.line_errors > 0 {
        defmt::println!(
            "{=u32} bytes dropped, {=u32} line errors",
            summary.dropped_bytes,
            summary.line_errors
        );
    }
}
