#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod config;
pub mod error;
pub mod lin;
pub mod tester;
pub mod uart;

pub use config::{LinTestConfig, MismatchPolicy, TEST_PATTERN};
pub use error::{ConfigError, Error};
pub use lin::{LinChecksum, LinFrame, ProtectedIdentifier};
pub use tester::{FrameReport, LinEvent, LinMaster, LinTester, TestSummary, Verdict};
pub use uart::LinUart;
