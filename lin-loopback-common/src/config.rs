use crate::error::ConfigError;
use crate::lin::{DATA_LEN, LinChecksum};

/// Data bytes sent in every response.
pub const TEST_PATTERN: [u8; DATA_LEN] = [0x00, 0x55, 0xAA, 0xFF, 0x00, 0x55, 0xFF, 0xAA];

/// What the tester does with its receive buffer after an echo mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Keep the failed frame in the buffer. Later bytes are appended behind it,
    /// so no later frame reaches the check until the buffer overruns.
    #[default]
    Retain,
    /// Drop the failed frame and start over with the next echo.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct LinTestConfig {
    pub bitrate: u32,
    pub checksum: LinChecksum,
    pub first_id: u8,
    pub frame_count: u8,
    pub pattern: [u8; DATA_LEN],
    /// Break length selected when LIN mode is first entered.
    pub initial_break_length: u8,
    /// Break length of every header.
    pub header_break_length: u8,
    pub response_timeout_ms: u32,
    pub inter_frame_delay_us: u32,
    pub mismatch_policy: MismatchPolicy,
}

impl Default for LinTestConfig {
    fn default() -> Self {
        Self {
            bitrate: 9600,
            checksum: LinChecksum::Enhanced,
            first_id: 0,
            frame_count: 10,
            pattern: TEST_PATTERN,
            initial_break_length: 5,
            header_break_length: 13,
            response_timeout_ms: 100,
            inter_frame_delay_us: 5000,
            mismatch_policy: MismatchPolicy::Retain,
        }
    }
}

impl LinTestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bitrate == 0 {
            return Err(ConfigError::ZeroBitrate);
        }
        if self.frame_count == 0 {
            return Err(ConfigError::NoFrames);
        }
        if self.response_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.first_id.checked_add(self.frame_count - 1).is_none() {
            return Err(ConfigError::IdRangeOverflow {
                first_id: self.first_id,
                frame_count: self.frame_count,
            });
        }
        Ok(())
    }

    /// Identifiers in the order they are sent.
    pub fn ids(&self) -> impl Iterator<Item = u8> {
        let first_id = self.first_id;
        (0..self.frame_count).map(move |offset| first_id.wrapping_add(offset))
    }
}
