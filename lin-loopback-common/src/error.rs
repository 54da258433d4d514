use core::fmt;

use crate::tester::TesterState;

/// Failures of the tester, generic over the error type of the UART it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The UART collaborator failed.
    Uart(E),
    /// A response was requested while no header was outstanding.
    ResponseWithoutHeader { state: TesterState },
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Error::Uart(err)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Uart(e) => write!(f, "UART error: {e:?}"),
            Error::ResponseWithoutHeader { state } => {
                write!(f, "Cannot send a response in state {state:?}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for Error<E> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroBitrate,
    NoFrames,
    ZeroTimeout,
    /// `first_id + frame_count` does not fit into a byte.
    IdRangeOverflow { first_id: u8, frame_count: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroBitrate => write!(f, "Bitrate must not be zero"),
            ConfigError::NoFrames => write!(f, "At least one frame has to be sent"),
            ConfigError::ZeroTimeout => write!(f, "Response timeout must not be zero"),
            ConfigError::IdRangeOverflow {
                first_id,
                frame_count,
            } => write!(
                f,
                "Ids {first_id} to {first_id}+{frame_count} do not fit into a byte"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
