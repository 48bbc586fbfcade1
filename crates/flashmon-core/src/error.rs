//! Error types for flashmon-core
//!
//! Device failures are detected at the failing driver call and handled with
//! a flat report-and-flag model: the console prints a message on the
//! protocol sink, latches the fault, and keeps accepting commands. Nothing
//! unwinds through the tick loop except transport failures.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Device read failed
    ReadFailed,
    /// Device program operation failed
    WriteFailed,
    /// Chip erase failed
    EraseFailed,
    /// Device initialization or identification failed
    InitFailed,
    /// Serial transport failed
    Io,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "device read failed"),
            Self::WriteFailed => write!(f, "device program failed"),
            Self::EraseFailed => write!(f, "chip erase failed"),
            Self::InitFailed => write!(f, "device initialization failed"),
            Self::Io => write!(f, "console I/O failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
