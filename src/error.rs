//! Unified error types for the DryerVent firmware.
//!
//! A single `Error` enum that every subsystem converts into.  All variants
//! are `Copy` so they pass through the service and the main loop without
//! allocation.
//!
//! Only configuration problems are fatal.  Capture overflow is counted and
//! reported as an [`AppEvent`](crate::app::events::AppEvent); unknown
//! packets are an ordinary classification outcome and never surface here.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is incomplete or inconsistent; the component refuses
    /// to start.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `count_pin` was never set.
    MissingCountPin,
    /// `test_pin` was never set.
    MissingTestPin,
    /// Count and test pin resolve to the same GPIO.
    PinConflict(i32),
    /// Poll interval of zero.
    InvalidUpdateInterval,
    /// A threshold table is not strictly ordered.  Names the table.
    InvalidThresholds(&'static str),
    /// A timing parameter is out of range.  Names the field.
    InvalidTiming(&'static str),
    /// Configuration document could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCountPin => write!(f, "count_pin is required"),
            Self::MissingTestPin => write!(f, "test_pin is required"),
            Self::PinConflict(gpio) => {
                write!(f, "count_pin and test_pin both use GPIO{gpio}")
            }
            Self::InvalidUpdateInterval => write!(f, "update_interval must be non-zero"),
            Self::InvalidThresholds(table) => write!(f, "{table} thresholds out of order"),
            Self::InvalidTiming(field) => write!(f, "{field} out of range"),
            Self::Malformed => write!(f, "malformed configuration"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
