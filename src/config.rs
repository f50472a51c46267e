//! System configuration parameters
//!
//! All tunable parameters for the dryer vent monitor.  Values mirror the
//! reference driver: 20 ms envelope bins, a 1 s inter-packet gap and the
//! bin thresholds translated to milliseconds.  A host may supply a JSON
//! document with any subset of fields; missing fields take defaults.

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierThresholds;
use crate::error::ConfigError;

/// Default poll interval of the reporter.
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 15_000;

/// Upper bound on `LatchConfig::confirm_count` (fixed window storage).
pub const MAX_CONFIRM_COUNT: u8 = 8;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Pins (normally set by the glue through set_count_pin/set_test_pin) ---
    pub count_pin: Option<i32>,
    pub test_pin: Option<i32>,

    // --- Timing ---
    /// Reporter poll interval (milliseconds)
    pub update_interval_ms: u32,

    pub capture: CaptureConfig,
    pub framing: FramingConfig,
    pub thresholds: ClassifierThresholds,

    // --- Derived states ---
    pub overheat: LatchConfig,
    pub clog: LatchConfig,
    pub selftest: SelfTestConfig,
}

/// Pulse capture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// A transition reverted within this many ms is treated as noise.
    pub debounce_ms: u32,
    /// Envelope bin length (ms); the sampling timer period.
    pub sample_period_ms: u32,
    /// Buzzer edges per bin above which the bin counts as active.
    pub activity_threshold: u16,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 5,
            sample_period_ms: 20,
            activity_threshold: 5,
        }
    }
}

/// Packet framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Idle time after the last pulse that closes a packet (exclusive).
    pub packet_gap_ms: u32,
    /// Pulses no longer than this are counted as blips (`short_packet`).
    pub blip_max_ms: u32,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            packet_gap_ms: 1_000,
            blip_max_ms: 20,
        }
    }
}

/// Set/clear behaviour of a derived boolean state (overheat, clog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchConfig {
    /// Qualifying packets needed within `window_ms` to set the state.
    pub confirm_count: u8,
    /// Window over which qualifying packets are counted (inclusive).
    pub window_ms: u32,
    /// Quiet time after the last qualifying packet that clears the state.
    pub cooldown_ms: u32,
}

impl Default for LatchConfig {
    fn default() -> Self {
        Self {
            confirm_count: 1,
            window_ms: 60_000,
            cooldown_ms: 3_600_000,
        }
    }
}

/// Scheduled self-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfTestConfig {
    /// Delay after boot before the first self-test.
    pub first_ms: u32,
    /// Period between scheduled self-tests.
    pub period_ms: u32,
    /// How long the test line is held LOW.
    pub pulse_ms: u32,
    /// A test without acknowledgement within this time has failed.
    pub timeout_ms: u32,
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            first_ms: 40_000,
            period_ms: 86_400_000, // one day
            pulse_ms: 25,
            timeout_ms: 60_000, // four polls at the default interval
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            count_pin: None,
            test_pin: None,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            capture: CaptureConfig::default(),
            framing: FramingConfig::default(),
            thresholds: ClassifierThresholds::default(),
            overheat: LatchConfig::default(),
            clog: LatchConfig::default(),
            selftest: SelfTestConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Parse a JSON document.  Missing fields take their defaults; the
    /// result is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config: parse failed: {e}");
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every tunable.  Pins are checked when the component
    /// starts, since the glue may set them after the config is loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::InvalidUpdateInterval);
        }
        if self.capture.sample_period_ms == 0 {
            return Err(ConfigError::InvalidTiming("sample_period_ms"));
        }
        if self.framing.packet_gap_ms <= self.capture.sample_period_ms {
            return Err(ConfigError::InvalidTiming("packet_gap_ms"));
        }
        self.thresholds.validate()?;
        for (name, latch) in [("overheat", &self.overheat), ("clog", &self.clog)] {
            if latch.confirm_count == 0 || latch.confirm_count > MAX_CONFIRM_COUNT {
                log::warn!("config: {name} confirm_count {} out of range", latch.confirm_count);
                return Err(ConfigError::InvalidTiming("confirm_count"));
            }
            if latch.cooldown_ms == 0 {
                return Err(ConfigError::InvalidTiming("cooldown_ms"));
            }
        }
        if self.selftest.pulse_ms == 0 {
            return Err(ConfigError::InvalidTiming("selftest.pulse_ms"));
        }
        if self.selftest.timeout_ms == 0 || self.selftest.period_ms <= self.selftest.timeout_ms {
            return Err(ConfigError::InvalidTiming("selftest.timeout_ms"));
        }
        Ok(())
    }
}
