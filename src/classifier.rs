//! Pulse timing classifier.
//!
//! The vent unit signals with beep trains on its buzzer line.  The number
//! of beeps in a train selects the category and the length of the final
//! beep selects the variant:
//!
//! | Pulses | Meaning                  |
//! |--------|--------------------------|
//! | 1      | startup / test response  |
//! | 3      | clog                     |
//! | 5      | overheat                 |
//! | other  | unknown                  |
//!
//! Any pulse on the test line is the start of a self-test.
//!
//! Each category has two cut-offs splitting the final pulse into short,
//! nominal and long bands.  A duration exactly on a cut-off belongs to the
//! shorter band (upper bound inclusive): firmware timing jitters by a bin,
//! and the reference thresholds were written as "fewer than N bins".
//!
//! [`classify`] is a pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::capture::PinRole;
use crate::error::ConfigError;

/// Semantic class of one framed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PacketClass {
    ShortStart = 0,
    Start = 1,
    LongStart = 2,
    ShortClog = 3,
    Clog = 4,
    LongClog = 5,
    ShortOverheat = 6,
    Overheat = 7,
    LongOverheat = 8,
    Unknown = 9,
    SelfTest = 10,
}

impl PacketClass {
    /// Number of classes, sizing the counter table.
    pub const COUNT: usize = 11;

    pub const ALL: [Self; Self::COUNT] = [
        Self::ShortStart,
        Self::Start,
        Self::LongStart,
        Self::ShortClog,
        Self::Clog,
        Self::LongClog,
        Self::ShortOverheat,
        Self::Overheat,
        Self::LongOverheat,
        Self::Unknown,
        Self::SelfTest,
    ];

    /// Counter slot for this class.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_clog(self) -> bool {
        matches!(self, Self::ShortClog | Self::Clog | Self::LongClog)
    }

    pub const fn is_overheat(self) -> bool {
        matches!(self, Self::ShortOverheat | Self::Overheat | Self::LongOverheat)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::ShortStart => "short_start",
            Self::Start => "start",
            Self::LongStart => "long_start",
            Self::ShortClog => "short_clog",
            Self::Clog => "clog",
            Self::LongClog => "long_clog",
            Self::ShortOverheat => "short_overheat",
            Self::Overheat => "overheat",
            Self::LongOverheat => "long_overheat",
            Self::Unknown => "unknown",
            Self::SelfTest => "selftest",
        }
    }
}

/// What the framer knows about a completed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketSignature {
    pub pin: PinRole,
    /// Pulses in the train (>= 1).
    pub pulses: u8,
    /// Duration of the last pulse in the train (ms).
    pub last_pulse_ms: u32,
}

/// Short / nominal / long split of a final-pulse duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBands {
    /// Durations `<= short_max_ms` are short.
    pub short_max_ms: u32,
    /// Durations in `(short_max_ms, nominal_max_ms]` are nominal; above is long.
    pub nominal_max_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Short,
    Nominal,
    Long,
}

impl DurationBands {
    fn band(&self, duration_ms: u32) -> Band {
        if duration_ms <= self.short_max_ms {
            Band::Short
        } else if duration_ms <= self.nominal_max_ms {
            Band::Nominal
        } else {
            Band::Long
        }
    }
}

/// Ordered threshold table consulted by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub start_pulses: u8,
    pub clog_pulses: u8,
    pub overheat_pulses: u8,
    pub start: DurationBands,
    pub clog: DurationBands,
    pub overheat: DurationBands,
}

impl Default for ClassifierThresholds {
    /// Reference thresholds: 20 ms bins, start `< 25` / `> 45` bins,
    /// clog and overheat `< 3` / `> 7` bins.
    fn default() -> Self {
        Self {
            start_pulses: 1,
            clog_pulses: 3,
            overheat_pulses: 5,
            start: DurationBands {
                short_max_ms: 480,
                nominal_max_ms: 900,
            },
            clog: DurationBands {
                short_max_ms: 40,
                nominal_max_ms: 140,
            },
            overheat: DurationBands {
                short_max_ms: 40,
                nominal_max_ms: 140,
            },
        }
    }
}

impl ClassifierThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, bands) in [
            ("start", &self.start),
            ("clog", &self.clog),
            ("overheat", &self.overheat),
        ] {
            if bands.short_max_ms >= bands.nominal_max_ms {
                return Err(ConfigError::InvalidThresholds(name));
            }
        }
        let counts = [self.start_pulses, self.clog_pulses, self.overheat_pulses];
        if counts.contains(&0)
            || counts[0] == counts[1]
            || counts[0] == counts[2]
            || counts[1] == counts[2]
        {
            return Err(ConfigError::InvalidThresholds("pulse count"));
        }
        Ok(())
    }
}

/// Map a packet to its class.
pub fn classify(thresholds: &ClassifierThresholds, sig: &PacketSignature) -> PacketClass {
    if sig.pin == PinRole::Test {
        return PacketClass::SelfTest;
    }

    let t = thresholds;
    let d = sig.last_pulse_ms;
    if sig.pulses == t.start_pulses {
        match t.start.band(d) {
            Band::Short => PacketClass::ShortStart,
            Band::Nominal => PacketClass::Start,
            Band::Long => PacketClass::LongStart,
        }
    } else if sig.pulses == t.clog_pulses {
        match t.clog.band(d) {
            Band::Short => PacketClass::ShortClog,
            Band::Nominal => PacketClass::Clog,
            Band::Long => PacketClass::LongClog,
        }
    } else if sig.pulses == t.overheat_pulses {
        match t.overheat.band(d) {
            Band::Short => PacketClass::ShortOverheat,
            Band::Nominal => PacketClass::Overheat,
            Band::Long => PacketClass::LongOverheat,
        }
    } else {
        PacketClass::Unknown
    }
}
