//! Outbound application events.
//!
//! The [`DryerVentSensor`](super::service::DryerVentSensor) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use crate::classifier::PacketClass;
use crate::report::ReportSnapshot;

/// Boolean states derived from the packet stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedFlag {
    Overheat,
    Clog,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// `setup()` succeeded; pins are attached and capture is running.
    Started { count_pin: i32, test_pin: i32 },

    /// A packet was framed and classified.
    PacketDecoded {
        class: PacketClass,
        pulses: u8,
        last_pulse_ms: u32,
    },

    /// A derived flag set or cleared.
    StateChanged { flag: DerivedFlag, active: bool },

    /// The test line was seen pulled low.
    SelfTestStarted,

    /// The vent unit answered a self-test.
    SelfTestPassed { completed: u32 },

    /// No answer within the self-test timeout.
    SelfTestFailed,

    /// Capture rings dropped items since the last report of this event.
    CaptureOverflow { dropped: u32 },

    /// Periodic report, published to the configured channels.
    Report(ReportSnapshot),
}
