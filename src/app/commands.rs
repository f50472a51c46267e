//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (host API,
//! serial console) that the
//! [`DryerVentSensor`](super::service::DryerVentSensor) interprets and
//! acts upon.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Zero every packet counter, the blip count, the self-test counter
    /// and the drop counters.  Derived flags are left alone.
    ClearCounters,

    /// Pulse the test line now instead of waiting for the schedule.
    RunSelfTest,
}
