//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DryerVentSensor (domain)
//! ```
//!
//! Driven adapters (capture rings, test line, measurement channels, event
//! sinks) implement these traits.  The
//! [`DryerVentSensor`](super::service::DryerVentSensor) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::capture::RawEdge;

// ───────────────────────────────────────────────────────────────
// Capture port (driven adapter: ISR rings → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port over whatever interrupt context recorded.
pub trait CaptureSource {
    /// Hand every queued envelope bin (PCNT edges per sample period) to
    /// `f`, oldest first.
    fn drain_bins(&mut self, f: impl FnMut(u16));

    /// Hand every queued test-line transition to `f`, oldest first.
    fn drain_edges(&mut self, f: impl FnMut(RawEdge));

    /// Items dropped by full rings since boot (wrapping).
    fn overflow_drops(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Self-test port (driven adapter: domain → test GPIO)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the open-drain self-test line.
pub trait SelfTestPort {
    /// `true` pulls the line LOW (test requested); `false` releases it.
    fn set_test_line(&mut self, asserted: bool);
}

// ───────────────────────────────────────────────────────────────
// Measurement channel (driven adapter: domain → host)
// ───────────────────────────────────────────────────────────────

/// A host-side measurement the reporter publishes to.
pub trait SensorChannel {
    fn publish_state(&mut self, value: f32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
