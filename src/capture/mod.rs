//! Pulse capture — turns raw pin transitions into debounced pulses.
//!
//! ```text
//!  PCNT bins ──▶ EnvelopeDetector ──┐
//!                                   ├──▶ RawEdge ──▶ PulseCapture ──▶ PulseEvent
//!  test GPIO ISR ───────────────────┘
//! ```
//!
//! Interrupt context only records [`RawEdge`]s (level + timestamp) into
//! the rings in [`queue`].  Everything here runs on the main loop.
//!
//! ## Debounce
//!
//! A transition is held as *pending* until it has lasted `debounce_ms`.
//! If the line reverts before that, both transitions are discarded and
//! counted as one glitch.  A pulse is emitted when its trailing edge is
//! confirmed, so a `PulseEvent` always describes a complete active
//! interval.

pub mod envelope;
pub mod queue;

use serde::{Deserialize, Serialize};

/// Which vent-unit line a pin is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinRole {
    /// Buzzer line (sense only).
    Count,
    /// Self-test line (open-drain, sensed and driven).
    Test,
}

/// Edges the hardware is asked to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    Rising,
    Falling,
    Both,
}

/// A monitored input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub gpio: i32,
    pub role: PinRole,
    /// Electrical level that means "signal present".
    pub active_high: bool,
    pub edge: EdgeMode,
}

impl Pin {
    /// Buzzer line: counted on rising edges, envelope is active-high.
    pub const fn count(gpio: i32) -> Self {
        Self {
            gpio,
            role: PinRole::Count,
            active_high: true,
            edge: EdgeMode::Rising,
        }
    }

    /// Test line: active LOW, both edges needed to time the press.
    pub const fn test(gpio: i32) -> Self {
        Self {
            gpio,
            role: PinRole::Test,
            active_high: false,
            edge: EdgeMode::Both,
        }
    }
}

/// One transition as recorded in interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEdge {
    pub role: PinRole,
    /// Electrical level after the transition.
    pub level: bool,
    /// Milliseconds since boot (wrapping).
    pub at_ms: u32,
}

/// One complete active interval on a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEvent {
    pub role: PinRole,
    /// Leading-edge timestamp (ms since boot, wrapping).
    pub started_at_ms: u32,
    pub duration_ms: u32,
}

impl PulseEvent {
    /// Trailing-edge timestamp.
    pub fn ended_at_ms(&self) -> u32 {
        self.started_at_ms.wrapping_add(self.duration_ms)
    }
}

/// Result of feeding one edge to a [`PinTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeOutcome {
    /// Nothing to report yet (edge pending, or a repeat of the current level).
    Held,
    /// The edge reverted a pending one inside the debounce interval.
    Glitch,
    /// A pending trailing edge was confirmed.
    Pulse(PulseEvent),
}

/// Debounce state for one pin, tracked in active/idle terms.
#[derive(Debug, Clone, Copy)]
struct PinTracker {
    pin: Pin,
    /// Confirmed state of the line.
    active: bool,
    /// When the confirmed state began.
    since_ms: u32,
    /// Unconfirmed transition: (active, at_ms).
    pending: Option<(bool, u32)>,
}

impl PinTracker {
    fn new(pin: Pin) -> Self {
        Self {
            pin,
            active: false,
            since_ms: 0,
            pending: None,
        }
    }

    fn on_edge(&mut self, level: bool, at_ms: u32, debounce_ms: u32) -> EdgeOutcome {
        let active = level == self.pin.active_high;

        match self.pending {
            Some((pending_active, _)) if pending_active == active => EdgeOutcome::Held,
            Some((_, pending_at)) => {
                if at_ms.wrapping_sub(pending_at) < debounce_ms {
                    self.pending = None;
                    return EdgeOutcome::Glitch;
                }
                let pulse = self.confirm();
                self.pending = Some((active, at_ms));
                pulse.map_or(EdgeOutcome::Held, EdgeOutcome::Pulse)
            }
            None if active == self.active => EdgeOutcome::Held,
            None => {
                self.pending = Some((active, at_ms));
                EdgeOutcome::Held
            }
        }
    }

    /// Confirm a pending edge that has held for the debounce interval.
    fn settle(&mut self, now_ms: u32, debounce_ms: u32) -> Option<PulseEvent> {
        match self.pending {
            Some((_, at)) if now_ms.wrapping_sub(at) >= debounce_ms => self.confirm(),
            _ => None,
        }
    }

    fn confirm(&mut self) -> Option<PulseEvent> {
        let (active, at_ms) = self.pending.take()?;
        let pulse = (self.active && !active).then(|| PulseEvent {
            role: self.pin.role,
            started_at_ms: self.since_ms,
            duration_ms: at_ms.wrapping_sub(self.since_ms),
        });
        self.active = active;
        self.since_ms = at_ms;
        pulse
    }

    fn is_idle(&self) -> bool {
        !self.active && self.pending.is_none()
    }
}

/// Debounced capture for the count and test pins.
pub struct PulseCapture {
    debounce_ms: u32,
    count: Option<PinTracker>,
    test: Option<PinTracker>,
    glitches: u32,
}

impl PulseCapture {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            count: None,
            test: None,
            glitches: 0,
        }
    }

    /// Take ownership of a pin.  Re-attaching a role resets its tracker.
    pub fn attach(&mut self, pin: Pin) {
        let tracker = Some(PinTracker::new(pin));
        match pin.role {
            PinRole::Count => self.count = tracker,
            PinRole::Test => self.test = tracker,
        }
    }

    /// Feed one raw edge.  Edges for unattached pins are ignored.
    pub fn feed(&mut self, edge: RawEdge) -> Option<PulseEvent> {
        let debounce_ms = self.debounce_ms;
        let tracker = self.tracker_mut(edge.role)?;
        match tracker.on_edge(edge.level, edge.at_ms, debounce_ms) {
            EdgeOutcome::Held => None,
            EdgeOutcome::Glitch => {
                self.glitches = self.glitches.saturating_add(1);
                log::debug!("capture: {:?} glitch at {} ms suppressed", edge.role, edge.at_ms);
                None
            }
            EdgeOutcome::Pulse(pulse) => Some(pulse),
        }
    }

    /// Confirm a pending edge on `role` that has outlasted the debounce
    /// interval, handing a completed pulse to `f`.  `now_ms` must be on
    /// the same clock as that pin's edges.
    pub fn settle(&mut self, role: PinRole, now_ms: u32, mut f: impl FnMut(PulseEvent)) {
        let debounce_ms = self.debounce_ms;
        if let Some(pulse) = self
            .tracker_mut(role)
            .and_then(|tracker| tracker.settle(now_ms, debounce_ms))
        {
            f(pulse);
        }
    }

    /// True when the pin is confirmed idle with no transition pending.
    pub fn is_idle(&self, role: PinRole) -> bool {
        self.tracker(role).is_none_or(PinTracker::is_idle)
    }

    /// Transition pairs suppressed by the debounce filter since boot.
    pub fn glitches(&self) -> u32 {
        self.glitches
    }

    pub fn clear_glitches(&mut self) {
        self.glitches = 0;
    }

    fn tracker(&self, role: PinRole) -> Option<&PinTracker> {
        match role {
            PinRole::Count => self.count.as_ref(),
            PinRole::Test => self.test.as_ref(),
        }
    }

    fn tracker_mut(&mut self, role: PinRole) -> Option<&mut PinTracker> {
        match role {
            PinRole::Count => self.count.as_mut(),
            PinRole::Test => self.test.as_mut(),
        }
    }
}
