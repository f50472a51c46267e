//! Packet aggregator — frames pulses, classifies packets, keeps counters
//! and derived states.
//!
//! ```text
//!  PulseEvent ──▶ PacketFramer ──▶ classify() ──▶ Counters
//!   (count pin)                         │
//!  PulseEvent ──────────────────────────┤          ┌─▶ overheat Latch
//!   (test pin)                          └──────────┼─▶ clog Latch
//!                                                  └─▶ SelfTestMonitor
//! ```
//!
//! State changes only on packet arrival, except for the cool-down and
//! self-test timeout, which [`Aggregator::tick`] evaluates.
//!
//! Count-pin pulses carry envelope time (bin index × sample period), so
//! the end-of-packet gap is measured on that clock too, in
//! [`Aggregator::close_idle_packet`].  Wall time only drives the
//! timeouts.

pub mod framer;
pub mod latch;
pub mod selftest;

use crate::app::events::{AppEvent, DerivedFlag};
use crate::app::ports::EventSink;
use crate::capture::{PinRole, PulseEvent};
use crate::classifier::{classify, ClassifierThresholds, PacketClass, PacketSignature};
use crate::config::SystemConfig;
use crate::report::ReportSnapshot;

use framer::PacketFramer;
use latch::{Latch, LatchChange};
use selftest::{SelfTestMonitor, SelfTestOutcome};

/// Packets seen per class since boot or the last clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    by_class: [u32; PacketClass::COUNT],
    blips: u32,
}

impl Counters {
    pub fn get(&self, class: PacketClass) -> u32 {
        self.by_class[class.index()]
    }

    pub fn by_class(&self) -> &[u32; PacketClass::COUNT] {
        &self.by_class
    }

    pub fn blips(&self) -> u32 {
        self.blips
    }

    pub fn total(&self) -> u32 {
        self.by_class.iter().fold(0u32, |acc, n| acc.wrapping_add(*n))
    }

    fn bump(&mut self, class: PacketClass) {
        let slot = &mut self.by_class[class.index()];
        *slot = slot.wrapping_add(1);
    }
}

pub struct Aggregator {
    thresholds: ClassifierThresholds,
    framer: PacketFramer,
    overheat: Latch,
    clog: Latch,
    selftest: SelfTestMonitor,
    counters: Counters,
}

impl Aggregator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            framer: PacketFramer::new(&config.framing),
            overheat: Latch::new(config.overheat),
            clog: Latch::new(config.clog),
            selftest: SelfTestMonitor::new(&config.selftest),
            counters: Counters::default(),
        }
    }

    /// Consume one debounced pulse.
    pub fn on_pulse(&mut self, pulse: PulseEvent, sink: &mut impl EventSink) {
        match pulse.role {
            PinRole::Test => {
                let sig = PacketSignature {
                    pin: PinRole::Test,
                    pulses: 1,
                    last_pulse_ms: pulse.duration_ms,
                };
                self.record(&sig, pulse.ended_at_ms(), sink);
            }
            PinRole::Count => {
                let out = self.framer.on_pulse(&pulse);
                if out.blip {
                    self.counters.blips = self.counters.blips.wrapping_add(1);
                }
                if let Some(sig) = out.closed {
                    self.record(&sig, pulse.started_at_ms, sink);
                }
            }
        }
    }

    /// Close a packet whose gap has elapsed.  `envelope_ms` is the end
    /// of the last consumed bin; `count_line_idle` must be false while a
    /// buzzer pulse may still be in progress.
    pub fn close_idle_packet(
        &mut self,
        envelope_ms: u32,
        count_line_idle: bool,
        sink: &mut impl EventSink,
    ) {
        if let Some(sig) = self.framer.poll(envelope_ms, count_line_idle) {
            self.record(&sig, envelope_ms, sink);
        }
    }

    /// Evaluate the latch cool-downs and the self-test timeout.
    pub fn tick(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        for (flag, latch) in [
            (DerivedFlag::Overheat, &mut self.overheat),
            (DerivedFlag::Clog, &mut self.clog),
        ] {
            if latch.tick(now_ms) == Some(LatchChange::Cleared) {
                log::info!("aggregator: {flag:?} cleared after cool-down");
                sink.emit(&AppEvent::StateChanged {
                    flag,
                    active: false,
                });
            }
        }

        if self.selftest.tick(now_ms) == Some(SelfTestOutcome::TimedOut) {
            log::warn!("aggregator: self test failed (no answer)");
            sink.emit(&AppEvent::SelfTestFailed);
        }
    }

    /// Classify a framed packet and apply it.
    pub fn record(
        &mut self,
        sig: &PacketSignature,
        at_ms: u32,
        sink: &mut impl EventSink,
    ) -> PacketClass {
        let class = classify(&self.thresholds, sig);
        self.counters.bump(class);
        log::debug!(
            "{} pulse packet, last {} ms ({})",
            sig.pulses,
            sig.last_pulse_ms,
            class.name()
        );
        sink.emit(&AppEvent::PacketDecoded {
            class,
            pulses: sig.pulses,
            last_pulse_ms: sig.last_pulse_ms,
        });

        let latch = if class.is_overheat() {
            Some((DerivedFlag::Overheat, &mut self.overheat))
        } else if class.is_clog() {
            Some((DerivedFlag::Clog, &mut self.clog))
        } else {
            None
        };
        if let Some((flag, latch)) = latch
            && latch.hit(at_ms) == Some(LatchChange::Set)
        {
            log::info!("aggregator: {flag:?} active");
            sink.emit(&AppEvent::StateChanged { flag, active: true });
        }

        match class {
            PacketClass::SelfTest => {
                if self.selftest.on_selftest(at_ms) == SelfTestOutcome::Restarted {
                    log::debug!("aggregator: self test restarted");
                }
                sink.emit(&AppEvent::SelfTestStarted);
            }
            PacketClass::Start => {
                if let Some(SelfTestOutcome::Passed { completed }) = self.selftest.on_start() {
                    log::info!("aggregator: self test passed ({completed} total)");
                    sink.emit(&AppEvent::SelfTestPassed { completed });
                }
            }
            _ => {}
        }
        class
    }

    /// Snapshot for the reporter.  Drop counters live in the capture layer
    /// and are passed in.
    pub fn snapshot(&self, debounce_drops: u32, overflow_drops: u32) -> ReportSnapshot {
        ReportSnapshot {
            counts: *self.counters.by_class(),
            blips: self.counters.blips(),
            selftests_passed: self.selftest.completed(),
            overheat: self.overheat.is_active(),
            clog: self.clog.is_active(),
            selftest_in_progress: self.selftest.in_progress(),
            selftest_failed: self.selftest.failed(),
            debounce_drops,
            overflow_drops,
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn overheat_active(&self) -> bool {
        self.overheat.is_active()
    }

    pub fn clog_active(&self) -> bool {
        self.clog.is_active()
    }

    pub fn selftest(&self) -> &SelfTestMonitor {
        &self.selftest
    }

    /// True while pulses are being grouped into a packet.
    pub fn in_packet(&self) -> bool {
        self.framer.in_packet()
    }

    /// Zero the counters.  Derived flags and an open packet are kept.
    pub fn clear_counters(&mut self) {
        self.counters = Counters::default();
        self.selftest.clear_completed();
    }
}
