//! Mock hardware for integration tests.
//!
//! [`MockHw`] stands in for the ISR rings and the test line; [`Bench`]
//! drives a [`DryerVentSensor`] bin by bin the way the sampling timer and
//! main loop would, so tests describe buzzer activity in milliseconds.

use std::cell::RefCell;
use std::rc::Rc;

use dryervent::app::events::AppEvent;
use dryervent::app::ports::{CaptureSource, EventSink, SelfTestPort, SensorChannel};
use dryervent::app::service::DryerVentSensor;
use dryervent::capture::{PinRole, RawEdge};
use dryervent::config::SystemConfig;
use dryervent::report::{Channel, ReportSnapshot};

/// PCNT edges in a bin while the buzzer sounds (~10 kHz for 20 ms).
pub const ACTIVE_BIN: u16 = 200;
pub const BIN_MS: u32 = 20;

// ── MockHw ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockHw {
    pub bins: Vec<u16>,
    pub edges: Vec<RawEdge>,
    pub drops: u32,
    /// Test-line writes, `true` = asserted.
    pub line: Vec<bool>,
    /// Timestamp given to echoed test-line edges.
    pub now: u32,
}

impl CaptureSource for MockHw {
    fn drain_bins(&mut self, f: impl FnMut(u16)) {
        self.bins.drain(..).for_each(f);
    }

    fn drain_edges(&mut self, f: impl FnMut(RawEdge)) {
        self.edges.drain(..).for_each(f);
    }

    fn overflow_drops(&self) -> u32 {
        self.drops
    }
}

impl SelfTestPort for MockHw {
    fn set_test_line(&mut self, asserted: bool) {
        self.line.push(asserted);
        // Open drain: the input follows the output.
        self.edges.push(RawEdge {
            role: PinRole::Test,
            level: !asserted,
            at_ms: self.now,
        });
    }
}

// ── Channels and sinks ────────────────────────────────────────

pub type PublishLog = Rc<RefCell<Vec<(Channel, f32)>>>;

pub struct RecordingChannel {
    channel: Channel,
    log: PublishLog,
}

impl RecordingChannel {
    pub fn new(channel: Channel, log: &PublishLog) -> Self {
        Self {
            channel,
            log: Rc::clone(log),
        }
    }
}

impl SensorChannel for RecordingChannel {
    fn publish_state(&mut self, value: f32) {
        self.log.borrow_mut().push((self.channel, value));
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Bench ─────────────────────────────────────────────────────

pub type Device = DryerVentSensor<RecordingChannel>;

pub struct Bench {
    pub dev: Device,
    pub hw: MockHw,
    pub sink: RecordingSink,
    pub published: PublishLog,
    /// End of the last bin pushed.
    pub now: u32,
}

#[allow(dead_code)]
impl Bench {
    /// Default config, pins 2/15, every channel registered, started at 0.
    pub fn new() -> Self {
        Self::with(SystemConfig::default(), 0, |dev, log| {
            for channel in Channel::ALL {
                dev.set_channel(channel, RecordingChannel::new(channel, log));
            }
        })
    }

    /// Build, let `configure` register channels, then `setup()` at `start_ms`.
    pub fn with(
        config: SystemConfig,
        start_ms: u32,
        configure: impl FnOnce(&mut Device, &PublishLog),
    ) -> Self {
        let published = PublishLog::default();
        let mut dev = DryerVentSensor::new(config);
        dev.set_count_pin(2);
        dev.set_test_pin(15);
        configure(&mut dev, &published);

        let mut sink = RecordingSink::default();
        dev.setup(start_ms, &mut sink).expect("setup");
        Self {
            dev,
            hw: MockHw {
                now: start_ms,
                ..MockHw::default()
            },
            sink,
            published,
            now: start_ms,
        }
    }

    /// Push one bin and run the main-loop step at its end.
    pub fn bin(&mut self, edges: u16) {
        self.hw.bins.push(edges);
        self.now = self.now.wrapping_add(BIN_MS);
        self.hw.now = self.now;
        self.dev.process(self.now, &mut self.hw, &mut self.sink);
    }

    /// Queue one bin without running the loop, as when the timer fires
    /// between two loop wakeups.
    pub fn queue_bin(&mut self, edges: u16) {
        self.hw.bins.push(edges);
        self.now = self.now.wrapping_add(BIN_MS);
    }

    /// Run the loop step `late_ms` into the bin after the last one queued,
    /// before the timer has stored it.
    pub fn process_late(&mut self, late_ms: u32) {
        let at = self.now.wrapping_add(late_ms);
        self.hw.now = at;
        self.dev.process(at, &mut self.hw, &mut self.sink);
    }

    /// Lose `n` bins to a full ring: wall time moves on, nothing is queued.
    pub fn lose_bins(&mut self, n: u32) {
        self.now = self.now.wrapping_add(n * BIN_MS);
        self.hw.drops += n;
    }

    pub fn quiet(&mut self, ms: u32) {
        for _ in 0..ms / BIN_MS {
            self.bin(0);
        }
    }

    pub fn beep(&mut self, ms: u32) {
        for _ in 0..ms / BIN_MS {
            self.bin(ACTIVE_BIN);
        }
    }

    /// A train of `pulses` beeps, the last lasting `last_ms`, followed by
    /// enough silence to close the packet.
    pub fn packet(&mut self, pulses: u8, last_ms: u32) {
        for _ in 1..pulses {
            self.beep(100);
            self.quiet(200);
        }
        self.beep(last_ms);
        self.quiet(1_200);
    }

    pub fn update(&mut self) -> Option<ReportSnapshot> {
        self.hw.now = self.now;
        self.dev.update(self.now, &mut self.hw, &mut self.sink)
    }

    /// Values published on `channel`, oldest first.
    pub fn published_on(&self, channel: Channel) -> Vec<f32> {
        self.published
            .borrow()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, v)| *v)
            .collect()
    }
}
