//! Application service — the hexagonal core.
//!
//! [`DryerVentSensor`] owns the capture pipeline, the packet aggregator,
//! the self-test scheduler and the channel table.  It exposes the host
//! API (pin and channel setters, `setup`, `update`) plus the main-loop
//! `process` step.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  CaptureSource ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                    │        DryerVentSensor        │
//!   SelfTestPort ◀── │ capture · aggregate · report  │ ──▶ SensorChannel ×12
//!                    └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::aggregator::selftest::SelfTestScheduler;
use crate::aggregator::Aggregator;
use crate::capture::envelope::EnvelopeDetector;
use crate::capture::{Pin, PinRole, PulseCapture};
use crate::config::SystemConfig;
use crate::error::{ConfigError, Error, Result};
use crate::report::{Channel, ChannelTable, ReportSnapshot};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{CaptureSource, EventSink, SelfTestPort, SensorChannel};

// ───────────────────────────────────────────────────────────────
// DryerVentSensor
// ───────────────────────────────────────────────────────────────

pub struct DryerVentSensor<S> {
    config: SystemConfig,
    capture: PulseCapture,
    envelope: EnvelopeDetector,
    aggregator: Aggregator,
    scheduler: SelfTestScheduler,
    channels: ChannelTable<S>,
    /// When the asserted test line must be released.
    test_release_at: Option<u32>,
    started: bool,
    /// Ring drop total last seen from the capture source.
    overflow_seen: u32,
    /// Ring drop total at the last counter clear.
    overflow_base: u32,
}

impl<S: SensorChannel> DryerVentSensor<S> {
    /// Construct the component.  Nothing runs until [`setup`](Self::setup).
    pub fn new(config: SystemConfig) -> Self {
        Self {
            capture: PulseCapture::new(config.capture.debounce_ms),
            envelope: EnvelopeDetector::new(&config.capture),
            aggregator: Aggregator::new(&config),
            scheduler: SelfTestScheduler::new(),
            channels: ChannelTable::new(),
            test_release_at: None,
            started: false,
            overflow_seen: 0,
            overflow_base: 0,
            config,
        }
    }

    // ── Pins ──────────────────────────────────────────────────

    pub fn set_count_pin(&mut self, gpio: i32) {
        if self.started {
            warn!("set_count_pin after setup ignored");
            return;
        }
        self.config.count_pin = Some(gpio);
    }

    pub fn set_test_pin(&mut self, gpio: i32) {
        if self.started {
            warn!("set_test_pin after setup ignored");
            return;
        }
        self.config.test_pin = Some(gpio);
    }

    /// The pin monitored for `role`, as the peripherals must configure it.
    pub fn pin(&self, role: PinRole) -> Option<Pin> {
        match role {
            PinRole::Count => self.config.count_pin.map(Pin::count),
            PinRole::Test => self.config.test_pin.map(Pin::test),
        }
    }

    // ── Channels ──────────────────────────────────────────────

    pub fn set_channel(&mut self, channel: Channel, sensor: S) {
        self.channels.register(channel, sensor);
    }

    pub fn set_overheat_sensor(&mut self, sensor: S) {
        self.set_channel(Channel::Overheat, sensor);
    }

    pub fn set_clog_sensor(&mut self, sensor: S) {
        self.set_channel(Channel::Clog, sensor);
    }

    pub fn set_selftest_sensor(&mut self, sensor: S) {
        self.set_channel(Channel::SelfTest, sensor);
    }

    pub fn set_short_packet_sensor(&mut self, sensor: S) {
        self.set_channel(Channel::ShortPacket, sensor);
    }

    pub fn set_short_start_packet(&mut self, sensor: S) {
        self.set_channel(Channel::ShortStartPacket, sensor);
    }

    pub fn set_long_start_packet(&mut self, sensor: S) {
        self.set_channel(Channel::LongStartPacket, sensor);
    }

    pub fn set_short_clog_packet(&mut self, sensor: S) {
        self.set_channel(Channel::ShortClogPacket, sensor);
    }

    pub fn set_long_clog_packet(&mut self, sensor: S) {
        self.set_channel(Channel::LongClogPacket, sensor);
    }

    pub fn set_short_overheat_packet(&mut self, sensor: S) {
        self.set_channel(Channel::ShortOverheatPacket, sensor);
    }

    pub fn set_long_overheat_packet(&mut self, sensor: S) {
        self.set_channel(Channel::LongOverheatPacket, sensor);
    }

    pub fn set_unknown_packet_sensor(&mut self, sensor: S) {
        self.set_channel(Channel::UnknownPacket, sensor);
    }

    pub fn set_selftest_counter(&mut self, sensor: S) {
        self.set_channel(Channel::SelfTestCounter, sensor);
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate configuration, attach the pins and arm the self-test
    /// schedule.  `now_ms` must be the moment the sampling timer starts.
    pub fn setup(&mut self, now_ms: u32, sink: &mut impl EventSink) -> Result<()> {
        if self.started {
            return Err(Error::Init("setup called twice"));
        }
        let count_pin = self.config.count_pin.ok_or(ConfigError::MissingCountPin)?;
        let test_pin = self.config.test_pin.ok_or(ConfigError::MissingTestPin)?;
        if count_pin == test_pin {
            return Err(ConfigError::PinConflict(count_pin).into());
        }
        self.config.validate()?;

        self.capture.attach(Pin::count(count_pin));
        self.capture.attach(Pin::test(test_pin));
        self.envelope.start_at(now_ms);
        self.scheduler.start(now_ms, &self.config.selftest);
        self.started = true;

        info!(
            "dryervent: count GPIO{count_pin}, test GPIO{test_pin}, {} channel(s), update every {} ms",
            self.channels.registered(),
            self.config.update_interval_ms
        );
        sink.emit(&AppEvent::Started {
            count_pin,
            test_pin,
        });
        Ok(())
    }

    // ── Per-loop orchestration ────────────────────────────────

    /// Drain capture, classify and aggregate.  Call every sample period.
    ///
    /// `hw` implements both [`CaptureSource`] and [`SelfTestPort`]; the
    /// test line is released from here once its pulse has elapsed.
    pub fn process(
        &mut self,
        now_ms: u32,
        hw: &mut (impl CaptureSource + SelfTestPort),
        sink: &mut impl EventSink,
    ) {
        if !self.started {
            return;
        }

        // 1. Release the test line once its pulse has elapsed
        if let Some(at) = self.test_release_at
            && (now_ms.wrapping_sub(at) as i32) >= 0
        {
            hw.set_test_line(false);
            self.test_release_at = None;
        }

        // 2. Test-line transitions, then the buzzer envelope
        let capture = &mut self.capture;
        let aggregator = &mut self.aggregator;
        let envelope = &mut self.envelope;
        hw.drain_edges(|edge| {
            if let Some(pulse) = capture.feed(edge) {
                aggregator.on_pulse(pulse, sink);
            }
        });
        hw.drain_bins(|bin| {
            if let Some(edge) = envelope.push_bin(bin)
                && let Some(pulse) = capture.feed(edge)
            {
                aggregator.on_pulse(pulse, sink);
            }
        });

        // 3. Confirm pending trailing edges and close finished packets.
        //    Buzzer timing is on the bin clock, the test line on wall time.
        let envelope_ms = envelope.consumed_until_ms();
        capture.settle(PinRole::Count, envelope_ms, |pulse| aggregator.on_pulse(pulse, sink));
        capture.settle(PinRole::Test, now_ms, |pulse| aggregator.on_pulse(pulse, sink));
        let line_idle = capture.is_idle(PinRole::Count);
        aggregator.close_idle_packet(envelope_ms, line_idle, sink);
        aggregator.tick(now_ms, sink);

        // 4. Surface ring overflow
        let drops = hw.overflow_drops();
        if drops != self.overflow_seen {
            let dropped = drops.wrapping_sub(self.overflow_seen);
            warn!("capture: rings full, {dropped} item(s) dropped");
            sink.emit(&AppEvent::CaptureOverflow { dropped });
            self.overflow_seen = drops;
        }
    }

    /// Periodic poll: process, run the self-test schedule, publish every
    /// registered channel.  Returns the published snapshot, or `None`
    /// before [`setup`](Self::setup).
    pub fn update(
        &mut self,
        now_ms: u32,
        hw: &mut (impl CaptureSource + SelfTestPort),
        sink: &mut impl EventSink,
    ) -> Option<ReportSnapshot> {
        if !self.started {
            warn!("update before setup; nothing published");
            return None;
        }
        self.process(now_ms, hw, sink);

        if self.scheduler.poll(now_ms) {
            self.start_selftest(now_ms, hw);
        }

        let snap = self.snapshot();
        let published = self.channels.publish(&snap);
        debug!(
            "report: {published} channel(s), {} packet(s), overheat={} clog={}",
            snap.total_packets(),
            snap.overheat,
            snap.clog
        );
        sink.emit(&AppEvent::Report(snap));
        Some(snap)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(&mut self, cmd: AppCommand, now_ms: u32, port: &mut impl SelfTestPort) {
        match cmd {
            AppCommand::ClearCounters => {
                self.aggregator.clear_counters();
                self.capture.clear_glitches();
                self.overflow_base = self.overflow_seen;
                info!("counters cleared");
            }
            AppCommand::RunSelfTest => {
                if self.started {
                    self.start_selftest(now_ms, port);
                } else {
                    warn!("self test requested before setup");
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current counters and derived states.  Read-only.
    pub fn snapshot(&self) -> ReportSnapshot {
        self.aggregator.snapshot(
            self.capture.glitches(),
            self.overflow_seen.wrapping_sub(self.overflow_base),
        )
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Deadline of the next scheduled self-test.
    pub fn next_selftest_ms(&self) -> Option<u32> {
        self.scheduler.next_due_ms()
    }

    /// True while the test line is held low.
    pub fn test_line_asserted(&self) -> bool {
        self.test_release_at.is_some()
    }

    // ── Internal ──────────────────────────────────────────────

    fn start_selftest(&mut self, now_ms: u32, port: &mut impl SelfTestPort) {
        if self.test_release_at.is_some() {
            debug!("self test already pulsing");
            return;
        }
        info!("starting self test");
        port.set_test_line(true);
        self.test_release_at = Some(now_ms.wrapping_add(self.config.selftest.pulse_ms));
    }
}
