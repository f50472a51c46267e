//! End-to-end tests for `DryerVentSensor`: buzzer bins in, counters,
//! flags and events out.

use dryervent::app::commands::AppCommand;
use dryervent::app::events::{AppEvent, DerivedFlag};
use dryervent::app::service::DryerVentSensor;
use dryervent::classifier::PacketClass;
use dryervent::config::SystemConfig;
use dryervent::error::{ConfigError, Error};
use dryervent::report::Channel;

use super::mock_hw::{Bench, RecordingChannel, RecordingSink, ACTIVE_BIN};

fn decoded(b: &Bench) -> Vec<PacketClass> {
    b.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PacketDecoded { class, .. } => Some(*class),
            _ => None,
        })
        .collect()
}

#[test]
fn each_packet_shape_is_classified() {
    let mut b = Bench::new();
    let cases = [
        (1, 700, PacketClass::Start),
        (1, 200, PacketClass::ShortStart),
        (1, 1_200, PacketClass::LongStart),
        (3, 100, PacketClass::Clog),
        (3, 20, PacketClass::ShortClog),
        (3, 200, PacketClass::LongClog),
        (5, 100, PacketClass::Overheat),
        (5, 20, PacketClass::ShortOverheat),
        (5, 300, PacketClass::LongOverheat),
        (2, 100, PacketClass::Unknown),
    ];
    for (pulses, last_ms, _) in cases {
        b.packet(pulses, last_ms);
    }
    let want: Vec<PacketClass> = cases.iter().map(|c| c.2).collect();
    assert_eq!(decoded(&b), want);

    let snap = b.dev.snapshot();
    assert_eq!(snap.total_packets(), cases.len() as u32);
    // The 20 ms final beeps were single-bin blips.
    assert_eq!(snap.blips, 2);
}

#[test]
fn packet_waits_for_the_gap() {
    let mut b = Bench::new();
    b.beep(100);
    b.quiet(200);
    b.beep(100);
    b.quiet(1_000);
    assert!(decoded(&b).is_empty(), "gap of exactly 1000 ms keeps the packet open");
    b.quiet(20);
    assert_eq!(decoded(&b), vec![PacketClass::Unknown]);
}

#[test]
fn late_wakeup_keeps_packet_whole() {
    let mut b = Bench::new();
    b.queue_bin(ACTIVE_BIN);
    for _ in 0..50 {
        b.queue_bin(0);
    }
    // Wall clock is 1010 ms past the beep, the stored bins only 1000 ms.
    b.process_late(10);
    assert!(decoded(&b).is_empty());

    b.queue_bin(ACTIVE_BIN);
    for _ in 0..80 {
        b.queue_bin(0);
    }
    b.process_late(0);
    assert_eq!(decoded(&b), vec![PacketClass::Unknown]);
}

#[test]
fn lost_bins_do_not_split_packets() {
    let mut b = Bench::new();
    b.beep(100);
    b.lose_bins(60);
    b.quiet(200);
    assert!(decoded(&b).is_empty(), "gap measured on stored bins");
    b.beep(100);
    b.quiet(1_200);
    assert_eq!(decoded(&b), vec![PacketClass::Unknown]);
    assert_eq!(b.dev.snapshot().overflow_drops, 60);
}

#[test]
fn unconfigured_channels_are_skipped() {
    let mut b = Bench::with(SystemConfig::default(), 0, |dev, log| {
        dev.set_overheat_sensor(RecordingChannel::new(Channel::Overheat, log));
    });

    b.packet(3, 20);
    let snap = b.update().expect("started");

    assert_eq!(snap.count(PacketClass::ShortClog), 1);
    assert!(snap.clog);
    assert!(b.published_on(Channel::Clog).is_empty());
    assert!(b.published_on(Channel::ShortClogPacket).is_empty());
    assert_eq!(b.published_on(Channel::Overheat), vec![0.0]);
    assert_eq!(b.published.borrow().len(), 1);
}

#[test]
fn overheat_sets_then_clears_at_cooldown() {
    let mut cfg = SystemConfig::default();
    cfg.overheat.cooldown_ms = 10_000;
    let mut b = Bench::with(cfg, 0, |_, _| {});

    b.packet(5, 100);
    assert!(b.dev.snapshot().overheat);
    let set_at = b
        .sink
        .events
        .iter()
        .position(|e| {
            matches!(
                e,
                AppEvent::StateChanged {
                    flag: DerivedFlag::Overheat,
                    active: true
                }
            )
        })
        .expect("overheat set");
    assert!(set_at > 0);

    // The packet was recorded when its gap elapsed; wait out the cool-down.
    b.quiet(8_000);
    assert!(b.dev.snapshot().overheat);
    b.quiet(3_000);
    assert!(!b.dev.snapshot().overheat);
    assert_eq!(
        b.sink.count(|e| matches!(
            e,
            AppEvent::StateChanged {
                flag: DerivedFlag::Overheat,
                active: false
            }
        )),
        1
    );
}

#[test]
fn confirm_count_needs_repeated_packets() {
    let mut cfg = SystemConfig::default();
    cfg.clog.confirm_count = 2;
    let mut b = Bench::with(cfg, 0, |_, _| {});

    b.packet(3, 100);
    assert!(!b.dev.snapshot().clog);
    b.packet(3, 100);
    assert!(b.dev.snapshot().clog);
}

#[test]
fn debounce_rejects_glitches_on_test_line() {
    let mut b = Bench::new();
    b.hw.edges.push(dryervent::capture::RawEdge {
        role: dryervent::capture::PinRole::Test,
        level: false,
        at_ms: 10,
    });
    b.hw.edges.push(dryervent::capture::RawEdge {
        role: dryervent::capture::PinRole::Test,
        level: true,
        at_ms: 12,
    });
    b.quiet(100);
    let snap = b.dev.snapshot();
    assert_eq!(snap.total_packets(), 0);
    assert_eq!(snap.debounce_drops, 1);
    assert!(!snap.selftest_in_progress);
}

#[test]
fn overflow_is_counted_and_reported() {
    let mut b = Bench::new();
    b.hw.drops = 3;
    b.quiet(20);
    assert_eq!(b.sink.count(|e| matches!(e, AppEvent::CaptureOverflow { dropped: 3 })), 1);
    b.quiet(20);
    assert_eq!(
        b.sink.count(|e| matches!(e, AppEvent::CaptureOverflow { .. })),
        1,
        "reported once per change"
    );
    assert_eq!(b.dev.snapshot().overflow_drops, 3);
}

#[test]
fn clear_counters_keeps_flags() {
    let mut b = Bench::new();
    b.packet(5, 100);
    b.hw.drops = 2;
    b.quiet(20);
    b.dev.handle_command(AppCommand::ClearCounters, b.now, &mut b.hw);

    let snap = b.dev.snapshot();
    assert_eq!(snap.total_packets(), 0);
    assert_eq!(snap.overflow_drops, 0);
    assert!(snap.overheat);
}

#[test]
fn timestamps_wrap_mid_packet() {
    let mut b = Bench::with(SystemConfig::default(), u32::MAX - 250, |_, _| {});
    b.packet(3, 100);
    assert_eq!(decoded(&b), vec![PacketClass::Clog]);
}

#[test]
fn setup_fails_without_pins() {
    let mut dev: DryerVentSensor<RecordingChannel> = DryerVentSensor::new(SystemConfig::default());
    let mut sink = RecordingSink::default();
    assert_eq!(
        dev.setup(0, &mut sink),
        Err(Error::Config(ConfigError::MissingCountPin))
    );
    assert!(sink.events.is_empty());
}

#[test]
fn setup_rejects_invalid_config() {
    let mut cfg = SystemConfig::default();
    cfg.update_interval_ms = 0;
    let mut dev: DryerVentSensor<RecordingChannel> = DryerVentSensor::new(cfg);
    dev.set_count_pin(2);
    dev.set_test_pin(15);
    assert_eq!(
        dev.setup(0, &mut RecordingSink::default()),
        Err(Error::Config(ConfigError::InvalidUpdateInterval))
    );
}
