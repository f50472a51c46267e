//! Polling reporter behaviour seen from the host channels.

use dryervent::app::events::AppEvent;
use dryervent::app::service::DryerVentSensor;
use dryervent::config::SystemConfig;
use dryervent::report::Channel;

use super::mock_hw::{Bench, MockHw, RecordingChannel, RecordingSink};

#[test]
fn every_registered_channel_published_in_order() {
    let mut b = Bench::new();
    b.update();
    let published: Vec<Channel> = b.published.borrow().iter().map(|(c, _)| *c).collect();
    assert_eq!(published, Channel::ALL.to_vec());
}

#[test]
fn repeated_updates_publish_identical_values() {
    let mut b = Bench::new();
    b.packet(3, 20);
    b.packet(2, 100);

    let first = b.update().expect("started");
    let first_values = b.published.borrow().clone();
    b.published.borrow_mut().clear();

    let second = b.update().expect("started");
    assert_eq!(first, second);
    assert_eq!(*b.published.borrow(), first_values);
}

#[test]
fn counter_channels_carry_counts() {
    let mut b = Bench::new();
    b.packet(3, 20);
    b.packet(3, 20);
    b.packet(5, 300);
    b.packet(4, 100);
    b.update();

    assert_eq!(b.published_on(Channel::ShortClogPacket), vec![2.0]);
    assert_eq!(b.published_on(Channel::LongOverheatPacket), vec![1.0]);
    assert_eq!(b.published_on(Channel::UnknownPacket), vec![1.0]);
    assert_eq!(b.published_on(Channel::ShortPacket), vec![2.0]);
    assert_eq!(b.published_on(Channel::Clog), vec![1.0]);
    assert_eq!(b.published_on(Channel::Overheat), vec![1.0]);
}

#[test]
fn update_emits_report_event() {
    let mut b = Bench::new();
    let snap = b.update().expect("started");
    let reported = b.sink.events.iter().rev().find_map(|e| match e {
        AppEvent::Report(r) => Some(*r),
        _ => None,
    });
    assert_eq!(reported, Some(snap));
}

#[test]
fn update_before_setup_publishes_nothing() {
    let published = super::mock_hw::PublishLog::default();
    let mut dev: DryerVentSensor<RecordingChannel> = DryerVentSensor::new(SystemConfig::default());
    dev.set_overheat_sensor(RecordingChannel::new(Channel::Overheat, &published));

    let snap = dev.update(15_000, &mut MockHw::default(), &mut RecordingSink::default());
    assert!(snap.is_none());
    assert!(published.borrow().is_empty());
}
