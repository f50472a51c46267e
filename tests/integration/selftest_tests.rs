//! Scheduled and on-demand self-test, through the mock test line.

use dryervent::app::commands::AppCommand;
use dryervent::app::events::AppEvent;
use dryervent::classifier::PacketClass;
use dryervent::report::Channel;

use super::mock_hw::Bench;

/// Run to the first scheduled test (40 s after setup) and poll.
fn run_to_first_test(b: &mut Bench) {
    b.quiet(40_000);
    b.update();
    assert_eq!(b.hw.line, vec![true], "test line asserted when due");
}

#[test]
fn answered_test_passes() {
    let mut b = Bench::new();
    run_to_first_test(&mut b);

    // Line released after the pulse, then the test-line pulse is captured.
    b.quiet(100);
    assert_eq!(b.hw.line, vec![true, false]);
    assert!(b.dev.snapshot().selftest_in_progress);
    assert_eq!(b.dev.snapshot().count(PacketClass::SelfTest), 1);

    // Vent unit answers with a single nominal start beep.
    b.packet(1, 700);
    let snap = b.update().expect("started");
    assert!(!snap.selftest_in_progress);
    assert!(!snap.selftest_failed);
    assert_eq!(snap.selftests_passed, 1);
    assert_eq!(b.published_on(Channel::SelfTestCounter).last(), Some(&1.0));
    assert_eq!(b.published_on(Channel::SelfTest).last(), Some(&0.0));
    assert_eq!(
        b.sink.count(|e| matches!(e, AppEvent::SelfTestPassed { completed: 1 })),
        1
    );
}

#[test]
fn unanswered_test_fails_after_timeout() {
    let mut b = Bench::new();
    run_to_first_test(&mut b);
    b.quiet(100);
    assert!(b.dev.snapshot().selftest_in_progress);

    b.quiet(59_000);
    assert!(!b.dev.snapshot().selftest_failed);
    b.quiet(1_000);
    let snap = b.update().expect("started");
    assert!(snap.selftest_failed);
    assert!(!snap.selftest_in_progress);
    assert_eq!(b.published_on(Channel::SelfTest).last(), Some(&1.0));
    assert_eq!(b.sink.count(|e| matches!(e, AppEvent::SelfTestFailed)), 1);
}

#[test]
fn off_band_start_does_not_pass_test() {
    let mut b = Bench::new();
    run_to_first_test(&mut b);
    b.quiet(100);
    b.packet(1, 200);
    assert!(b.dev.snapshot().selftest_in_progress);
    assert_eq!(b.dev.snapshot().count(PacketClass::ShortStart), 1);
}

#[test]
fn on_demand_test() {
    let mut b = Bench::new();
    b.quiet(1_000);
    b.dev.handle_command(AppCommand::RunSelfTest, b.now, &mut b.hw);
    assert_eq!(b.hw.line, vec![true]);

    // A second request while pulsing is ignored.
    b.dev.handle_command(AppCommand::RunSelfTest, b.now, &mut b.hw);
    assert_eq!(b.hw.line, vec![true]);

    b.quiet(100);
    assert!(b.dev.snapshot().selftest_in_progress);
}

#[test]
fn next_test_scheduled_a_day_later() {
    let mut b = Bench::new();
    run_to_first_test(&mut b);
    assert_eq!(b.dev.next_selftest_ms(), Some(40_000 + 86_400_000));
}
