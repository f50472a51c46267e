//! DryerVent Firmware — Main Entry Point
//!
//! Hexagonal architecture with ISR capture rings and a cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          LogEventSink        LogChannel ×12   │
//! │  (CaptureSource+SelfTest) (EventSink)         (SensorChannel)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DryerVentSensor (pure logic)                │    │
//! │  │  capture · framing · classify · latches · self-test    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PCNT + esp_timer ──▶ BIN_RING      test GPIO ISR ──▶ EDGE_RING │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use dryervent::adapters::hardware::HardwareAdapter;
use dryervent::adapters::log_sink::{LogChannel, LogEventSink};
use dryervent::adapters::time::uptime_ms;
use dryervent::app::service::DryerVentSensor;
use dryervent::capture::PinRole;
use dryervent::config::SystemConfig;
use dryervent::drivers::test_pin::{GpioOutput, TestLine};
use dryervent::drivers::watchdog::Watchdog;
use dryervent::drivers::{hw_init, hw_timer, pcnt};
use dryervent::pins;
use dryervent::report::Channel;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  DryerVent v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Component ──────────────────────────────────────────
    let config = SystemConfig::default();
    let sample_period_ms = config.capture.sample_period_ms;
    let update_interval_ms = config.update_interval_ms;

    let mut sensor: DryerVentSensor<LogChannel> = DryerVentSensor::new(config);
    sensor.set_count_pin(pins::COUNT_GPIO);
    sensor.set_test_pin(pins::TEST_GPIO);
    for channel in Channel::ALL {
        sensor.set_channel(channel, LogChannel::new(channel));
    }

    // ── 3. Peripherals ────────────────────────────────────────
    let count_pin = sensor.pin(PinRole::Count).context("count pin not set")?;
    let test_pin = sensor.pin(PinRole::Test).context("test pin not set")?;
    hw_init::init_test_line(&test_pin).context("test line")?;
    pcnt::init(&count_pin, pins::PCNT_GLITCH_NS).context("pulse counter")?;

    let mut hw = HardwareAdapter::new(TestLine::new(GpioOutput::new(test_pin.gpio)));
    let mut log_sink = LogEventSink::new();

    // Bin 0 is aligned with the timer start.
    sensor
        .setup(uptime_ms(), &mut log_sink)
        .context("dryer vent sensor setup")?;
    hw_timer::start_sampling(sample_period_ms).context("sampling timer")?;

    let watchdog = Watchdog::default();
    info!("System ready. Entering main loop.");

    // ── 4. Main loop ──────────────────────────────────────────
    let mut last_update = uptime_ms();
    loop {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(sample_period_ms)));
        let now = uptime_ms();

        if now.wrapping_sub(last_update) >= update_interval_ms {
            last_update = now;
            sensor.update(now, &mut hw, &mut log_sink);
        } else {
            sensor.process(now, &mut hw, &mut log_sink);
        }

        watchdog.feed();
    }
}
