//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured
//! application events to the ESP-IDF logger (which goes to UART / USB-CDC
//! in production).  [`LogChannel`] is a [`SensorChannel`] that logs the
//! values the reporter publishes, for boards without a host bridge.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, SensorChannel};
use crate::report::Channel;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                count_pin,
                test_pin,
            } => {
                info!("START | count=GPIO{} test=GPIO{}", count_pin, test_pin);
            }
            AppEvent::PacketDecoded {
                class,
                pulses,
                last_pulse_ms,
            } => {
                debug!("PKT   | {} pulse(s), last {} ms -> {}", pulses, last_pulse_ms, class.name());
            }
            AppEvent::StateChanged { flag, active } => {
                info!("STATE | {:?} {}", flag, if *active { "ACTIVE" } else { "clear" });
            }
            AppEvent::SelfTestStarted => {
                info!("TEST  | started");
            }
            AppEvent::SelfTestPassed { completed } => {
                info!("TEST  | passed (#{})", completed);
            }
            AppEvent::SelfTestFailed => {
                warn!("TEST  | FAILED, no answer from vent unit");
            }
            AppEvent::CaptureOverflow { dropped } => {
                warn!("CAPT  | {} item(s) dropped", dropped);
            }
            AppEvent::Report(r) => {
                info!(
                    "REPORT | packets={} blips={} | overheat={} clog={} | \
                     test: failed={} running={} passed={} | drops: debounce={} overflow={}",
                    r.total_packets(),
                    r.blips,
                    r.overheat,
                    r.clog,
                    r.selftest_failed,
                    r.selftest_in_progress,
                    r.selftests_passed,
                    r.debounce_drops,
                    r.overflow_drops,
                );
            }
        }
    }
}

/// Measurement channel that writes each published value to the log.
pub struct LogChannel {
    channel: Channel,
}

impl LogChannel {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl SensorChannel for LogChannel {
    fn publish_state(&mut self, value: f32) {
        debug!("{} = {}", self.channel.key(), value);
    }
}
