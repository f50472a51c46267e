//! Fuzz target: envelope bins → debounce → framing → classification
//!
//! Drives arbitrary bin counts, test-line edges and loop timings through
//! the full service and asserts that it never panics and that counters
//! only ever account for packets it actually decoded.
//!
//! cargo fuzz run fuzz_capture_pipeline

#![no_main]

use dryervent::app::events::AppEvent;
use dryervent::app::ports::{CaptureSource, EventSink, SelfTestPort, SensorChannel};
use dryervent::app::service::DryerVentSensor;
use dryervent::capture::{PinRole, RawEdge};
use dryervent::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

struct Null;

impl SensorChannel for Null {
    fn publish_state(&mut self, _value: f32) {}
}

#[derive(Default)]
struct Feed {
    bins: Vec<u16>,
    edges: Vec<RawEdge>,
}

impl CaptureSource for Feed {
    fn drain_bins(&mut self, f: impl FnMut(u16)) {
        self.bins.drain(..).for_each(f);
    }

    fn drain_edges(&mut self, f: impl FnMut(RawEdge)) {
        self.edges.drain(..).for_each(f);
    }

    fn overflow_drops(&self) -> u32 {
        0
    }
}

impl SelfTestPort for Feed {
    fn set_test_line(&mut self, _asserted: bool) {}
}

#[derive(Default)]
struct Decoded(u32);

impl EventSink for Decoded {
    fn emit(&mut self, event: &AppEvent) {
        if matches!(event, AppEvent::PacketDecoded { .. }) {
            self.0 += 1;
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut dev: DryerVentSensor<Null> = DryerVentSensor::new(SystemConfig::default());
    dev.set_count_pin(2);
    dev.set_test_pin(15);
    let mut sink = Decoded::default();
    if dev.setup(0, &mut sink).is_err() {
        return;
    }

    let mut feed = Feed::default();
    let mut now: u32 = 0;
    for chunk in data.chunks(2) {
        let [op, arg] = [chunk[0], *chunk.get(1).unwrap_or(&0)];
        match op % 4 {
            0 | 1 => feed.bins.push(u16::from(arg)),
            2 => feed.edges.push(RawEdge {
                role: PinRole::Test,
                level: arg & 1 == 1,
                at_ms: now.wrapping_add(u32::from(arg >> 1)),
            }),
            _ => {
                now = now.wrapping_add(u32::from(arg) * 20);
                dev.process(now, &mut feed, &mut sink);
            }
        }
    }
    now = now.wrapping_add(60_000);
    let snap = dev.update(now, &mut feed, &mut sink).expect("started");
    assert_eq!(snap.total_packets(), sink.0);
});
