//! Hardware adapter — bridges the capture rings and the test line to
//! domain port traits.
//!
//! Owns the [`TestLine`] and reads the static rings filled by interrupt
//! context, exposing them through [`CaptureSource`] and [`SelfTestPort`].
//! This is the only module in the system the service reaches hardware
//! through.  On non-espidf targets, the underlying drivers use cfg-gated
//! simulation stubs.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{CaptureSource, SelfTestPort};
use crate::capture::queue::{BIN_RING, EDGE_RING};
use crate::capture::RawEdge;
use crate::drivers::test_pin::TestLine;

/// Concrete adapter over the ISR rings and the test line.
pub struct HardwareAdapter<P> {
    test_line: TestLine<P>,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(test_line: TestLine<P>) -> Self {
        Self { test_line }
    }
}

// ── CaptureSource implementation ──────────────────────────────

impl<P: OutputPin> CaptureSource for HardwareAdapter<P> {
    fn drain_bins(&mut self, f: impl FnMut(u16)) {
        BIN_RING.drain(f);
    }

    fn drain_edges(&mut self, f: impl FnMut(RawEdge)) {
        EDGE_RING.drain(f);
    }

    fn overflow_drops(&self) -> u32 {
        BIN_RING.dropped().wrapping_add(EDGE_RING.dropped())
    }
}

// ── SelfTestPort implementation ───────────────────────────────

impl<P: OutputPin> SelfTestPort for HardwareAdapter<P> {
    fn set_test_line(&mut self, asserted: bool) {
        self.test_line.set(asserted);
    }
}
