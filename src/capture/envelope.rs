//! Buzzer envelope detector.
//!
//! The vent unit's buzzer is a ~10 kHz tone.  The PCNT peripheral counts
//! its rising edges and the sampling timer latches the count every
//! `sample_period_ms` (one *bin*).  A bin with more than
//! `activity_threshold` edges means the buzzer was sounding.
//!
//! This detector turns the bin stream into level transitions of the
//! envelope.  Timestamps come from the bin index, not from when the main
//! loop happens to drain the ring, so a late drain does not stretch pulses.

use super::{PinRole, RawEdge};
use crate::config::CaptureConfig;

pub struct EnvelopeDetector {
    origin_ms: u32,
    period_ms: u32,
    threshold: u16,
    /// Index of the next bin to be consumed.
    next_bin: u32,
    active: bool,
}

impl EnvelopeDetector {
    pub fn new(cfg: &CaptureConfig) -> Self {
        Self {
            origin_ms: 0,
            period_ms: cfg.sample_period_ms,
            threshold: cfg.activity_threshold,
            next_bin: 0,
            active: false,
        }
    }

    /// Align bin 0 with the moment the sampling timer was started.
    pub fn start_at(&mut self, origin_ms: u32) {
        self.origin_ms = origin_ms;
        self.next_bin = 0;
        self.active = false;
    }

    /// Consume one bin.  Returns the envelope edge at the start of this
    /// bin, if the envelope changed.
    pub fn push_bin(&mut self, edges_in_bin: u16) -> Option<RawEdge> {
        let at_ms = self.bin_start_ms(self.next_bin);
        self.next_bin = self.next_bin.wrapping_add(1);

        let active = edges_in_bin > self.threshold;
        if active == self.active {
            return None;
        }
        self.active = active;
        Some(RawEdge {
            role: PinRole::Count,
            level: active,
            at_ms,
        })
    }

    /// Time covered by the bins consumed so far.
    pub fn consumed_until_ms(&self) -> u32 {
        self.bin_start_ms(self.next_bin)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn bin_start_ms(&self, bin: u32) -> u32 {
        self.origin_ms.wrapping_add(bin.wrapping_mul(self.period_ms))
    }
}
