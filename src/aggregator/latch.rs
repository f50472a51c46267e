//! Derived boolean state with confirm window and cool-down.
//!
//! Sets after `confirm_count` qualifying packets arrive within
//! `window_ms` of each other (inclusive); clears once `cooldown_ms` has
//! elapsed since the last qualifying packet (inclusive).

use heapless::HistoryBuffer;

use crate::config::{LatchConfig, MAX_CONFIRM_COUNT};

const WINDOW_CAP: usize = MAX_CONFIRM_COUNT as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchChange {
    Set,
    Cleared,
}

pub struct Latch {
    cfg: LatchConfig,
    /// Most recent hits; older ones are overwritten.
    hits: HistoryBuffer<u32, WINDOW_CAP>,
    active: bool,
    last_hit_ms: u32,
}

impl Latch {
    pub fn new(cfg: LatchConfig) -> Self {
        Self {
            cfg,
            hits: HistoryBuffer::new(),
            active: false,
            last_hit_ms: 0,
        }
    }

    /// Record a qualifying packet.
    pub fn hit(&mut self, now_ms: u32) -> Option<LatchChange> {
        self.hits.write(now_ms);
        self.last_hit_ms = now_ms;

        let in_window = self
            .hits
            .as_slice()
            .iter()
            .filter(|&&at| now_ms.wrapping_sub(at) <= self.cfg.window_ms)
            .count();
        if !self.active && in_window >= usize::from(self.cfg.confirm_count) {
            self.active = true;
            return Some(LatchChange::Set);
        }
        None
    }

    /// Evaluate the cool-down.
    pub fn tick(&mut self, now_ms: u32) -> Option<LatchChange> {
        if self.active && now_ms.wrapping_sub(self.last_hit_ms) >= self.cfg.cooldown_ms {
            self.active = false;
            self.hits.clear();
            return Some(LatchChange::Cleared);
        }
        None
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
