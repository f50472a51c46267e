//! Self-test tracking and scheduling.
//!
//! Pulling the test line LOW makes the vent unit answer with a single
//! start beep.  The monitor sees both halves: the test-line pulse
//! (`SelfTest` class) opens a test, and the next `Start` packet closes it
//! as passed.  No answer within `timeout_ms` marks the test failed.

use crate::config::SelfTestConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestState {
    Idle,
    InProgress { since_ms: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestOutcome {
    Started,
    Passed { completed: u32 },
    /// Restarted while a test was already in progress.
    Restarted,
    TimedOut,
}

pub struct SelfTestMonitor {
    timeout_ms: u32,
    state: TestState,
    completed: u32,
    failed: bool,
}

impl SelfTestMonitor {
    pub fn new(cfg: &SelfTestConfig) -> Self {
        Self {
            timeout_ms: cfg.timeout_ms,
            state: TestState::Idle,
            completed: 0,
            failed: false,
        }
    }

    /// A test-line pulse was captured.
    pub fn on_selftest(&mut self, now_ms: u32) -> SelfTestOutcome {
        let was_running = self.in_progress();
        self.state = TestState::InProgress { since_ms: now_ms };
        if was_running {
            SelfTestOutcome::Restarted
        } else {
            SelfTestOutcome::Started
        }
    }

    /// A nominal start packet arrived.  Only meaningful during a test.
    pub fn on_start(&mut self) -> Option<SelfTestOutcome> {
        if !self.in_progress() {
            return None;
        }
        self.state = TestState::Idle;
        self.failed = false;
        self.completed = self.completed.wrapping_add(1);
        Some(SelfTestOutcome::Passed {
            completed: self.completed,
        })
    }

    pub fn tick(&mut self, now_ms: u32) -> Option<SelfTestOutcome> {
        match self.state {
            TestState::InProgress { since_ms } if now_ms.wrapping_sub(since_ms) >= self.timeout_ms => {
                self.state = TestState::Idle;
                self.failed = true;
                Some(SelfTestOutcome::TimedOut)
            }
            _ => None,
        }
    }

    pub fn in_progress(&self) -> bool {
        matches!(self.state, TestState::InProgress { .. })
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn clear_completed(&mut self) {
        self.completed = 0;
    }
}

/// Deadline clock for scheduled self-tests.
pub struct SelfTestScheduler {
    period_ms: u32,
    next_due_ms: Option<u32>,
}

impl SelfTestScheduler {
    pub fn new() -> Self {
        Self {
            period_ms: 0,
            next_due_ms: None,
        }
    }

    /// Arm the schedule: first test `first_ms` after `now_ms`.
    pub fn start(&mut self, now_ms: u32, cfg: &SelfTestConfig) {
        self.period_ms = cfg.period_ms;
        self.next_due_ms = Some(now_ms.wrapping_add(cfg.first_ms));
    }

    /// True once per period when a test is due.  The next deadline is
    /// counted from `now_ms` so a late poll does not cause a burst.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        // Signed distance handles the u32 wrap (~49.7 days).
        if (now_ms.wrapping_sub(due) as i32) < 0 {
            return false;
        }
        self.next_due_ms = Some(now_ms.wrapping_add(self.period_ms));
        true
    }

    pub fn next_due_ms(&self) -> Option<u32> {
        self.next_due_ms
    }
}

impl Default for SelfTestScheduler {
    fn default() -> Self {
        Self::new()
    }
}
