//! Bounded handoff rings between interrupt context and the main loop.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ sample timer │────▶│  BIN_RING (1500) │────▶│              │
//! └──────────────┘     └──────────────────┘     │  Main loop   │
//! ┌──────────────┐     ┌──────────────────┐     │  (consumer)  │
//! │ test GPIO ISR│────▶│  EDGE_RING (128) │────▶│              │
//! └──────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! Each ring is a `heapless::spsc::Queue` behind a
//! `critical_section::Mutex`; interrupts are masked only for the single
//! enqueue or dequeue.
//!
//! **Overflow policy: drop newest.**  When a ring is full the incoming item
//! is discarded and the ring's drop counter incremented.  Older items are
//! already timestamped and ordered; keeping them preserves the packets
//! that were in flight.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::spsc::Queue;

use super::RawEdge;

/// 15 s of 20 ms bins, doubled for a late poll.
pub const BIN_RING_CAP: usize = 1500;
pub const EDGE_RING_CAP: usize = 128;

/// Envelope bins written by the sampling timer.
pub static BIN_RING: SharedRing<u16, BIN_RING_CAP> = SharedRing::new();
/// Test-line transitions written by the GPIO ISR.
pub static EDGE_RING: SharedRing<RawEdge, EDGE_RING_CAP> = SharedRing::new();

/// Fixed-capacity FIFO that counts what it had to drop.
///
/// Holds at most `N - 1` items (one slot distinguishes full from empty).
pub struct CaptureRing<T, const N: usize> {
    queue: Queue<T, N>,
    dropped: u32,
}

impl<T, const N: usize> CaptureRing<T, N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            dropped: 0,
        }
    }

    /// Enqueue `item`.  Returns `false` if it was dropped.
    pub fn push(&mut self, item: T) -> bool {
        if self.queue.enqueue(item).is_ok() {
            true
        } else {
            self.dropped = self.dropped.wrapping_add(1);
            false
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.queue.dequeue()
    }

    /// Items dropped since boot (wrapping).
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<T, const N: usize> Default for CaptureRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`CaptureRing`] that can live in a `static` and be pushed from an ISR.
pub struct SharedRing<T, const N: usize>(Mutex<RefCell<CaptureRing<T, N>>>);

impl<T, const N: usize> SharedRing<T, N> {
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(CaptureRing::new())))
    }

    /// Safe to call from interrupt context.
    pub fn push(&self, item: T) -> bool {
        critical_section::with(|cs| self.0.borrow_ref_mut(cs).push(item))
    }

    /// Hand every queued item to `f` in FIFO order.  Interrupts are masked
    /// per item, never across `f`.
    pub fn drain(&self, mut f: impl FnMut(T)) {
        while let Some(item) = critical_section::with(|cs| self.0.borrow_ref_mut(cs).pop()) {
            f(item);
        }
    }

    pub fn dropped(&self) -> u32 {
        critical_section::with(|cs| self.0.borrow_ref(cs).dropped())
    }
}

impl<T, const N: usize> Default for SharedRing<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
