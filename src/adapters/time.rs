//! Monotonic millisecond clock.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` from the
//!   first call, for host-side simulation.
//!
//! Timestamps are truncated to `u32` and wrap after ~49.7 days; every
//! consumer compares them with `wrapping_sub`.

/// Milliseconds since boot (wrapping).
#[cfg(target_os = "espidf")]
pub fn uptime_ms() -> u32 {
    // SAFETY: reads the RTC-backed system timer; callable from any context.
    ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
}

/// Milliseconds since the first call (wrapping).
#[cfg(not(target_os = "espidf"))]
pub fn uptime_ms() -> u32 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_millis() as u32
}
