//! Default GPIO assignments for the dryer vent interface board.
//!
//! The host glue normally supplies both pins through `set_count_pin` /
//! `set_test_pin`; the firmware binary passes these, which match the
//! interface board wiring.

// ---------------------------------------------------------------------------
// Vent unit buzzer (sense)
// ---------------------------------------------------------------------------

/// Buzzer drive line, tapped through a divider.  Counted by PCNT unit 0.
pub const COUNT_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Vent unit test button (open-drain, active LOW)
// ---------------------------------------------------------------------------

/// Pulled LOW to start the unit's self-test.  Also sensed so that manual
/// presses of the test button are seen.
pub const TEST_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Pulse counter
// ---------------------------------------------------------------------------

/// Glitch filter for the pulse counter.  500 ns is a hundredth of the
/// ~10 kHz buzzer's half period.
pub const PCNT_GLITCH_NS: u32 = 500;

// ~10 kHz tone: keep the filter far below its 50 µs half period, and
// within the PCNT limit of 1023 APB cycles at 80 MHz.
const _: () = assert!(PCNT_GLITCH_NS * 100 <= 50_000);
const _: () = assert!(PCNT_GLITCH_NS <= 1_023 * 1_000 / 80);
const _: () = assert!(COUNT_GPIO != TEST_GPIO);
