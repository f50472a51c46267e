//! Peripheral drivers: pulse counter, sampling timer, test line, watchdog.

pub mod hw_init;
pub mod hw_timer;
pub mod pcnt;
pub mod test_pin;
pub mod watchdog;
