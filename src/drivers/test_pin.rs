//! Self-test line driver.
//!
//! The vent unit's test input is active LOW and shared with its front
//! panel button, so the line is open-drain: asserting pulls it LOW,
//! releasing lets the pull-up take it HIGH.  [`TestLine`] works over any
//! `embedded-hal` [`OutputPin`]; [`GpioOutput`] is the raw-GPIO pin used
//! on the device.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::hw_init;

/// Open-drain self-test output.
pub struct TestLine<P> {
    pin: P,
    asserted: bool,
}

impl<P: OutputPin> TestLine<P> {
    /// Wrap `pin` and release the line.
    pub fn new(mut pin: P) -> Self {
        if pin.set_high().is_err() {
            log::warn!("test_pin: initial release failed");
        }
        Self {
            pin,
            asserted: false,
        }
    }

    pub fn set(&mut self, asserted: bool) {
        let res = if asserted {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        match res {
            Ok(()) => self.asserted = asserted,
            Err(e) => log::warn!("test_pin: write failed: {:?}", e),
        }
    }

    pub fn is_asserted(&self) -> bool {
        self.asserted
    }
}

/// Raw GPIO configured by [`hw_init::init_test_line`].
///
/// Off target there is no ISR, so each write is echoed into the edge ring
/// the way the interrupt would record it.
pub struct GpioOutput {
    gpio: i32,
}

impl GpioOutput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl GpioOutput {
    #[cfg(target_os = "espidf")]
    fn write(&mut self, high: bool) {
        hw_init::gpio_write(self.gpio, high);
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, high: bool) {
        use crate::capture::queue::EDGE_RING;
        use crate::capture::{PinRole, RawEdge};

        hw_init::gpio_write(self.gpio, high);
        EDGE_RING.push(RawEdge {
            role: PinRole::Test,
            level: high,
            at_ms: crate::adapters::time::uptime_ms(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorded(Vec<bool>);

    impl ErrorType for Recorded {
        type Error = Infallible;
    }

    impl OutputPin for Recorded {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.push(true);
            Ok(())
        }
    }

    #[test]
    fn released_on_construction_and_active_low() {
        let mut line = TestLine::new(Recorded::default());
        assert!(!line.is_asserted());
        line.set(true);
        assert!(line.is_asserted());
        line.set(false);
        assert_eq!(line.pin.0, vec![true, false, true]);
    }
}
