//! One-shot hardware peripheral initialization.
//!
//! Configures the self-test line as an open-drain input/output with an
//! edge interrupt, using raw ESP-IDF sys calls.  The buzzer line is
//! handed to the pulse counter in [`super::pcnt`].  Called once from
//! `main()` before the loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::capture::queue::EDGE_RING;
use crate::capture::Pin;
#[cfg(target_os = "espidf")]
use crate::capture::{EdgeMode, PinRole, RawEdge};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    PcntInitFailed(&'static str, i32),
    TimerInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::PcntInitFailed(step, rc) => write!(f, "PCNT {} failed (rc={})", step, rc),
            Self::TimerInitFailed(rc) => write!(f, "esp_timer setup failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

// ── Test line ─────────────────────────────────────────────────

/// Test line ISR: stamp the new level and queue it.  `arg` carries the
/// GPIO number.
#[cfg(target_os = "espidf")]
unsafe extern "C" fn test_line_isr(arg: *mut core::ffi::c_void) {
    let gpio = arg as usize as i32;
    // SAFETY: register reads; both are ISR-safe.
    let (level, now_us) = unsafe { (gpio_get_level(gpio) != 0, esp_timer_get_time()) };
    EDGE_RING.push(RawEdge {
        role: PinRole::Test,
        level,
        at_ms: (now_us / 1_000) as u32,
    });
}

#[cfg(target_os = "espidf")]
fn intr_type(edge: EdgeMode) -> gpio_int_type_t {
    match edge {
        EdgeMode::Rising => gpio_int_type_t_GPIO_INTR_POSEDGE,
        EdgeMode::Falling => gpio_int_type_t_GPIO_INTR_NEGEDGE,
        EdgeMode::Both => gpio_int_type_t_GPIO_INTR_ANYEDGE,
    }
}

/// Configure the test line as open drain, released (HIGH), and route its
/// edges to the capture ring.
#[cfg(target_os = "espidf")]
pub fn init_test_line(pin: &Pin) -> Result<(), HwInitError> {
    let gpio = pin.gpio;
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << gpio,
        mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: intr_type(pin.edge),
    };
    // SAFETY: called once from the main task before the loop starts. The
    // handler only touches the critical-section guarded EDGE_RING.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        gpio_set_level(gpio, 1);

        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        let ret = gpio_isr_handler_add(gpio, Some(test_line_isr), gpio as usize as *mut _);
        if ret != ESP_OK {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_intr_enable(gpio);
    }
    info!("hw_init: test line GPIO{} open-drain, {:?} edge ISR", gpio, pin.edge);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_test_line(pin: &Pin) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): test line GPIO{} ({:?} edges) not configured", pin.gpio, pin.edge);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to a pin configured in
    // init_test_line(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}
