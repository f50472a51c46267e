//! Sampling timer using ESP-IDF's esp_timer API.
//!
//! A periodic timer latches the buzzer pulse count once per bin and
//! pushes it into [`BIN_RING`].  The callback runs in the esp_timer task
//! (not ISR), and only touches the PCNT unit and the ring.
//!
//! On simulation targets nothing is started; bins are injected by tests.

use super::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::capture::queue::BIN_RING;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sample_tick_cb(_arg: *mut core::ffi::c_void) {
    BIN_RING.push(super::pcnt::take_count());
}

/// Start latching the pulse counter every `period_ms`.  The timer runs
/// for the life of the firmware.
#[cfg(target_os = "espidf")]
pub fn start_sampling(period_ms: u32) -> Result<(), HwInitError> {
    let args = esp_timer_create_args_t {
        callback: Some(sample_tick_cb),
        arg: core::ptr::null_mut(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: c"sample".as_ptr(),
        skip_unhandled_events: false,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();
    // SAFETY: called once from the main task; the callback only calls
    // ISR-safe ring and PCNT functions.
    unsafe {
        let ret = esp_timer_create(&args, &mut handle);
        if ret != ESP_OK {
            return Err(HwInitError::TimerInitFailed(ret));
        }
        let ret = esp_timer_start_periodic(handle, u64::from(period_ms) * 1_000);
        if ret != ESP_OK {
            esp_timer_delete(handle);
            return Err(HwInitError::TimerInitFailed(ret));
        }
    }
    log::info!("hw_timer: sampling every {} ms", period_ms);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_sampling(period_ms: u32) -> Result<(), HwInitError> {
    log::info!("hw_timer(sim): sampling timer ({} ms) not started", period_ms);
    Ok(())
}
