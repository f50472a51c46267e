//! Pulse counter on the buzzer line.
//!
//! One PCNT unit counts the edges of the ~10 kHz buzzer tone selected by
//! the count pin's [`EdgeMode`](crate::capture::EdgeMode).  The
//! sampling timer reads and clears it every bin; see
//! [`hw_timer`](super::hw_timer).  A glitch filter rejects ringing on the
//! divider tap.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicPtr, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use super::hw_init::HwInitError;
use crate::capture::Pin;
#[cfg(target_os = "espidf")]
use crate::capture::EdgeMode;

/// Count limit.  The timer clears the unit long before this is reached.
#[cfg(target_os = "espidf")]
const HIGH_LIMIT: i32 = i16::MAX as i32;

#[cfg(target_os = "espidf")]
static UNIT: AtomicPtr<pcnt_unit_t> = AtomicPtr::new(core::ptr::null_mut());

#[cfg(target_os = "espidf")]
fn check(step: &'static str, ret: esp_err_t) -> Result<(), HwInitError> {
    if ret == ESP_OK {
        Ok(())
    } else {
        Err(HwInitError::PcntInitFailed(step, ret))
    }
}

/// (rising, falling) edge actions counting the edges `edge` selects.
#[cfg(target_os = "espidf")]
fn edge_actions(edge: EdgeMode) -> (pcnt_channel_edge_action_t, pcnt_channel_edge_action_t) {
    let inc = pcnt_channel_edge_action_t_PCNT_CHANNEL_EDGE_ACTION_INCREASE;
    let hold = pcnt_channel_edge_action_t_PCNT_CHANNEL_EDGE_ACTION_HOLD;
    match edge {
        EdgeMode::Rising => (inc, hold),
        EdgeMode::Falling => (hold, inc),
        EdgeMode::Both => (inc, inc),
    }
}

/// Create, configure and start the counter on the buzzer pin.
#[cfg(target_os = "espidf")]
pub fn init(pin: &Pin, glitch_ns: u32) -> Result<(), HwInitError> {
    let gpio = pin.gpio;
    let unit_cfg = pcnt_unit_config_t {
        low_limit: -1,
        high_limit: HIGH_LIMIT,
        ..Default::default()
    };
    let chan_cfg = pcnt_chan_config_t {
        edge_gpio_num: gpio,
        level_gpio_num: -1,
        ..Default::default()
    };
    let filter = pcnt_glitch_filter_config_t {
        max_glitch_ns: glitch_ns,
    };

    let (on_rising, on_falling) = edge_actions(pin.edge);

    let mut unit: pcnt_unit_handle_t = core::ptr::null_mut();
    let mut chan: pcnt_channel_handle_t = core::ptr::null_mut();
    // SAFETY: called once from the main task before the sampling timer
    // starts; handles are written before UNIT is published.
    unsafe {
        check("new_unit", pcnt_new_unit(&unit_cfg, &mut unit))?;
        check("glitch_filter", pcnt_unit_set_glitch_filter(unit, &filter))?;
        check("new_channel", pcnt_new_channel(unit, &chan_cfg, &mut chan))?;
        check(
            "edge_action",
            pcnt_channel_set_edge_action(chan, on_rising, on_falling),
        )?;
        check("enable", pcnt_unit_enable(unit))?;
        check("clear", pcnt_unit_clear_count(unit))?;
        check("start", pcnt_unit_start(unit))?;
    }
    UNIT.store(unit, Ordering::Release);
    log::info!("pcnt: GPIO{} {:?} edges, glitch filter {} ns", gpio, pin.edge, glitch_ns);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init(pin: &Pin, glitch_ns: u32) -> Result<(), HwInitError> {
    log::info!(
        "pcnt(sim): GPIO{} ({:?} edges, {} ns filter) not counted",
        pin.gpio,
        pin.edge,
        glitch_ns
    );
    Ok(())
}

/// Edges since the previous call.  Zero before [`init`].
#[cfg(target_os = "espidf")]
pub fn take_count() -> u16 {
    let unit = UNIT.load(Ordering::Acquire);
    if unit.is_null() {
        return 0;
    }
    let mut count: i32 = 0;
    // SAFETY: `unit` is a started PCNT unit; get/clear are safe from the
    // esp_timer task.
    unsafe {
        if pcnt_unit_get_count(unit, &mut count) != ESP_OK {
            return 0;
        }
        pcnt_unit_clear_count(unit);
    }
    count.clamp(0, i32::from(u16::MAX)) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn take_count() -> u16 {
    0
}
