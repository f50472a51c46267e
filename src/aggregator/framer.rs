//! Packet framer — groups buzzer pulses into beep trains.
//!
//! A packet is every pulse up to the first idle gap longer than
//! `packet_gap_ms`.  The framer remembers only what the classifier needs:
//! how many pulses it saw and how long the final one lasted.

use crate::capture::{PinRole, PulseEvent};
use crate::classifier::PacketSignature;
use crate::config::FramingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    Idle,
    InPacket {
        pulses: u8,
        last_pulse_ms: u32,
        last_end_ms: u32,
    },
}

/// What a single pulse produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutput {
    /// A previous packet closed because this pulse came after the gap.
    pub closed: Option<PacketSignature>,
    /// The pulse was no longer than one blip.
    pub blip: bool,
}

pub struct PacketFramer {
    gap_ms: u32,
    blip_max_ms: u32,
    state: FrameState,
}

impl PacketFramer {
    pub fn new(cfg: &FramingConfig) -> Self {
        Self {
            gap_ms: cfg.packet_gap_ms,
            blip_max_ms: cfg.blip_max_ms,
            state: FrameState::Idle,
        }
    }

    /// Add a count-pin pulse to the current packet.
    pub fn on_pulse(&mut self, pulse: &PulseEvent) -> FrameOutput {
        let mut out = FrameOutput {
            closed: None,
            blip: pulse.duration_ms <= self.blip_max_ms,
        };

        let pulses = match self.state {
            FrameState::InPacket {
                pulses,
                last_end_ms,
                ..
            } if pulse.started_at_ms.wrapping_sub(last_end_ms) <= self.gap_ms => {
                pulses.saturating_add(1)
            }
            FrameState::InPacket { .. } => {
                out.closed = self.close();
                1
            }
            FrameState::Idle => 1,
        };

        self.state = FrameState::InPacket {
            pulses,
            last_pulse_ms: pulse.duration_ms,
            last_end_ms: pulse.ended_at_ms(),
        };
        out
    }

    /// Close the open packet once the line has been idle for longer than
    /// the gap.  `line_idle` must be false while a pulse may be in progress.
    pub fn poll(&mut self, now_ms: u32, line_idle: bool) -> Option<PacketSignature> {
        match self.state {
            FrameState::InPacket { last_end_ms, .. }
                if line_idle && now_ms.wrapping_sub(last_end_ms) > self.gap_ms =>
            {
                self.close()
            }
            _ => None,
        }
    }

    pub fn in_packet(&self) -> bool {
        matches!(self.state, FrameState::InPacket { .. })
    }

    fn close(&mut self) -> Option<PacketSignature> {
        let FrameState::InPacket {
            pulses,
            last_pulse_ms,
            ..
        } = core::mem::replace(&mut self.state, FrameState::Idle)
        else {
            return None;
        };
        Some(PacketSignature {
            pin: PinRole::Count,
            pulses,
            last_pulse_ms,
        })
    }
}
