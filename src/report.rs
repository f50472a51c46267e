//! Polling reporter — channel table and report snapshot.
//!
//! The host registers up to twelve optional measurement channels.  Every
//! update interval a [`ReportSnapshot`] is taken and each registered
//! channel receives its value; unregistered channels are skipped.
//! Publishing reads the snapshot only, so repeating it without new
//! packets publishes identical values.

use crate::app::ports::SensorChannel;
use crate::classifier::PacketClass;

/// A published measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// 1 while overheat is active.
    Overheat,
    /// 1 while clog is active.
    Clog,
    /// 1 when the last self-test failed.
    SelfTest,
    /// Single-bin blips on the buzzer line.
    ShortPacket,
    ShortStartPacket,
    LongStartPacket,
    ShortClogPacket,
    LongClogPacket,
    ShortOverheatPacket,
    LongOverheatPacket,
    UnknownPacket,
    /// Self-tests the vent unit answered.
    SelfTestCounter,
}

impl Channel {
    pub const COUNT: usize = 12;

    /// Publish order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Overheat,
        Self::Clog,
        Self::SelfTest,
        Self::ShortPacket,
        Self::ShortStartPacket,
        Self::LongStartPacket,
        Self::ShortClogPacket,
        Self::LongClogPacket,
        Self::ShortOverheatPacket,
        Self::LongOverheatPacket,
        Self::UnknownPacket,
        Self::SelfTestCounter,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Configuration key of the channel on the host side.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Overheat => "overheat_sensor",
            Self::Clog => "clog_sensor",
            Self::SelfTest => "selftest_sensor",
            Self::ShortPacket => "short_packet_sensor",
            Self::ShortStartPacket => "short_start_packet",
            Self::LongStartPacket => "long_start_packet",
            Self::ShortClogPacket => "short_clog_packet",
            Self::LongClogPacket => "long_clog_packet",
            Self::ShortOverheatPacket => "short_overheat_packet",
            Self::LongOverheatPacket => "long_overheat_packet",
            Self::UnknownPacket => "unknown_packet_sensor",
            Self::SelfTestCounter => "selftest_counter",
        }
    }
}

/// Point-in-time view of counters and derived states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSnapshot {
    /// Packets per [`PacketClass`], indexed by [`PacketClass::index`].
    pub counts: [u32; PacketClass::COUNT],
    pub blips: u32,
    pub selftests_passed: u32,
    pub overheat: bool,
    pub clog: bool,
    pub selftest_in_progress: bool,
    pub selftest_failed: bool,
    /// Transition pairs rejected by the debounce filter.
    pub debounce_drops: u32,
    /// Items lost to full capture rings.
    pub overflow_drops: u32,
}

impl ReportSnapshot {
    pub fn count(&self, class: PacketClass) -> u32 {
        self.counts[class.index()]
    }

    /// Sum over every class.
    pub fn total_packets(&self) -> u32 {
        self.counts.iter().fold(0u32, |acc, n| acc.wrapping_add(*n))
    }

    /// Value published on `channel`.
    pub fn value(&self, channel: Channel) -> f32 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match channel {
            Channel::Overheat => flag(self.overheat),
            Channel::Clog => flag(self.clog),
            Channel::SelfTest => flag(self.selftest_failed),
            Channel::ShortPacket => self.blips as f32,
            Channel::ShortStartPacket => self.count(PacketClass::ShortStart) as f32,
            Channel::LongStartPacket => self.count(PacketClass::LongStart) as f32,
            Channel::ShortClogPacket => self.count(PacketClass::ShortClog) as f32,
            Channel::LongClogPacket => self.count(PacketClass::LongClog) as f32,
            Channel::ShortOverheatPacket => self.count(PacketClass::ShortOverheat) as f32,
            Channel::LongOverheatPacket => self.count(PacketClass::LongOverheat) as f32,
            Channel::UnknownPacket => self.count(PacketClass::Unknown) as f32,
            Channel::SelfTestCounter => self.selftests_passed as f32,
        }
    }
}

/// Optional handle per [`Channel`].
pub struct ChannelTable<S> {
    slots: [Option<S>; Channel::COUNT],
}

impl<S: SensorChannel> ChannelTable<S> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    /// Bind a handle; replaces any previous one.
    pub fn register(&mut self, channel: Channel, sensor: S) {
        if self.slots[channel.index()].replace(sensor).is_some() {
            log::warn!("report: {} re-registered", channel.key());
        }
    }

    pub fn registered(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Publish `snap` to every registered channel.  Returns how many
    /// channels were published.
    pub fn publish(&mut self, snap: &ReportSnapshot) -> usize {
        let mut published = 0;
        for channel in Channel::ALL {
            if let Some(sensor) = self.slots[channel.index()].as_mut() {
                sensor.publish_state(snap.value(channel));
                published += 1;
            }
        }
        published
    }
}

impl<S: SensorChannel> Default for ChannelTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(Channel, f32)>>>;

    struct LoggedChannel {
        channel: Channel,
        log: Log,
    }

    impl SensorChannel for LoggedChannel {
        fn publish_state(&mut self, value: f32) {
            self.log.borrow_mut().push((self.channel, value));
        }
    }

    fn logged(channel: Channel, log: &Log) -> LoggedChannel {
        LoggedChannel {
            channel,
            log: Rc::clone(log),
        }
    }

    fn sample() -> ReportSnapshot {
        let mut snap = ReportSnapshot::default();
        snap.counts[PacketClass::ShortClog.index()] = 2;
        snap.counts[PacketClass::LongOverheat.index()] = 1;
        snap.counts[PacketClass::Unknown.index()] = 4;
        snap.blips = 7;
        snap.selftests_passed = 3;
        snap.overheat = true;
        snap.selftest_failed = true;
        snap
    }

    #[test]
    fn channel_values() {
        let snap = sample();
        let cases = [
            (Channel::Overheat, 1.0),
            (Channel::Clog, 0.0),
            (Channel::SelfTest, 1.0),
            (Channel::ShortPacket, 7.0),
            (Channel::ShortStartPacket, 0.0),
            (Channel::ShortClogPacket, 2.0),
            (Channel::LongOverheatPacket, 1.0),
            (Channel::UnknownPacket, 4.0),
            (Channel::SelfTestCounter, 3.0),
        ];
        for (channel, want) in cases {
            assert_eq!(snap.value(channel), want, "{}", channel.key());
        }
        assert_eq!(snap.total_packets(), 7);
    }

    #[test]
    fn only_registered_channels_publish() {
        let log = Log::default();
        let mut table = ChannelTable::new();
        table.register(Channel::Overheat, logged(Channel::Overheat, &log));
        table.register(Channel::UnknownPacket, logged(Channel::UnknownPacket, &log));

        assert_eq!(table.publish(&sample()), 2);
        assert_eq!(
            *log.borrow(),
            vec![(Channel::Overheat, 1.0), (Channel::UnknownPacket, 4.0)]
        );
        assert_eq!(table.registered(), 2);
    }

    #[test]
    fn empty_table_publishes_nothing() {
        let mut table: ChannelTable<LoggedChannel> = ChannelTable::new();
        assert_eq!(table.publish(&sample()), 0);
        assert_eq!(table.registered(), 0);
    }

    #[test]
    fn publish_is_idempotent() {
        let log = Log::default();
        let mut table = ChannelTable::new();
        for channel in Channel::ALL {
            table.register(channel, logged(channel, &log));
        }
        let snap = sample();
        table.publish(&snap);
        let first = log.borrow().clone();
        log.borrow_mut().clear();
        table.publish(&snap);
        assert_eq!(*log.borrow(), first);
        assert_eq!(first.len(), Channel::COUNT);
    }

    #[test]
    fn keys_are_unique() {
        for (i, a) in Channel::ALL.iter().enumerate() {
            assert_eq!(a.index(), i);
            for b in &Channel::ALL[i + 1..] {
                assert_ne!(a.key(), b.key());
            }
        }
    }
}
