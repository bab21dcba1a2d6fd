//! Packet simulation clock
//!
//! Implements a fixed-timestep simulation:
//! - Every tick adds a constant amount of progress to each active packet
//! - A packet that completes a cable either moves onto the next one or,
//!   on its final cable, arrives and fires its completion effect once
//! - The encryption handshake reply is launched by the clock itself after a
//!   fixed number of ticks
//!
//! The packet set is rebuilt every tick and published as a fresh
//! `Arc<[Packet]>`, so a reader holding an earlier set keeps a stable view.

use std::sync::Arc;

use tracing::{debug, info, trace};

use lanlab_core::{DeviceId, IdAllocator, PacketId, Route};

use crate::config::ClockConfig;
use crate::types::{ClockEvent, Flags, HandshakePhase, Packet, PacketKind, PendingAck};

/// Clock statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockStats {
    pub ticks: u64,
    pub packets_launched: u64,
    pub segments_completed: u64,
    pub packets_arrived: u64,
    pub pings_answered: u64,
    pub key_exchanges_completed: u64,
}

/// Drives every in-flight packet along its route
#[derive(Debug, Clone)]
pub struct PacketClock {
    config: ClockConfig,
    packets: Arc<[Packet]>,
    /// Replies still waiting to be launched, oldest first
    pending_acks: Vec<PendingAck>,
    /// At least one reply has been launched since the last clear
    acked: bool,
    ids: IdAllocator,
    /// Current simulation tick
    tick: u64,
    pub stats: ClockStats,
}

impl PacketClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            packets: Arc::from(Vec::new()),
            pending_acks: Vec::new(),
            acked: false,
            ids: IdAllocator::new(),
            tick: 0,
            stats: ClockStats::default(),
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Put a packet on the wire along a route resolved by the caller
    pub fn launch(&mut self, kind: PacketKind, route: Route) -> PacketId {
        let id = self.ids.next_packet();
        let packet = Packet::launch(id, kind, route);
        debug!(packet = %id, ?kind, from = %packet.source, to = %packet.destination,
               segments = packet.path.segment_count(), "Packet launched");

        let mut next = self.packets.to_vec();
        next.push(packet);
        self.packets = next.into();
        self.stats.packets_launched += 1;
        id
    }

    /// Send the first key-exchange packet and schedule the reply
    pub fn begin_handshake(&mut self, initiator: DeviceId, responder: DeviceId) -> PacketId {
        let id = self.launch(PacketKind::KeyExchange, Route::direct(initiator, responder));
        self.pending_acks.push(PendingAck {
            initiator,
            responder,
            ack_in: self.config.handshake_ack_delay_ticks,
        });
        info!(%initiator, %responder, pending = self.pending_acks.len(), "Handshake started");
        id
    }

    /// Advance the simulation by one tick
    ///
    /// Arrival effects: a ping sets `ping_success` (and `encrypted_success`
    /// when `encrypted` is on); a key exchange sets `encrypted_success`.
    pub fn step(&mut self, encrypted: bool, flags: &mut Flags) -> Vec<ClockEvent> {
        self.tick += 1;
        self.stats.ticks += 1;
        trace!("=== Tick {} ===", self.tick);

        let mut events = Vec::new();

        // 1. Advance packets against the set published last tick
        let current = Arc::clone(&self.packets);
        let mut next = Vec::with_capacity(current.len());
        for packet in current.iter() {
            let mut packet = packet.clone();

            // A single-device route has no cable to cross, so it arrives this
            // tick instead of after a full segment of progress
            if packet.path.segment_count() == 0 {
                self.arrive(packet, encrypted, flags, &mut events);
                continue;
            }

            packet.hop_progress += self.config.progress_per_tick.max(1);
            if packet.hop_progress < self.config.segment_threshold {
                next.push(packet);
                continue;
            }

            self.stats.segments_completed += 1;
            if packet.is_on_final_hop() {
                self.arrive(packet, encrypted, flags, &mut events);
            } else {
                packet.hop_index += 1;
                packet.hop_progress = 0;
                trace!(packet = %packet.id, hop = packet.hop_index, "Segment completed");
                events.push(ClockEvent::SegmentCompleted {
                    packet: packet.id,
                    hop_index: packet.hop_index,
                    tick: self.tick,
                });
                next.push(packet);
            }
        }
        self.packets = next.into();

        // 2. Handshake countdown; the reply starts moving next tick
        self.process_handshake(&mut events);

        events
    }

    /// Run for a specific number of ticks, collecting every event
    pub fn run_ticks(&mut self, ticks: u64, encrypted: bool, flags: &mut Flags) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.step(encrypted, flags));
        }
        events
    }

    fn arrive(&mut self, mut packet: Packet, encrypted: bool, flags: &mut Flags, events: &mut Vec<ClockEvent>) {
        if !packet.mark_arrived() {
            return;
        }

        match packet.kind {
            PacketKind::Ping => {
                flags.ping_success = true;
                if encrypted {
                    flags.encrypted_success = true;
                }
                self.stats.pings_answered += 1;
            }
            PacketKind::KeyExchange => {
                flags.encrypted_success = true;
                self.stats.key_exchanges_completed += 1;
            }
        }
        self.stats.packets_arrived += 1;

        debug!(packet = %packet.id, kind = ?packet.kind, to = %packet.destination, tick = self.tick, "Packet arrived");
        events.push(ClockEvent::Arrived { packet, tick: self.tick });
    }

    fn process_handshake(&mut self, events: &mut Vec<ClockEvent>) {
        let mut due = Vec::new();
        self.pending_acks.retain_mut(|ack| {
            if ack.ack_in > 1 {
                ack.ack_in -= 1;
                true
            } else {
                due.push(*ack);
                false
            }
        });

        for PendingAck { initiator, responder, .. } in due {
            let id = self.launch(PacketKind::KeyExchange, Route::direct(responder, initiator));
            self.acked = true;
            info!(%initiator, %responder, "Handshake acknowledged");
            events.push(ClockEvent::HandshakeAcked { packet: id, tick: self.tick });
        }
    }

    /// The packet set published by the last tick or launch
    pub fn packets(&self) -> Arc<[Packet]> {
        Arc::clone(&self.packets)
    }

    /// Borrowed view of the published packet set
    pub fn in_flight(&self) -> &[Packet] {
        &self.packets
    }

    pub fn active_count(&self) -> usize {
        self.packets.len()
    }

    /// Phase of the oldest pending handshake, or `Acked` once every reply is out
    pub fn handshake(&self) -> HandshakePhase {
        match self.pending_acks.first() {
            Some(ack) => HandshakePhase::Sent {
                initiator: ack.initiator,
                responder: ack.responder,
                ack_in: ack.ack_in,
            },
            None if self.acked => HandshakePhase::Acked,
            None => HandshakePhase::Idle,
        }
    }

    pub fn pending_acks(&self) -> &[PendingAck] {
        &self.pending_acks
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// No packets in flight and no handshake reply pending
    pub fn is_idle(&self) -> bool {
        self.packets.is_empty() && self.pending_acks.is_empty()
    }

    /// Drop every packet and pending handshake
    pub fn clear(&mut self) {
        self.packets = Arc::from(Vec::new());
        self.pending_acks.clear();
        self.acked = false;
    }

    /// Get a summary of the current state
    pub fn state_summary(&self) -> String {
        format!(
            "Tick {}: {} in flight, {} arrived, handshake {:?}",
            self.tick, self.active_count(), self.stats.packets_arrived, self.handshake()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PacketStatus;

    fn route(raw: &[u64]) -> Route {
        Route::new(raw.iter().copied().map(DeviceId).collect()).unwrap()
    }

    fn arrivals(events: &[ClockEvent]) -> Vec<&Packet> {
        events
            .iter()
            .filter_map(|e| match e {
                ClockEvent::Arrived { packet, .. } => Some(packet),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_three_device_ping_timing() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[1, 2, 3]));

        // First cable takes 50 ticks
        let events = clock.run_ticks(49, false, &mut flags);
        assert!(events.is_empty());
        let events = clock.step(false, &mut flags);
        assert!(matches!(events[..], [ClockEvent::SegmentCompleted { hop_index: 1, .. }]));
        assert!(!flags.ping_success);

        // Second cable takes another 50
        let events = clock.run_ticks(49, false, &mut flags);
        assert!(arrivals(&events).is_empty());
        let events = clock.step(false, &mut flags);
        let arrived = arrivals(&events);
        assert_eq!(arrived.len(), 1);
        assert_eq!(arrived[0].status, PacketStatus::Arrived);
        assert!(flags.ping_success);
        assert!(!flags.encrypted_success);
        assert_eq!(clock.active_count(), 0);
        assert_eq!(clock.stats.segments_completed, 2);
    }

    #[test]
    fn test_arrival_fires_once() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[1, 2]));

        let events = clock.run_ticks(500, false, &mut flags);
        assert_eq!(arrivals(&events).len(), 1);
        assert_eq!(clock.stats.packets_arrived, 1);
        assert_eq!(clock.stats.pings_answered, 1);
    }

    #[test]
    fn test_segment_completions_before_arrival() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[1, 2, 3, 4, 5]));

        let events = clock.run_ticks(1000, false, &mut flags);
        let transitions = events
            .iter()
            .filter(|e| matches!(e, ClockEvent::SegmentCompleted { .. }))
            .count();
        assert_eq!(transitions, 3);
        assert_eq!(clock.stats.segments_completed, 4);
        assert_eq!(arrivals(&events).len(), 1);
    }

    #[test]
    fn test_self_route_arrives_next_tick() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[7]));

        let events = clock.step(false, &mut flags);
        assert_eq!(arrivals(&events).len(), 1);
        assert!(flags.ping_success);
        assert_eq!(clock.stats.segments_completed, 0);
    }

    #[test]
    fn test_encrypted_ping_sets_both_flags() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[1, 2]));
        clock.run_ticks(50, true, &mut flags);
        assert!(flags.ping_success);
        assert!(flags.encrypted_success);
    }

    #[test]
    fn test_key_exchange_sets_only_encrypted() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::KeyExchange, route(&[1, 2]));
        clock.run_ticks(50, false, &mut flags);
        assert!(!flags.ping_success);
        assert!(flags.encrypted_success);
    }

    #[test]
    fn test_handshake_reply_after_delay() {
        let config = ClockConfig {
            handshake_ack_delay_ticks: 10,
            ..Default::default()
        };
        let mut clock = PacketClock::new(config);
        let mut flags = Flags::default();
        clock.begin_handshake(DeviceId(1), DeviceId(2));

        let events = clock.run_ticks(9, false, &mut flags);
        assert!(events.is_empty());
        assert!(matches!(clock.handshake(), HandshakePhase::Sent { ack_in: 1, .. }));

        let events = clock.step(false, &mut flags);
        assert!(matches!(events[..], [ClockEvent::HandshakeAcked { .. }]));
        assert_eq!(clock.handshake(), HandshakePhase::Acked);
        assert_eq!(clock.active_count(), 2);

        let reply = &clock.packets()[1];
        assert_eq!(reply.source, DeviceId(2));
        assert_eq!(reply.destination, DeviceId(1));
        assert_eq!(reply.hop_progress, 0);

        let events = clock.run_ticks(200, false, &mut flags);
        assert_eq!(arrivals(&events).len(), 2);
        assert!(clock.is_idle());
        assert_eq!(clock.stats.key_exchanges_completed, 2);
    }

    #[test]
    fn test_overlapping_handshakes_each_get_a_reply() {
        let config = ClockConfig {
            handshake_ack_delay_ticks: 30,
            ..Default::default()
        };
        let mut clock = PacketClock::new(config);
        let mut flags = Flags::default();
        clock.begin_handshake(DeviceId(1), DeviceId(2));
        clock.run_ticks(20, false, &mut flags);
        clock.begin_handshake(DeviceId(1), DeviceId(2));
        assert_eq!(clock.pending_acks().len(), 2);
        assert!(matches!(clock.handshake(), HandshakePhase::Sent { ack_in: 10, .. }));

        let events = clock.run_ticks(10, false, &mut flags);
        assert_eq!(events.iter().filter(|e| matches!(e, ClockEvent::HandshakeAcked { tick: 30, .. })).count(), 1);
        assert_eq!(clock.pending_acks().len(), 1);

        let events = clock.run_ticks(20, false, &mut flags);
        assert_eq!(events.iter().filter(|e| matches!(e, ClockEvent::HandshakeAcked { tick: 50, .. })).count(), 1);
        assert_eq!(clock.handshake(), HandshakePhase::Acked);

        clock.run_ticks(200, false, &mut flags);
        assert!(clock.is_idle());
        assert_eq!(clock.stats.packets_launched, 4);
        assert_eq!(clock.stats.key_exchanges_completed, 4);
    }

    #[test]
    fn test_zero_progress_still_moves() {
        let config = ClockConfig {
            progress_per_tick: 0,
            segment_threshold: 10,
            ..Default::default()
        };
        let mut clock = PacketClock::new(config);
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[1, 2]));

        let events = clock.run_ticks(10, false, &mut flags);
        assert_eq!(arrivals(&events).len(), 1);
        assert!(clock.is_idle());
    }

    #[test]
    fn test_published_set_is_stable() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        clock.launch(PacketKind::Ping, route(&[1, 2]));

        let before = clock.packets();
        clock.step(false, &mut flags);
        let after = clock.packets();

        assert_eq!(before[0].hop_progress, 0);
        assert_eq!(after[0].hop_progress, 2);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_packets_are_independent() {
        let mut clock = PacketClock::new(ClockConfig::default());
        let mut flags = Flags::default();
        let long = clock.launch(PacketKind::Ping, route(&[1, 2, 3, 4]));
        clock.run_ticks(25, false, &mut flags);
        let short = clock.launch(PacketKind::Ping, route(&[5, 6]));

        let events = clock.run_ticks(50, false, &mut flags);
        let arrived: Vec<PacketId> = arrivals(&events).iter().map(|p| p.id).collect();
        assert_eq!(arrived, vec![short]);

        let remaining = clock.packets();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, long);
        assert_eq!(remaining[0].hop_index, 1);
        assert_eq!(remaining[0].hop_progress, 50);
    }

    #[test]
    fn test_clear() {
        let mut clock = PacketClock::new(ClockConfig::default());
        clock.begin_handshake(DeviceId(1), DeviceId(2));
        assert!(!clock.is_idle());
        clock.clear();
        assert!(clock.is_idle());
    }
}
