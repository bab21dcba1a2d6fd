//! Core types for the packet simulation
//!
//! Packets are transient: they are launched along a route that was resolved
//! once at request time, advance a little every tick, and disappear the tick
//! they arrive.

use serde::{Deserialize, Serialize};

use lanlab_core::{DeviceId, PacketId, Route};

/// What a packet is carrying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PacketKind {
    /// Echo request from a ping
    Ping,
    /// One leg of the encryption handshake
    KeyExchange,
}

/// Per-packet lifecycle
///
/// `Active(hop i) -> Active(hop i+1) -> ... -> Arrived`. `Arrived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketStatus {
    Active,
    Arrived,
}

/// A unit of simulated traffic animated along a fixed route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub id: PacketId,
    pub source: DeviceId,
    pub destination: DeviceId,
    pub path: Route,
    /// Index of the cable currently being crossed (0-based)
    pub hop_index: usize,
    /// Progress along the current cable, below the segment threshold while active
    pub hop_progress: u32,
    pub kind: PacketKind,
    pub status: PacketStatus,
}

impl Packet {
    pub fn launch(id: PacketId, kind: PacketKind, path: Route) -> Self {
        Self {
            id,
            source: path.source(),
            destination: path.destination(),
            path,
            hop_index: 0,
            hop_progress: 0,
            kind,
            status: PacketStatus::Active,
        }
    }

    /// The cable currently being crossed, for rendering
    pub fn current_segment(&self) -> Option<(DeviceId, DeviceId)> {
        let hops = self.path.hops();
        match (hops.get(self.hop_index), hops.get(self.hop_index + 1)) {
            (Some(from), Some(to)) => Some((*from, *to)),
            _ => None,
        }
    }

    /// True while crossing the last cable of the route (or when there is none)
    pub fn is_on_final_hop(&self) -> bool {
        self.hop_index + 1 >= self.path.segment_count()
    }

    /// Move to `Arrived`; returns false if the packet had already arrived
    pub fn mark_arrived(&mut self) -> bool {
        match self.status {
            PacketStatus::Active => {
                self.status = PacketStatus::Arrived;
                true
            }
            PacketStatus::Arrived => false,
        }
    }
}

/// Evidence that a transient event actually happened
///
/// Set only by the packet clock, reset only when a mission is advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub ping_success: bool,
    pub encrypted_success: bool,
}

impl Flags {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Progress of the two-packet key exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandshakePhase {
    #[default]
    Idle,
    /// First packet launched; the reply leaves after `ack_in` more ticks
    Sent {
        initiator: DeviceId,
        responder: DeviceId,
        ack_in: u64,
    },
    /// Reply packet launched
    Acked,
}

/// A scheduled key-exchange reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAck {
    pub initiator: DeviceId,
    pub responder: DeviceId,
    /// Ticks left before the reply is launched
    pub ack_in: u64,
}

/// Things that happen during a clock tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClockEvent {
    /// A packet finished one cable and moved onto the next
    SegmentCompleted {
        packet: PacketId,
        hop_index: usize,
        tick: u64,
    },
    /// A packet reached its destination; carries the final packet state
    Arrived { packet: Packet, tick: u64 },
    /// The handshake reply packet was launched
    HandshakeAcked { packet: PacketId, tick: u64 },
}
