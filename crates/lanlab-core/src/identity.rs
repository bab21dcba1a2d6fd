//! Identifiers for devices, connections and packets
//!
//! Ids are allocated from a monotonic counter and never reused within the
//! lifetime of an allocator, so a stale id can never alias a newer object.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Unique identifier for a device in the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "dev-{}", self.0)
    }
}

/// Unique identifier for a cable between two devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

impl Display for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

/// Unique identifier for an in-flight packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PacketId(pub u64);

impl Display for PacketId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "pkt-{}", self.0)
    }
}

/// Monotonic id source
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub fn next_device(&mut self) -> DeviceId {
        DeviceId(self.bump())
    }

    pub fn next_connection(&mut self) -> ConnectionId {
        ConnectionId(self.bump())
    }

    pub fn next_packet(&mut self) -> PacketId {
        PacketId(self.bump())
    }
}
