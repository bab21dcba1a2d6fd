//! Trait seams between the topology store and the algorithms that read it

use crate::identity::DeviceId;

/// Read-only view of a device graph
///
/// Lets the path resolver and mission evaluators work against the live
/// topology store or a fixed test graph alike.
pub trait NetworkTopology {
    /// All device ids, in placement order
    fn device_ids(&self) -> Vec<DeviceId>;

    /// Whether a device with this id exists
    fn contains(&self, device: DeviceId) -> bool;

    /// Directly cabled neighbours, in cable-insertion order
    fn neighbors(&self, device: DeviceId) -> Vec<DeviceId>;

    /// Whether a cable joins `a` and `b` directly
    fn are_connected(&self, a: DeviceId, b: DeviceId) -> bool {
        self.neighbors(a).contains(&b)
    }
}
