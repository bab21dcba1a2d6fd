//! Read-only view handed to mission evaluators

use lanlab_core::{Device, DeviceType, NetworkTopology, Route, find_path, is_in_same_subnet, is_valid_ip};

use crate::topology::Topology;
use crate::types::{Flags, Packet};

/// A consistent, immutable view of topology, packets and flags
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub topology: &'a Topology,
    pub packets: &'a [Packet],
    pub flags: &'a Flags,
}

impl<'a> Snapshot<'a> {
    pub fn new(topology: &'a Topology, packets: &'a [Packet], flags: &'a Flags) -> Self {
        Self {
            topology,
            packets,
            flags,
        }
    }

    pub fn devices(&self) -> &'a [Device] {
        self.topology.devices()
    }

    /// First placed device of a type
    pub fn first(&self, device_type: DeviceType) -> Option<&'a Device> {
        self.topology.devices_of_type(device_type).next()
    }

    /// First placed device of a type that also satisfies `predicate`
    pub fn first_where(&self, device_type: DeviceType, predicate: impl Fn(&Device) -> bool) -> Option<&'a Device> {
        self.topology.devices_of_type(device_type).find(|d| predicate(*d))
    }

    pub fn all(&self, device_type: DeviceType) -> Vec<&'a Device> {
        self.topology.devices_of_type(device_type).collect()
    }

    pub fn has(&self, device_type: DeviceType) -> bool {
        self.first(device_type).is_some()
    }

    /// Direct cable between two devices
    pub fn linked(&self, a: &Device, b: &Device) -> bool {
        self.topology.are_connected(a.id, b.id)
    }

    pub fn path(&self, a: &Device, b: &Device) -> Option<Route> {
        find_path(self.topology, a.id, b.id)
    }

    pub fn reachable(&self, a: &Device, b: &Device) -> bool {
        self.path(a, b).is_some()
    }

    /// Both devices hold valid addresses in the same network under `a`'s mask
    pub fn same_subnet(&self, a: &Device, b: &Device) -> bool {
        is_valid_ip(&a.ip) && is_valid_ip(&b.ip) && is_in_same_subnet(&a.ip, &b.ip, &a.subnet_mask)
    }
}
