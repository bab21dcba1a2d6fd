//! The topology store: devices and the cables between them
//!
//! Collections keep insertion order. Cable order matters: the path resolver
//! expands neighbours in the order cables were laid.

use tracing::{debug, info};

use lanlab_core::{
    Connection, ConnectionId, DEFAULT_SUBNET_MASK, Device, DeviceId, DeviceType, DeviceUpdate,
    IdAllocator, NetworkTopology, Position, TopologyError,
};

/// Result of asking for a cable between two devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new cable was laid
    Created(ConnectionId),
    /// The devices were already cabled; nothing changed
    Existing(ConnectionId),
}

impl ConnectOutcome {
    pub fn connection_id(self) -> ConnectionId {
        match self {
            ConnectOutcome::Created(id) | ConnectOutcome::Existing(id) => id,
        }
    }
}

/// Owns every device and cable in a session
#[derive(Debug, Clone)]
pub struct Topology {
    devices: Vec<Device>,
    connections: Vec<Connection>,
    ids: IdAllocator,
    default_mask: String,
}

impl Topology {
    /// Create an empty topology
    pub fn new() -> Self {
        Self::with_default_mask(DEFAULT_SUBNET_MASK)
    }

    /// Create an empty topology whose new devices get `mask`
    pub fn with_default_mask(mask: impl Into<String>) -> Self {
        Self {
            devices: Vec::new(),
            connections: Vec::new(),
            ids: IdAllocator::new(),
            default_mask: mask.into(),
        }
    }

    /// Place a device; its name is `<label>-<n>` where n counts devices of
    /// the same type, this one included
    pub fn add_device(&mut self, device_type: DeviceType, position: Position) -> DeviceId {
        let id = self.ids.next_device();
        let count = self.devices_of_type(device_type).count() + 1;
        let name = format!("{}-{}", device_type.label(), count);

        let mut device = Device::new(id, device_type, position, name);
        device.subnet_mask = self.default_mask.clone();

        info!(device = %id, name = %device.display_name, "Device added");
        self.devices.push(device);
        id
    }

    /// Merge `update` into a device; false if the id is unknown
    pub fn update_device(&mut self, id: DeviceId, update: DeviceUpdate) -> bool {
        match self.device_mut(id) {
            Some(device) => {
                device.apply(update);
                info!(device = %id, ip = %device.ip, mask = %device.subnet_mask, "Device updated");
                true
            }
            None => {
                debug!(device = %id, "Update ignored: unknown device");
                false
            }
        }
    }

    /// Move a device on the canvas; false if the id is unknown
    pub fn move_device(&mut self, id: DeviceId, position: Position) -> bool {
        match self.device_mut(id) {
            Some(device) => {
                device.position = position;
                debug!(device = %id, x = position.x, y = position.y, "Device moved");
                true
            }
            None => false,
        }
    }

    /// Remove a device and every cable touching it
    pub fn delete_device(&mut self, id: DeviceId) -> Option<Device> {
        let index = self.devices.iter().position(|d| d.id == id)?;
        let device = self.devices.remove(index);

        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        let removed = before - self.connections.len();

        info!(device = %id, name = %device.display_name, cables_removed = removed, "Device deleted");
        Some(device)
    }

    /// Cable two devices together
    ///
    /// Idempotent: an existing cable between the pair is returned unchanged.
    pub fn add_connection(&mut self, a: DeviceId, b: DeviceId) -> Result<ConnectOutcome, TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLoop(a));
        }
        for id in [a, b] {
            if self.device(id).is_none() {
                return Err(TopologyError::UnknownDevice(id));
            }
        }

        if let Some(existing) = self.find_connection(a, b) {
            debug!(connection = %existing.id, "Devices already connected");
            return Ok(ConnectOutcome::Existing(existing.id));
        }

        let id = self.ids.next_connection();
        self.connections.push(Connection {
            id,
            endpoint_a: a,
            endpoint_b: b,
        });
        info!(connection = %id, %a, %b, "Connection added");
        Ok(ConnectOutcome::Created(id))
    }

    /// Remove a cable; `None` if the id is unknown
    pub fn delete_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let index = self.connections.iter().position(|c| c.id == id)?;
        let connection = self.connections.remove(index);
        info!(connection = %id, "Connection deleted");
        Some(connection)
    }

    /// Drop every device and cable; ids are never reused
    pub fn clear(&mut self) {
        self.devices.clear();
        self.connections.clear();
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    fn device_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn devices_of_type(&self, device_type: DeviceType) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(move |d| d.device_type == device_type)
    }

    /// First device (in placement order) holding this address
    pub fn device_by_ip(&self, ip: &str) -> Option<&Device> {
        if ip.is_empty() {
            return None;
        }
        self.devices.iter().find(|d| d.ip == ip)
    }

    /// Look a device up by display name, ignoring case
    pub fn device_by_name(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.display_name.eq_ignore_ascii_case(name))
    }

    /// Cables touching a device
    pub fn connections_of(&self, id: DeviceId) -> Vec<&Connection> {
        self.connections.iter().filter(|c| c.touches(id)).collect()
    }

    pub fn find_connection(&self, a: DeviceId, b: DeviceId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.links(a, b))
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Print a simple ASCII listing of the topology
    pub fn visualize(&self) -> String {
        let mut output = String::new();
        output.push_str("Topology:\n");
        output.push_str(&format!("  Devices: {}\n", self.device_count()));
        output.push_str(&format!("  Cables: {}\n\n", self.connection_count()));

        for device in &self.devices {
            let neighbors: Vec<String> = self
                .neighbors(device.id)
                .into_iter()
                .filter_map(|id| self.device(id).map(|d| d.display_name.clone()))
                .collect();
            let ip = if device.ip.is_empty() { "-" } else { device.ip.as_str() };
            output.push_str(&format!(
                "  {} [{}] {} -> [{}]\n",
                device.display_name,
                device.id,
                ip,
                neighbors.join(", ")
            ));
        }
        output
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkTopology for Topology {
    fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.iter().map(|d| d.id).collect()
    }

    fn contains(&self, device: DeviceId) -> bool {
        self.device(device).is_some()
    }

    fn neighbors(&self, device: DeviceId) -> Vec<DeviceId> {
        self.connections.iter().filter_map(|c| c.other_end(device)).collect()
    }

    fn are_connected(&self, a: DeviceId, b: DeviceId) -> bool {
        self.find_connection(a, b).is_some()
    }
}
