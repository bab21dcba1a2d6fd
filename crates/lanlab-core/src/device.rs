//! Devices and the cables between them

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::DEFAULT_SUBNET_MASK;
use crate::identity::{ConnectionId, DeviceId};

/// Kind of equipment a learner can place on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Pc,
    Switch,
    Router,
    Server,
    Printer,
    Onu,
    Hub,
}

impl DeviceType {
    pub const ALL: [DeviceType; 7] = [
        DeviceType::Pc,
        DeviceType::Switch,
        DeviceType::Router,
        DeviceType::Server,
        DeviceType::Printer,
        DeviceType::Onu,
        DeviceType::Hub,
    ];

    /// Prefix used for generated display names ("SW-2", "Router-1", ...)
    pub fn label(self) -> &'static str {
        match self {
            DeviceType::Pc => "PC",
            DeviceType::Switch => "SW",
            DeviceType::Router => "Router",
            DeviceType::Server => "Server",
            DeviceType::Printer => "Printer",
            DeviceType::Onu => "ONU",
            DeviceType::Hub => "Hub",
        }
    }
}

impl Display for DeviceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceType::Pc => "PC",
            DeviceType::Switch => "SWITCH",
            DeviceType::Router => "ROUTER",
            DeviceType::Server => "SERVER",
            DeviceType::Printer => "PRINTER",
            DeviceType::Onu => "ONU",
            DeviceType::Hub => "HUB",
        };
        f.write_str(name)
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PC" => Ok(DeviceType::Pc),
            "SWITCH" | "SW" => Ok(DeviceType::Switch),
            "ROUTER" => Ok(DeviceType::Router),
            "SERVER" => Ok(DeviceType::Server),
            "PRINTER" => Ok(DeviceType::Printer),
            "ONU" => Ok(DeviceType::Onu),
            "HUB" => Ok(DeviceType::Hub),
            other => Err(format!("unknown device type: {other}")),
        }
    }
}

/// Canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node in the simulated LAN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub device_type: DeviceType,
    pub position: Position,
    /// Empty until the learner assigns an address
    pub ip: String,
    pub subnet_mask: String,
    pub display_name: String,
}

impl Device {
    pub fn new(id: DeviceId, device_type: DeviceType, position: Position, display_name: String) -> Self {
        Self {
            id,
            device_type,
            position,
            ip: String::new(),
            subnet_mask: DEFAULT_SUBNET_MASK.to_string(),
            display_name,
        }
    }

    /// Merge a partial update into this device
    pub fn apply(&mut self, update: DeviceUpdate) {
        if let Some(ip) = update.ip {
            self.ip = ip;
        }
        if let Some(mask) = update.subnet_mask {
            self.subnet_mask = mask;
        }
        if let Some(name) = update.display_name {
            self.display_name = name;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
    }
}

/// Partial set of device fields edited through the inspector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    pub ip: Option<String>,
    pub subnet_mask: Option<String>,
    pub display_name: Option<String>,
    pub position: Option<Position>,
}

impl DeviceUpdate {
    pub fn ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            ..Default::default()
        }
    }

    pub fn with_subnet_mask(mut self, mask: impl Into<String>) -> Self {
        self.subnet_mask = Some(mask.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// An undirected cable between two live devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub endpoint_a: DeviceId,
    pub endpoint_b: DeviceId,
}

impl Connection {
    pub fn touches(&self, device: DeviceId) -> bool {
        self.endpoint_a == device || self.endpoint_b == device
    }

    /// True if this cable joins `a` and `b` in either direction
    pub fn links(&self, a: DeviceId, b: DeviceId) -> bool {
        (self.endpoint_a == a && self.endpoint_b == b) || (self.endpoint_a == b && self.endpoint_b == a)
    }

    /// The far end of the cable as seen from `device`
    pub fn other_end(&self, device: DeviceId) -> Option<DeviceId> {
        if self.endpoint_a == device {
            Some(self.endpoint_b)
        } else if self.endpoint_b == device {
            Some(self.endpoint_a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_device_defaults() {
        let device = Device::new(DeviceId(1), DeviceType::Pc, Position::new(10.0, 20.0), "PC-1".into());
        assert!(device.ip.is_empty());
        assert_eq!(device.subnet_mask, "255.255.255.0");
    }

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut device = Device::new(DeviceId(1), DeviceType::Router, Position::default(), "Router-1".into());
        device.apply(DeviceUpdate::ip("192.168.1.1"));
        assert_eq!(device.ip, "192.168.1.1");
        assert_eq!(device.display_name, "Router-1");
    }

    #[test]
    fn test_connection_other_end() {
        let conn = Connection {
            id: ConnectionId(5),
            endpoint_a: DeviceId(1),
            endpoint_b: DeviceId(2),
        };
        assert!(conn.links(DeviceId(2), DeviceId(1)));
        assert_eq!(conn.other_end(DeviceId(1)), Some(DeviceId(2)));
        assert_eq!(conn.other_end(DeviceId(3)), None);
    }

    #[test]
    fn test_device_type_parse() {
        assert_eq!("switch".parse::<DeviceType>(), Ok(DeviceType::Switch));
        assert_eq!("ONU".parse::<DeviceType>(), Ok(DeviceType::Onu));
        assert!("modem".parse::<DeviceType>().is_err());
    }
}
