//! # LAN Lab Core
//!
//! Types, errors and pure algorithms shared by the LAN Lab simulator.
//!
//! - [`address`]: IPv4 validation, private-range and subnet checks
//! - [`device`]: devices, device types and cables
//! - [`routing`]: direct-link tests and breadth-first path resolution
//! - [`NetworkTopology`]: the read-only graph view the algorithms run against

pub mod address;
pub mod device;
pub mod error;
pub mod identity;
pub mod routing;
pub mod traits;

pub use address::{
    DEFAULT_SUBNET_MASK, is_in_same_default_subnet, is_in_same_subnet, is_private_ip, is_valid_ip,
    parse_ipv4, parse_mask,
};
pub use device::{Connection, Device, DeviceType, DeviceUpdate, Position};
pub use error::*;
pub use identity::{ConnectionId, DeviceId, IdAllocator, PacketId};
pub use routing::{Route, find_path, is_connected, resolve};
pub use traits::NetworkTopology;
