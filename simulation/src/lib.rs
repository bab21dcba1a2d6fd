//! # LAN Lab
//!
//! A teaching simulator for small local networks.
//!
//! ## Overview
//!
//! Learners place devices, cable them together, assign IPv4 addresses and
//! send traffic. The engine behind that:
//!
//! - **Topology store**: devices and cables, with cascading deletes
//! - **Path resolution**: shortest cabled route, resolved once per packet
//! - **Address validation**: strict dotted-quad parsing, private ranges, subnets
//! - **Packet clock**: fixed-timestep animation of packets hop by hop
//! - **Mission engine**: courses of missions judged against a snapshot
//!
//! ## Architecture
//!
//! - **Types** (`types.rs`): packets, flags, handshake phase, clock events
//! - **Topology** (`topology.rs`): the device and cable store
//! - **Simulation** (`simulation.rs`): the packet clock
//! - **Missions** (`missions/`): mission kinds, built-in courses, progress
//! - **Session** (`session.rs`): the facade a presentation layer drives
//! - **Driver** (`driver.rs`): runs the clock from a tokio interval
//! - **Scenarios** (`scenarios.rs`): scripted demonstrations
//!
//! ## Example: ping through a switch
//!
//! ```rust,ignore
//! use lanlab_simulation::*;
//!
//! let mut session = Session::default();
//! let pc = session.place_device(DeviceType::Pc, Position::new(0.0, 0.0));
//! let sw = session.place_device(DeviceType::Switch, Position::new(100.0, 0.0));
//! let router = session.place_device(DeviceType::Router, Position::new(200.0, 0.0));
//!
//! for (a, b) in [(pc, sw), (sw, router)] {
//!     session.begin_connect();
//!     session.click_device(a);
//!     session.click_device(b);
//! }
//! session.edit_device(pc, DeviceUpdate::ip("192.168.1.2"));
//! session.edit_device(router, DeviceUpdate::ip("192.168.1.1"));
//!
//! session.request_ping(pc, router)?;
//! session.run_until_idle(1_000);
//! assert!(session.flags().ping_success);
//! ```
//!
//! ## Evidence flags
//!
//! Some missions cannot be judged from the canvas alone. The clock sets
//! `ping_success` when a ping actually arrives and `encrypted_success` when
//! traffic flows with encryption on. Only advancing to the next mission
//! clears them.

pub mod config;
pub mod driver;
pub mod log;
pub mod missions;
pub mod scenarios;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod topology;
pub mod types;

pub use config::{ClockConfig, LabConfig, SessionConfig};
pub use driver::drive;
pub use log::{LogEntry, SessionLog};
pub use missions::{
    AdvanceOutcome, Mission, MissionEngine, MissionKind, MissionSet, builtin_courses, course,
};
pub use session::{ClickOutcome, ConnectMode, MissionStatus, Session};
pub use simulation::{ClockStats, PacketClock};
pub use snapshot::Snapshot;
pub use topology::{ConnectOutcome, Topology};
pub use types::{ClockEvent, Flags, HandshakePhase, Packet, PacketKind, PacketStatus, PendingAck};

// Re-export core types for callers
pub use lanlab_core::{
    ConnectionId, Device, DeviceId, DeviceType, DeviceUpdate, LabError, PacketId, Position, Route,
};
