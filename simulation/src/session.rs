//! A learner's session
//!
//! [`Session`] is the surface a presentation layer drives. It owns the
//! independent state containers (topology, packet clock, flags, mission
//! progress, activity log) and serialises every mutation through its own
//! methods, so no locking is needed.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use lanlab_core::{
    ConnectionId, DeviceId, DeviceType, DeviceUpdate, LabError, PacketId, Position, RoutingError,
    parse_ipv4, resolve,
};

use crate::config::LabConfig;
use crate::log::SessionLog;
use crate::missions::{AdvanceOutcome, Mission, MissionEngine, MissionSet, course};
use crate::simulation::{ClockStats, PacketClock};
use crate::snapshot::Snapshot;
use crate::topology::{ConnectOutcome, Topology};
use crate::types::{ClockEvent, Flags, Packet, PacketKind};

/// Two-step cable protocol state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectMode {
    #[default]
    Idle,
    /// Waiting for the first device
    PickSource,
    /// Source chosen; waiting for the far end
    PickTarget(DeviceId),
}

/// What a click on a device did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Selected(DeviceId),
    SourcePicked(DeviceId),
    /// The source was clicked again; connect mode ended
    Cancelled,
    Connected(ConnectionId),
    AlreadyConnected(ConnectionId),
    /// Unknown device; nothing changed
    Ignored,
}

/// Result of the last mission check, for rendering
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissionStatus {
    #[default]
    Unchecked,
    Passed,
    Failed { message: String },
}

const MISSION_FAILED: &str = "Requirements not met yet. Check the hint.";

/// Everything one learner is working on
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    config: LabConfig,
    topology: Topology,
    clock: PacketClock,
    flags: Flags,
    missions: Option<MissionEngine>,
    log: SessionLog,
    selected: Option<DeviceId>,
    connect: ConnectMode,
    encrypted: bool,
    mission_status: MissionStatus,
}

impl Session {
    /// A fresh session in free-build mode
    pub fn new(config: LabConfig) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "Session created");
        Self {
            id,
            topology: Topology::with_default_mask(config.session.default_subnet_mask.clone()),
            clock: PacketClock::new(config.clock.clone()),
            flags: Flags::default(),
            missions: None,
            log: SessionLog::new(config.session.log_capacity),
            selected: None,
            connect: ConnectMode::Idle,
            encrypted: false,
            mission_status: MissionStatus::Unchecked,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------

    pub fn start_free_mode(&mut self) {
        self.clear_state();
        self.missions = None;
        self.write_log("Free build mode started");
    }

    /// Start a built-in course; false if no course has that id
    pub fn start_course(&mut self, course_id: &str) -> bool {
        match course(course_id) {
            Some(set) => {
                self.start_course_with(set);
                true
            }
            None => {
                warn!(course = course_id, "Unknown course");
                false
            }
        }
    }

    /// Start any course, built-in or loaded from a file
    pub fn start_course_with(&mut self, set: MissionSet) {
        self.clear_state();
        let title = set.title.clone();
        self.missions = Some(MissionEngine::new(set));
        self.write_log(format!("Started course \"{}\"", title));
    }

    /// Clear the canvas; the active course and its progress stay
    pub fn reset(&mut self) {
        self.clear_state();
        self.write_log("Simulation reset");
    }

    fn clear_state(&mut self) {
        self.topology.clear();
        self.clock.clear();
        self.flags.reset();
        self.log.clear();
        self.selected = None;
        self.connect = ConnectMode::Idle;
        self.encrypted = false;
        self.mission_status = MissionStatus::Unchecked;
    }

    // ------------------------------------------------------------------
    // Canvas editing
    // ------------------------------------------------------------------

    pub fn place_device(&mut self, device_type: DeviceType, position: Position) -> DeviceId {
        let id = self.topology.add_device(device_type, position);
        if let Some(device) = self.topology.device(id) {
            let message = format!("Added device: {}", device.display_name);
            self.write_log(message);
        }
        id
    }

    pub fn edit_device(&mut self, id: DeviceId, update: DeviceUpdate) -> bool {
        self.topology.update_device(id, update)
    }

    pub fn move_device(&mut self, id: DeviceId, position: Position) -> bool {
        self.topology.move_device(id, position)
    }

    /// Remove a device with its cables; clears any selection of it
    pub fn delete_device(&mut self, id: DeviceId) -> bool {
        let Some(device) = self.topology.delete_device(id) else {
            return false;
        };
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.connect == ConnectMode::PickTarget(id) {
            self.connect = ConnectMode::Idle;
        }
        self.write_log(format!("Deleted device: {}", device.display_name));
        true
    }

    pub fn delete_connection(&mut self, id: ConnectionId) -> bool {
        if self.topology.delete_connection(id).is_none() {
            return false;
        }
        self.write_log("Cable disconnected");
        true
    }

    /// Enter connect mode; the next click picks the source
    pub fn begin_connect(&mut self) {
        self.connect = ConnectMode::PickSource;
        self.write_log("Cable mode: click the source device");
    }

    /// Select a device, or take the next step of the connect protocol
    pub fn click_device(&mut self, id: DeviceId) -> ClickOutcome {
        if self.topology.device(id).is_none() {
            debug!(device = %id, "Click on unknown device ignored");
            return ClickOutcome::Ignored;
        }

        match self.connect {
            ConnectMode::Idle => {
                self.selected = Some(id);
                ClickOutcome::Selected(id)
            }
            ConnectMode::PickSource => {
                self.connect = ConnectMode::PickTarget(id);
                self.write_log("Source selected. Click the target device.");
                ClickOutcome::SourcePicked(id)
            }
            ConnectMode::PickTarget(source) => {
                self.connect = ConnectMode::Idle;
                if source == id {
                    return ClickOutcome::Cancelled;
                }
                match self.topology.add_connection(source, id) {
                    Ok(ConnectOutcome::Created(link)) => {
                        self.write_log("Connected");
                        ClickOutcome::Connected(link)
                    }
                    Ok(ConnectOutcome::Existing(link)) => {
                        self.write_log("Already connected");
                        ClickOutcome::AlreadyConnected(link)
                    }
                    Err(e) => {
                        debug!(error = %e, "Connect aborted");
                        ClickOutcome::Ignored
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Traffic
    // ------------------------------------------------------------------

    /// Send a ping along the shortest cabled route
    ///
    /// Both devices need valid addresses and a route between them; otherwise
    /// the problem is logged and no packet is created.
    pub fn request_ping(&mut self, from: DeviceId, to: DeviceId) -> Result<PacketId, LabError> {
        let (source, target) = match (self.topology.device(from), self.topology.device(to)) {
            (Some(source), Some(target)) => (source, target),
            (None, _) => return Err(RoutingError::UnknownDevice(from).into()),
            (_, None) => return Err(RoutingError::UnknownDevice(to).into()),
        };
        let addresses = parse_ipv4(&source.ip).and_then(|_| parse_ipv4(&target.ip));
        let (source_ip, target_ip) = (source.ip.clone(), target.ip.clone());

        if let Err(e) = addresses {
            self.write_log("Error: IP address settings are not valid");
            return Err(e.into());
        }

        let route = match resolve(&self.topology, from, to) {
            Ok(route) => route,
            Err(e) => {
                self.write_log("Ping failed: no route found. Check the cables.");
                return Err(e.into());
            }
        };

        self.write_log(format!("Ping {} -> {}", source_ip, target_ip));
        Ok(self.clock.launch(PacketKind::Ping, route))
    }

    /// Ping whichever device holds `ip`
    pub fn request_ping_to_ip(&mut self, from: DeviceId, ip: &str) -> Result<PacketId, LabError> {
        match self.topology.device_by_ip(ip) {
            Some(target) => {
                let to = target.id;
                self.request_ping(from, to)
            }
            None => {
                self.write_log(format!("Ping failed: no device has address {}", ip));
                Err(RoutingError::UnknownAddress(ip.to_string()).into())
            }
        }
    }

    /// Flip encryption; returns the new state
    ///
    /// Turning it on starts a key exchange over the first cable laid. With
    /// no cables at all the toggle does nothing.
    pub fn toggle_encryption(&mut self) -> bool {
        let Some(first) = self.topology.connections().first().copied() else {
            self.write_log("No devices are connected");
            return self.encrypted;
        };

        self.encrypted = !self.encrypted;
        if self.encrypted {
            self.write_log("Encryption on. Starting handshake...");
            self.clock.begin_handshake(first.endpoint_a, first.endpoint_b);
        } else {
            self.write_log("Encryption off");
        }
        self.encrypted
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Advance the packet clock by one tick
    pub fn tick(&mut self) -> Vec<ClockEvent> {
        let events = self.clock.step(self.encrypted, &mut self.flags);
        for event in &events {
            if let ClockEvent::Arrived { packet, .. } = event {
                if packet.kind == PacketKind::Ping {
                    let ip = self
                        .topology
                        .device(packet.destination)
                        .map_or_else(|| "unknown".to_string(), |d| d.ip.clone());
                    self.write_log(format!("Reply from {}: bytes=32 time=10ms", ip));
                }
            }
        }
        events
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick());
        }
        events
    }

    /// Tick until nothing is in flight, at most `max_ticks` times
    ///
    /// Returns the number of ticks run.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < max_ticks && !self.clock.is_idle() {
            self.tick();
            ran += 1;
        }
        ran
    }

    // ------------------------------------------------------------------
    // Missions
    // ------------------------------------------------------------------

    /// Judge the current mission; `None` in free mode or after the last one
    pub fn check_mission(&mut self) -> Option<bool> {
        let passed = self.missions.as_ref()?.check_current(&self.snapshot())?;
        self.mission_status = if passed {
            MissionStatus::Passed
        } else {
            MissionStatus::Failed {
                message: MISSION_FAILED.to_string(),
            }
        };
        Some(passed)
    }

    /// Move to the next mission if the current one passes
    pub fn advance_mission(&mut self) -> AdvanceOutcome {
        let Some(engine) = self.missions.as_mut() else {
            return AdvanceOutcome::AlreadyComplete;
        };
        let cleared = engine.current().map(|m| m.title.clone());
        let outcome = engine.advance(&self.topology, self.clock.in_flight(), &mut self.flags);

        match outcome {
            AdvanceOutcome::Advanced { .. } | AdvanceOutcome::Completed => {
                self.mission_status = MissionStatus::Unchecked;
                if let Some(title) = cleared {
                    self.write_log(format!("Mission cleared: {}", title));
                }
                if outcome == AdvanceOutcome::Completed {
                    self.write_log("Course complete!");
                }
            }
            AdvanceOutcome::NotPassed => {
                self.mission_status = MissionStatus::Failed {
                    message: MISSION_FAILED.to_string(),
                };
            }
            AdvanceOutcome::AlreadyComplete => {}
        }
        outcome
    }

    pub fn current_mission(&self) -> Option<&Mission> {
        self.missions.as_ref()?.current()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.topology, self.clock.in_flight(), &self.flags)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The packet set published by the latest tick
    pub fn packets(&self) -> Arc<[Packet]> {
        self.clock.packets()
    }

    pub fn clock(&self) -> &PacketClock {
        &self.clock
    }

    pub fn stats(&self) -> &ClockStats {
        &self.clock.stats
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn missions(&self) -> Option<&MissionEngine> {
        self.missions.as_ref()
    }

    pub fn mission_status(&self) -> &MissionStatus {
        &self.mission_status
    }

    pub fn selected(&self) -> Option<DeviceId> {
        self.selected
    }

    pub fn connect_mode(&self) -> ConnectMode {
        self.connect
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn write_log(&mut self, message: impl Into<String>) {
        self.log.push(self.clock.tick(), message);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LabConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use lanlab_core::AddressError;

    use super::*;
    use crate::types::HandshakePhase;

    fn device(session: &mut Session, device_type: DeviceType, ip: &str) -> DeviceId {
        let id = session.place_device(device_type, Position::default());
        if !ip.is_empty() {
            session.edit_device(id, DeviceUpdate::ip(ip));
        }
        id
    }

    fn connect(session: &mut Session, a: DeviceId, b: DeviceId) -> ClickOutcome {
        session.begin_connect();
        session.click_device(a);
        session.click_device(b)
    }

    #[test]
    fn test_click_selects_outside_connect_mode() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "");
        assert_eq!(session.click_device(pc), ClickOutcome::Selected(pc));
        assert_eq!(session.selected(), Some(pc));
        assert_eq!(session.click_device(DeviceId(999)), ClickOutcome::Ignored);
    }

    #[test]
    fn test_connect_protocol() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "");
        let sw = device(&mut session, DeviceType::Switch, "");

        session.begin_connect();
        assert_eq!(session.connect_mode(), ConnectMode::PickSource);
        assert_eq!(session.click_device(pc), ClickOutcome::SourcePicked(pc));
        assert_eq!(session.connect_mode(), ConnectMode::PickTarget(pc));
        let ClickOutcome::Connected(link) = session.click_device(sw) else {
            panic!("expected a new cable");
        };
        assert_eq!(session.connect_mode(), ConnectMode::Idle);
        assert!(session.log().contains("Connected"));

        assert_eq!(connect(&mut session, sw, pc), ClickOutcome::AlreadyConnected(link));
        assert!(session.log().contains("Already connected"));
        assert_eq!(session.topology().connection_count(), 1);
    }

    #[test]
    fn test_clicking_source_again_cancels() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "");
        assert_eq!(connect(&mut session, pc, pc), ClickOutcome::Cancelled);
        assert_eq!(session.connect_mode(), ConnectMode::Idle);
        assert_eq!(session.topology().connection_count(), 0);
    }

    #[test]
    fn test_delete_device_clears_selection() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "");
        session.click_device(pc);
        assert!(session.delete_device(pc));
        assert_eq!(session.selected(), None);
        assert!(!session.delete_device(pc));
        assert!(session.log().contains("Deleted device: PC-1"));
    }

    #[test]
    fn test_ping_with_invalid_address_aborts() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "192.168.1.2");
        let router = device(&mut session, DeviceType::Router, "192.168.1.300");
        connect(&mut session, pc, router);

        let err = session.request_ping(pc, router).unwrap_err();
        assert!(matches!(err, LabError::Address(AddressError::OutOfRange { .. })));
        assert!(session.log().contains("IP address settings are not valid"));
        assert_eq!(session.clock().active_count(), 0);
    }

    #[test]
    fn test_ping_without_route_aborts() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "192.168.1.2");
        let router = device(&mut session, DeviceType::Router, "192.168.1.1");

        let err = session.request_ping(pc, router).unwrap_err();
        assert!(matches!(err, LabError::Routing(RoutingError::Unreachable { .. })));
        assert!(session.log().contains("no route found"));
        assert_eq!(session.clock().active_count(), 0);
    }

    #[test]
    fn test_ping_unknown_device_is_silent() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "192.168.1.2");
        let before = session.log().len();
        assert!(session.request_ping(pc, DeviceId(999)).is_err());
        assert_eq!(session.log().len(), before);
    }

    #[test]
    fn test_ping_reply_logged() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "192.168.1.2");
        let router = device(&mut session, DeviceType::Router, "192.168.1.1");
        connect(&mut session, pc, router);

        session.request_ping_to_ip(pc, "192.168.1.1").unwrap();
        assert!(session.log().contains("Ping 192.168.1.2 -> 192.168.1.1"));
        assert!(!session.flags().ping_success);

        session.run_until_idle(1_000);
        assert!(session.flags().ping_success);
        assert_eq!(
            session.log().latest().unwrap().message,
            "Reply from 192.168.1.1: bytes=32 time=10ms"
        );
    }

    #[test]
    fn test_ping_to_unknown_ip() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "192.168.1.2");
        let err = session.request_ping_to_ip(pc, "10.9.9.9").unwrap_err();
        assert!(matches!(err, LabError::Routing(RoutingError::UnknownAddress(_))));
    }

    #[test]
    fn test_toggle_without_cables_is_noop() {
        let mut session = Session::default();
        device(&mut session, DeviceType::Pc, "");
        assert!(!session.toggle_encryption());
        assert!(!session.is_encrypted());
        assert!(session.log().contains("No devices are connected"));
    }

    #[test]
    fn test_handshake_sets_encrypted_flag() {
        let mut session = Session::default();
        let pc = device(&mut session, DeviceType::Pc, "");
        let sw = device(&mut session, DeviceType::Switch, "");
        connect(&mut session, pc, sw);

        assert!(session.toggle_encryption());
        assert!(matches!(
            session.clock().handshake(),
            HandshakePhase::Sent { initiator, responder, .. } if initiator == pc && responder == sw
        ));

        session.run_until_idle(1_000);
        assert_eq!(session.clock().handshake(), HandshakePhase::Acked);
        assert!(session.flags().encrypted_success);
        assert!(!session.flags().ping_success);

        assert!(!session.toggle_encryption());
        assert!(session.log().contains("Encryption off"));
    }

    #[test]
    fn test_reset_keeps_course() {
        let mut session = Session::default();
        assert!(session.start_course("basic_course"));
        device(&mut session, DeviceType::Pc, "");
        device(&mut session, DeviceType::Router, "");
        assert_eq!(session.advance_mission(), AdvanceOutcome::Advanced { index: 1 });

        session.reset();
        assert!(session.topology().is_empty());
        assert_eq!(session.missions().unwrap().index(), 1);
        assert_eq!(session.log().latest().unwrap().message, "Simulation reset");
    }

    #[test]
    fn test_free_mode_has_no_mission() {
        let mut session = Session::default();
        assert!(!session.start_course("missing"));
        session.start_free_mode();
        assert!(session.current_mission().is_none());
        assert_eq!(session.check_mission(), None);
        assert_eq!(session.advance_mission(), AdvanceOutcome::AlreadyComplete);
    }

    #[test]
    fn test_mission_status_recorded() {
        let mut session = Session::default();
        session.start_course("basic_course");
        assert_eq!(session.check_mission(), Some(false));
        assert!(matches!(session.mission_status(), MissionStatus::Failed { .. }));

        device(&mut session, DeviceType::Pc, "");
        device(&mut session, DeviceType::Router, "");
        assert_eq!(session.check_mission(), Some(true));
        assert_eq!(session.mission_status(), &MissionStatus::Passed);
    }
}
