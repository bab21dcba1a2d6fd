//! Scripted demonstrations
//!
//! Includes the PC - switch - router ping, the encryption handshake and an
//! automatic walkthrough that solves every mission of a course.

use tracing::{info, warn};

use lanlab_core::{DeviceId, DeviceType, DeviceUpdate, Position};

use crate::config::LabConfig;
use crate::missions::{AdvanceOutcome, MissionKind, MissionSet};
use crate::session::Session;
use crate::types::ClockEvent;

const MAX_SETTLE_TICKS: u64 = 10_000;

/// Ping from a PC to a router through a switch:
///
/// ```text
/// PC-1 (192.168.1.2) --- SW-1 --- Router-1 (192.168.1.1)
/// ```
pub fn run_ping_scenario(config: LabConfig) -> Session {
    info!("=== Running Ping Scenario ===");
    let mut session = Session::new(config);

    println!("\n--- Step 1: Place PC, switch and router ---");
    let pc = ensure(&mut session, DeviceType::Pc, 0);
    let sw = ensure(&mut session, DeviceType::Switch, 0);
    let router = ensure(&mut session, DeviceType::Router, 0);
    cable(&mut session, pc, sw);
    cable(&mut session, sw, router);
    println!("{}", session.topology().visualize());

    println!("--- Step 2: Ping before addressing ---");
    if let Err(e) = session.request_ping(pc, router) {
        println!("  Refused: {}", e);
    }

    println!("\n--- Step 3: Assign addresses and ping again ---");
    address(&mut session, pc, "192.168.1.2");
    address(&mut session, router, "192.168.1.1");
    match session.request_ping(pc, router) {
        Ok(packet) => {
            let route = session.packets().iter().find(|p| p.id == packet).map(|p| p.path.clone());
            if let Some(route) = route {
                println!("  {} launched along {} cables", packet, route.segment_count());
            }
        }
        Err(e) => warn!(error = %e, "Ping refused"),
    }

    println!("\n--- Step 4: Run the clock ---");
    let mut ticks = 0;
    while ticks < MAX_SETTLE_TICKS && !session.clock().is_idle() {
        for event in session.tick() {
            match event {
                ClockEvent::SegmentCompleted { packet, hop_index, tick } => {
                    println!("  [tick {:>4}] {} moved onto cable {}", tick, packet, hop_index + 1);
                }
                ClockEvent::Arrived { packet, tick } => {
                    println!("  [tick {:>4}] {} arrived at {}", tick, packet.id, packet.destination);
                }
                ClockEvent::HandshakeAcked { .. } => {}
            }
        }
        ticks += 1;
    }
    println!("  {}", session.clock().state_summary());

    print_log(&session);
    println!("\n  ping_success = {}", session.flags().ping_success);
    session
}

/// Turn encryption on and watch the two-packet key exchange
pub fn run_handshake_scenario(config: LabConfig) -> Session {
    info!("=== Running Handshake Scenario ===");
    let mut session = Session::new(config);

    println!("\n--- Step 1: Toggle encryption with nothing cabled ---");
    let pc = ensure(&mut session, DeviceType::Pc, 0);
    let server = ensure(&mut session, DeviceType::Server, 0);
    session.toggle_encryption();
    println!("  encrypted = {}", session.is_encrypted());

    println!("\n--- Step 2: Cable PC to server and toggle again ---");
    cable(&mut session, pc, server);
    session.toggle_encryption();
    println!("  encrypted = {}, handshake {:?}", session.is_encrypted(), session.clock().handshake());

    println!("\n--- Step 3: Run until the reply has arrived ---");
    let ran = session.run_until_idle(MAX_SETTLE_TICKS);
    println!("  {} ticks", ran);
    println!("  {}", session.clock().state_summary());

    print_log(&session);
    println!("\n  encrypted_success = {}", session.flags().encrypted_success);
    session
}

/// Solve every mission of `set` in order, checking and advancing each one
pub fn run_course_walkthrough(config: LabConfig, set: MissionSet) -> Session {
    info!(course = %set.id, "=== Running Course Walkthrough ===");
    println!("\n{} {}", set.title, set.stars());
    println!("{}", set.description);

    let mut session = Session::new(config);
    session.start_course_with(set);

    while let Some(mission) = session.current_mission().cloned() {
        println!("\n--- Mission {}: {} ---", mission.id, mission.title);
        println!("  {}", mission.description);

        if session.check_mission() == Some(true) {
            println!("  Already satisfied");
        }
        solve(&mut session, mission.kind);

        match session.advance_mission() {
            AdvanceOutcome::Advanced { .. } | AdvanceOutcome::Completed => {
                println!("  Cleared. {}", mission.explanation);
            }
            AdvanceOutcome::NotPassed => {
                println!("  Could not solve {:?}; hint: {}", mission.kind, mission.hint);
                break;
            }
            AdvanceOutcome::AlreadyComplete => break,
        }
    }

    println!("\n{}", session.topology().visualize());
    if let Some(engine) = session.missions() {
        let (done, total) = engine.progress();
        println!("Progress: {}/{}", done, total);
    }
    session
}

/// Edit the canvas until a mission of `kind` passes
pub fn solve(session: &mut Session, kind: MissionKind) {
    match kind {
        MissionKind::PlaceDevices => {
            ensure(session, DeviceType::Pc, 0);
            ensure(session, DeviceType::Router, 0);
        }
        MissionKind::SwitchUplink => {
            uplink(session);
        }
        MissionKind::AssignAddresses => {
            let (pc, _, router) = uplink(session);
            address(session, pc, "192.168.1.2");
            address(session, router, "192.168.1.1");
        }
        MissionKind::PingRouter => {
            let (pc, _, router) = uplink(session);
            address(session, pc, "192.168.1.2");
            address(session, router, "192.168.1.1");
            if session.request_ping(pc, router).is_ok() {
                session.run_until_idle(MAX_SETTLE_TICKS);
            }
        }
        MissionKind::EncryptedTraffic => {
            uplink(session);
            if !session.is_encrypted() {
                session.toggle_encryption();
            }
            session.run_until_idle(MAX_SETTLE_TICKS);
        }
        MissionKind::PrivateLan => {
            let (pc, _, router) = uplink(session);
            address(session, pc, "192.168.1.10");
            address(session, router, "192.168.1.1");
        }
        MissionKind::PublicServer => {
            let server = ensure(session, DeviceType::Server, 0);
            address(session, server, "8.8.8.8");
        }
        MissionKind::RoutedToServer => {
            solve(session, MissionKind::PrivateLan);
            solve(session, MissionKind::PublicServer);
            let router = ensure(session, DeviceType::Router, 0);
            let server = ensure(session, DeviceType::Server, 0);
            cable(session, router, server);
        }
        MissionKind::StarLan => {
            star(session);
        }
        MissionKind::SharedSubnet => {
            let (pcs, printer) = star(session);
            address(session, pcs[0], "192.168.1.10");
            address(session, pcs[1], "192.168.1.11");
            address(session, printer, "192.168.1.20");
        }
        MissionKind::InternetEdge => {
            let sw = ensure(session, DeviceType::Switch, 0);
            let router = ensure(session, DeviceType::Router, 0);
            let onu = ensure(session, DeviceType::Onu, 0);
            cable(session, sw, router);
            cable(session, router, onu);
        }
        MissionKind::DefaultGateway => {
            let (pc, _, router) = uplink(session);
            if session.topology().device(pc).is_some_and(|d| d.ip.is_empty()) {
                address(session, pc, "192.168.1.10");
            }
            address(session, router, "192.168.1.254");
        }
        MissionKind::ServerSetup => {
            let server = ensure(session, DeviceType::Server, 0);
            address(session, server, "10.0.0.1");
        }
        MissionKind::ClientThroughSwitch => {
            client(session, 0, "10.0.0.2");
        }
        MissionKind::MultipleClients => {
            client(session, 0, "10.0.0.2");
            client(session, 1, "10.0.0.3");
        }
    }
}

/// PC and router both cabled to the first switch
fn uplink(session: &mut Session) -> (DeviceId, DeviceId, DeviceId) {
    let pc = ensure(session, DeviceType::Pc, 0);
    let router = ensure(session, DeviceType::Router, 0);
    let sw = ensure(session, DeviceType::Switch, 0);
    cable(session, pc, sw);
    cable(session, sw, router);
    (pc, sw, router)
}

/// Two PCs and a printer on the first switch
fn star(session: &mut Session) -> ([DeviceId; 2], DeviceId) {
    let sw = ensure(session, DeviceType::Switch, 0);
    let pcs = [ensure(session, DeviceType::Pc, 0), ensure(session, DeviceType::Pc, 1)];
    let printer = ensure(session, DeviceType::Printer, 0);
    for device in [pcs[0], pcs[1], printer] {
        cable(session, device, sw);
    }
    (pcs, printer)
}

/// The `nth` PC, addressed and reaching the server through the switch
fn client(session: &mut Session, nth: usize, ip: &str) {
    let server = ensure(session, DeviceType::Server, 0);
    if session.topology().device(server).is_some_and(|d| d.ip.is_empty()) {
        address(session, server, "10.0.0.1");
    }
    let sw = ensure(session, DeviceType::Switch, 0);
    let pc = ensure(session, DeviceType::Pc, nth);
    address(session, pc, ip);
    cable(session, pc, sw);
    cable(session, sw, server);
}

/// The `nth` device of a type, placing devices until it exists
fn ensure(session: &mut Session, device_type: DeviceType, nth: usize) -> DeviceId {
    loop {
        if let Some(device) = session.topology().devices_of_type(device_type).nth(nth) {
            return device.id;
        }
        let count = session.topology().device_count() as f64;
        session.place_device(device_type, Position::new(80.0 + 120.0 * count, 200.0));
    }
}

/// Lay a cable through the click protocol, as a learner would
fn cable(session: &mut Session, a: DeviceId, b: DeviceId) {
    session.begin_connect();
    session.click_device(a);
    session.click_device(b);
}

fn address(session: &mut Session, device: DeviceId, ip: &str) {
    session.edit_device(device, DeviceUpdate::ip(ip));
}

fn print_log(session: &Session) {
    println!("\n--- Log (newest first) ---");
    for entry in session.log().entries() {
        println!("  [tick {:>4}] {}", entry.tick, entry.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::missions::builtin_courses;

    #[test]
    fn test_ping_scenario_succeeds() {
        let session = run_ping_scenario(LabConfig::default());
        assert!(session.flags().ping_success);
        assert_eq!(session.stats().packets_arrived, 1);
    }

    #[test]
    fn test_handshake_scenario_succeeds() {
        let session = run_handshake_scenario(LabConfig::default());
        assert!(session.flags().encrypted_success);
        assert_eq!(session.stats().key_exchanges_completed, 2);
    }

    #[test]
    fn test_every_builtin_course_can_be_completed() {
        for set in builtin_courses() {
            let id = set.id.clone();
            let session = run_course_walkthrough(LabConfig::default(), set);
            let engine = session.missions().unwrap();
            assert!(engine.is_complete(), "course {id} stopped at mission {}", engine.index());
        }
    }
}
