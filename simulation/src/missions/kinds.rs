//! Mission predicates
//!
//! Every mission names a [`MissionKind`]; the kind dispatches to a pure
//! evaluator over a [`Snapshot`]. Structural kinds read only devices and
//! cables. Behavioural kinds additionally require a flag that only the packet
//! clock can set, so a correct configuration alone is not enough to pass.

use serde::{Deserialize, Serialize};

use lanlab_core::{DeviceType, is_private_ip, is_valid_ip};

use crate::snapshot::Snapshot;

type Evaluator = fn(&Snapshot<'_>) -> bool;

/// The rule a mission is judged by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    /// A PC and a router are on the canvas
    PlaceDevices,
    /// PC and router both cabled to a switch and not to each other
    SwitchUplink,
    /// PC and router hold valid, distinct addresses
    AssignAddresses,
    /// A ping actually crossed the network between addressed PC and router
    PingRouter,
    /// Traffic actually flowed with encryption on
    EncryptedTraffic,
    /// PC and router reachable, both on private addresses
    PrivateLan,
    /// A server holds a valid public address
    PublicServer,
    /// The path from a private PC to a public server runs through a router
    RoutedToServer,
    /// Two PCs and a printer all cabled to the switch
    StarLan,
    /// PCs and printers share one subnet and the first PC reaches a printer
    SharedSubnet,
    /// Switch, router and ONU cabled in a line, switch not on the ONU
    InternetEdge,
    /// Router addressed in the PC's subnet and reachable from it
    DefaultGateway,
    /// A server holds a valid static address
    ServerSetup,
    /// PC reaches the server through the network, never directly
    ClientThroughSwitch,
    /// At least two PCs, each in the server's subnet and reaching it
    MultipleClients,
}

impl MissionKind {
    pub const ALL: [MissionKind; 15] = [
        MissionKind::PlaceDevices,
        MissionKind::SwitchUplink,
        MissionKind::AssignAddresses,
        MissionKind::PingRouter,
        MissionKind::EncryptedTraffic,
        MissionKind::PrivateLan,
        MissionKind::PublicServer,
        MissionKind::RoutedToServer,
        MissionKind::StarLan,
        MissionKind::SharedSubnet,
        MissionKind::InternetEdge,
        MissionKind::DefaultGateway,
        MissionKind::ServerSetup,
        MissionKind::ClientThroughSwitch,
        MissionKind::MultipleClients,
    ];

    fn evaluator(self) -> Evaluator {
        match self {
            MissionKind::PlaceDevices => place_devices,
            MissionKind::SwitchUplink => switch_uplink,
            MissionKind::AssignAddresses => assign_addresses,
            MissionKind::PingRouter => ping_router,
            MissionKind::EncryptedTraffic => encrypted_traffic,
            MissionKind::PrivateLan => private_lan,
            MissionKind::PublicServer => public_server,
            MissionKind::RoutedToServer => routed_to_server,
            MissionKind::StarLan => star_lan,
            MissionKind::SharedSubnet => shared_subnet,
            MissionKind::InternetEdge => internet_edge,
            MissionKind::DefaultGateway => default_gateway,
            MissionKind::ServerSetup => server_setup,
            MissionKind::ClientThroughSwitch => client_through_switch,
            MissionKind::MultipleClients => multiple_clients,
        }
    }

    /// Judge the snapshot against this rule
    pub fn evaluate(self, snapshot: &Snapshot<'_>) -> bool {
        (self.evaluator())(snapshot)
    }

    /// Whether passing needs evidence from the packet clock
    pub fn needs_traffic(self) -> bool {
        matches!(self, MissionKind::PingRouter | MissionKind::EncryptedTraffic)
    }
}

fn place_devices(s: &Snapshot<'_>) -> bool {
    s.has(DeviceType::Pc) && s.has(DeviceType::Router)
}

fn switch_uplink(s: &Snapshot<'_>) -> bool {
    let (Some(sw), Some(pc), Some(router)) = (
        s.first(DeviceType::Switch),
        s.first(DeviceType::Pc),
        s.first(DeviceType::Router),
    ) else {
        return false;
    };
    !s.linked(pc, router) && s.linked(pc, sw) && s.linked(router, sw)
}

fn assign_addresses(s: &Snapshot<'_>) -> bool {
    let (Some(pc), Some(router)) = (s.first(DeviceType::Pc), s.first(DeviceType::Router)) else {
        return false;
    };
    is_valid_ip(&pc.ip) && is_valid_ip(&router.ip) && pc.ip != router.ip
}

fn ping_router(s: &Snapshot<'_>) -> bool {
    assign_addresses(s) && s.flags.ping_success
}

fn encrypted_traffic(s: &Snapshot<'_>) -> bool {
    s.flags.encrypted_success
}

fn private_lan(s: &Snapshot<'_>) -> bool {
    let (Some(pc), Some(router)) = (s.first(DeviceType::Pc), s.first(DeviceType::Router)) else {
        return false;
    };
    s.reachable(pc, router) && is_private_ip(&pc.ip) && is_private_ip(&router.ip)
}

fn public_server(s: &Snapshot<'_>) -> bool {
    s.first(DeviceType::Server)
        .is_some_and(|server| is_valid_ip(&server.ip) && !is_private_ip(&server.ip))
}

fn routed_to_server(s: &Snapshot<'_>) -> bool {
    let pc = s.first_where(DeviceType::Pc, |d| is_private_ip(&d.ip));
    let server = s.first_where(DeviceType::Server, |d| is_valid_ip(&d.ip) && !is_private_ip(&d.ip));
    let (Some(pc), Some(server), Some(router)) = (pc, server, s.first(DeviceType::Router)) else {
        return false;
    };
    s.path(pc, server).is_some_and(|route| route.contains(router.id))
}

fn star_lan(s: &Snapshot<'_>) -> bool {
    let pcs = s.all(DeviceType::Pc);
    let printers = s.all(DeviceType::Printer);
    let Some(sw) = s.first(DeviceType::Switch) else {
        return false;
    };
    if pcs.len() < 2 || printers.is_empty() {
        return false;
    }
    pcs.iter().chain(printers.iter()).all(|d| s.linked(d, sw))
}

fn shared_subnet(s: &Snapshot<'_>) -> bool {
    let pcs = s.all(DeviceType::Pc);
    let printers = s.all(DeviceType::Printer);
    let (Some(base), Some(printer)) = (pcs.first(), printers.first()) else {
        return false;
    };
    let members = || pcs.iter().chain(printers.iter());
    members().all(|d| is_valid_ip(&d.ip))
        && members().all(|d| s.same_subnet(base, d))
        && s.reachable(base, printer)
}

fn internet_edge(s: &Snapshot<'_>) -> bool {
    let (Some(router), Some(onu), Some(sw)) = (
        s.first(DeviceType::Router),
        s.first(DeviceType::Onu),
        s.first(DeviceType::Switch),
    ) else {
        return false;
    };
    !s.linked(sw, onu) && s.linked(sw, router) && s.linked(router, onu)
}

fn default_gateway(s: &Snapshot<'_>) -> bool {
    let (Some(router), Some(pc)) = (s.first(DeviceType::Router), s.first(DeviceType::Pc)) else {
        return false;
    };
    s.same_subnet(pc, router) && s.reachable(pc, router)
}

fn server_setup(s: &Snapshot<'_>) -> bool {
    s.first(DeviceType::Server).is_some_and(|server| is_valid_ip(&server.ip))
}

fn client_through_switch(s: &Snapshot<'_>) -> bool {
    let (Some(pc), Some(server), Some(_)) = (
        s.first(DeviceType::Pc),
        s.first(DeviceType::Server),
        s.first(DeviceType::Switch),
    ) else {
        return false;
    };
    !s.linked(pc, server) && s.same_subnet(pc, server) && s.reachable(pc, server)
}

fn multiple_clients(s: &Snapshot<'_>) -> bool {
    let pcs = s.all(DeviceType::Pc);
    let Some(server) = s.first(DeviceType::Server) else {
        return false;
    };
    pcs.len() >= 2 && pcs.iter().all(|pc| s.same_subnet(pc, server) && s.reachable(pc, server))
}
