//! Mission sets ("courses")
//!
//! Four courses ship with the simulator. Additional ones can be loaded from
//! TOML:
//!
//! ```toml
//! [[course]]
//! id = "my_course"
//! title = "My course"
//! description = "..."
//! difficulty = 2
//!
//! [[course.missions]]
//! id = 1
//! title = "Place a server"
//! description = "..."
//! hint = "..."
//! explanation = "..."
//! kind = "server_setup"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use lanlab_core::ConfigError;

use super::kinds::MissionKind;

/// One step of a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Position in the course, starting at 1
    pub id: u32,
    pub title: String,
    pub description: String,
    pub hint: String,
    pub explanation: String,
    pub kind: MissionKind,
}

/// An ordered course of missions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSet {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 1 to 3 stars
    pub difficulty: u8,
    pub missions: Vec<Mission>,
}

impl MissionSet {
    /// Difficulty rendered as stars, e.g. "★★☆"
    pub fn stars(&self) -> String {
        let filled = usize::from(self.difficulty.min(3));
        format!("{}{}", "★".repeat(filled), "☆".repeat(3 - filled))
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.missions.is_empty() {
            return Err(ConfigError::Invalid {
                field: "course.missions",
                reason: format!("course {:?} has no missions", self.id),
            });
        }
        if !(1..=3).contains(&self.difficulty) {
            return Err(ConfigError::Invalid {
                field: "course.difficulty",
                reason: format!("{} is outside 1..=3 in course {:?}", self.difficulty, self.id),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct CourseFile {
    #[serde(rename = "course", default)]
    courses: Vec<MissionSet>,
}

/// Parse courses from TOML text
pub fn courses_from_toml_str(content: &str) -> Result<Vec<MissionSet>, ConfigError> {
    let file: CourseFile = toml::from_str(content)?;
    for course in &file.courses {
        course.validate()?;
    }
    Ok(file.courses)
}

/// Read courses from a TOML file
pub fn load_courses(path: &Path) -> Result<Vec<MissionSet>, ConfigError> {
    info!("Loading courses from: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    courses_from_toml_str(&content)
}

/// Look up a built-in course by id
pub fn course(id: &str) -> Option<MissionSet> {
    builtin_courses().into_iter().find(|c| c.id == id)
}

fn mission(id: u32, kind: MissionKind, title: &str, description: &str, hint: &str, explanation: &str) -> Mission {
    Mission {
        id,
        title: title.to_string(),
        description: description.to_string(),
        hint: hint.to_string(),
        explanation: explanation.to_string(),
        kind,
    }
}

/// The courses that ship with the simulator
pub fn builtin_courses() -> Vec<MissionSet> {
    vec![basic_course(), ip_master_course(), soho_course(), server_course()]
}

fn basic_course() -> MissionSet {
    MissionSet {
        id: "basic_course".to_string(),
        title: "Networking Basics".to_string(),
        description: "Learn the fundamentals in order: device roles, IP addresses, ping and encryption."
            .to_string(),
        difficulty: 1,
        missions: vec![
            mission(
                1,
                MissionKind::PlaceDevices,
                "Place your first devices",
                "Place one PC and one router on the canvas.",
                "Pick each device from the device list. These two are all you need for now.",
                "A network is made of end devices (PCs) and network equipment. A router joins \
                 separate networks together.",
            ),
            mission(
                2,
                MissionKind::SwitchUplink,
                "Connect through a switch",
                "Add a switch and connect the PC and the router through it.",
                "Layout: [PC] <-> [Switch] <-> [Router]. Do not cable the PC straight to the router; \
                 delete that cable if you already made it.",
                "PCs normally plug into a switch rather than the router. The switch adds ports to \
                 the LAN and forwards frames between them.",
            ),
            mission(
                3,
                MissionKind::AssignAddresses,
                "Assign IP addresses",
                "Give the PC and the router valid IP addresses.",
                "Select a device and enter its IP. For example router 192.168.1.1 and PC 192.168.1.2.",
                "An IP address is a device's location on the network. Devices on the same LAN share \
                 the network part of the address (e.g. 192.168.1).",
            ),
            mission(
                4,
                MissionKind::PingRouter,
                "Test with ping",
                "Send a ping from the PC to the router and watch it succeed.",
                "Configuration alone is not enough. Select the PC, ping the router's IP and watch \
                 the packet make the trip.",
                "Ping is the basic reachability test. Even a correct configuration can fail because \
                 of a firewall or a broken cable, so a network engineer confirms traffic really flows.",
            ),
            mission(
                5,
                MissionKind::EncryptedTraffic,
                "Try encrypted traffic",
                "Turn encryption on, then ping again or watch the key exchange.",
                "Flipping the switch is not enough. Send traffic while encryption is on and watch \
                 the key exchange complete.",
                "Data crossing public networks can be intercepted. Protocols such as TLS encrypt \
                 it to keep its contents secret.",
            ),
        ],
    }
}

fn ip_master_course() -> MissionSet {
    MissionSet {
        id: "ip_master_course".to_string(),
        title: "IP Address Master".to_string(),
        description: "Understand private and public addresses and how traffic reaches the internet."
            .to_string(),
        difficulty: 3,
        missions: vec![
            mission(
                1,
                MissionKind::PrivateLan,
                "The world of private addresses",
                "Inside a LAN we use private addresses. Place a PC and a router, give both an \
                 address starting with 192.168 and connect them.",
                "For example PC 192.168.1.10 and router 192.168.1.1. A switch in between is ideal.",
                "Private ranges such as 192.168.x.x can be used freely at home or school. The same \
                 numbers are reused everywhere, which is fine because they never leave the LAN.",
            ),
            mission(
                2,
                MissionKind::PublicServer,
                "The world of public addresses",
                "Servers on the internet have public addresses. Place a server and give it a \
                 non-private address such as 8.8.8.8.",
                "Use anything outside 10.x.x.x, 172.16-31.x.x and 192.168.x.x.",
                "A public address is unique worldwide. Every server and website on the internet \
                 has one.",
            ),
            mission(
                3,
                MissionKind::RoutedToServer,
                "Relaying through a router",
                "Reach the public server from the private PC. Connect everything through a router.",
                "Layout: PC (private) <-> Switch <-> Router <-> Server (public). The router relays \
                 the traffic.",
                "A PC with a private address needs the router's NAT to talk to the internet. The \
                 router rewrites addresses so replies can find their way back.",
            ),
        ],
    }
}

fn soho_course() -> MissionSet {
    MissionSet {
        id: "soho_course".to_string(),
        title: "Small Office LAN".to_string(),
        description: "Build a LAN with several PCs and a printer, then connect it to the internet."
            .to_string(),
        difficulty: 2,
        missions: vec![
            mission(
                1,
                MissionKind::StarLan,
                "Star cabling",
                "Place two PCs, one printer and one switch, and cable every device to the switch.",
                "Do not cable devices to each other. Bring everything to the switch; this is a star \
                 topology.",
                "Modern LANs radiate out from a switch. One broken cable only affects one device, \
                 which makes the star layout resilient.",
            ),
            mission(
                2,
                MissionKind::SharedSubnet,
                "One subnet for all",
                "Give every PC and printer an address in the same network (e.g. 192.168.1.x) so \
                 the PC can reach the printer.",
                "Match the first three octets: 192.168.1.10, 192.168.1.11, 192.168.1.20.",
                "Only devices in the same subnet can talk without a router. Offices commonly give \
                 each department its own subnet.",
            ),
            mission(
                3,
                MissionKind::InternetEdge,
                "Internet access equipment",
                "Add a router and an ONU and cable them as switch <-> router <-> ONU.",
                "The ONU terminates the fibre line. Chain [Switch] - [Router] - [ONU] in a line.",
                "The ONU converts the optical signal and the router steers traffic to the internet. \
                 You need both to get online.",
            ),
            mission(
                4,
                MissionKind::DefaultGateway,
                "The default gateway",
                "Give the router an address and make sure the PC can reach it.",
                "Put the router in the PC's subnet, e.g. 192.168.1.254. For the PC this router is \
                 the way out.",
                "When a PC talks to another network it hands the data to its default gateway, \
                 usually the router's LAN address.",
            ),
        ],
    }
}

fn server_course() -> MissionSet {
    MissionSet {
        id: "server_course".to_string(),
        title: "Server Basics".to_string(),
        description: "Set up the relationship between a server that provides a service and the \
                      clients that use it."
            .to_string(),
        difficulty: 2,
        missions: vec![
            mission(
                1,
                MissionKind::ServerSetup,
                "Set up a server",
                "Place a server and give it a static address such as 10.0.0.1.",
                "Servers are usually configured by hand because clients rely on their address \
                 never changing.",
                "Web and file servers are destinations clients connect to. If the address kept \
                 changing nobody could find them, so they get a fixed one.",
            ),
            mission(
                2,
                MissionKind::ClientThroughSwitch,
                "Client connection",
                "Add a switch and a PC and connect them as PC <-> Switch <-> Server.",
                "Do not cable the PC straight to the server. Always go through the switch.",
                "Clients send requests and servers send responses. Going through a switch leaves \
                 room for more PCs later.",
            ),
            mission(
                3,
                MissionKind::MultipleClients,
                "Serving several clients",
                "Add a second PC so that both PCs have a route to the server.",
                "Plug it into a free switch port. Watch out for duplicate addresses.",
                "A switch lets you add devices as long as it has ports. One server can answer many \
                 clients at once.",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_shape() {
        let courses = builtin_courses();
        let sizes: Vec<(&str, usize)> = courses.iter().map(|c| (c.id.as_str(), c.len())).collect();
        assert_eq!(
            sizes,
            vec![
                ("basic_course", 5),
                ("ip_master_course", 3),
                ("soho_course", 4),
                ("server_course", 3),
            ]
        );
        for course in &courses {
            course.validate().unwrap();
            for (index, mission) in course.missions.iter().enumerate() {
                assert_eq!(mission.id as usize, index + 1);
            }
        }
    }

    #[test]
    fn test_every_kind_is_taught() {
        let used: Vec<MissionKind> = builtin_courses()
            .into_iter()
            .flat_map(|c| c.missions.into_iter().map(|m| m.kind))
            .collect();
        for kind in MissionKind::ALL {
            assert!(used.contains(&kind), "{kind:?} is not used by any course");
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(course("soho_course").unwrap().title, "Small Office LAN");
        assert!(course("nope").is_none());
    }

    #[test]
    fn test_stars() {
        assert_eq!(course("basic_course").unwrap().stars(), "★☆☆");
        assert_eq!(course("ip_master_course").unwrap().stars(), "★★★");
    }

    #[test]
    fn test_load_from_toml() {
        let courses = courses_from_toml_str(
            r#"
            [[course]]
            id = "tiny"
            title = "Tiny"
            description = "One step"
            difficulty = 1

            [[course.missions]]
            id = 1
            title = "Server"
            description = "Place a server"
            hint = "Use the device list"
            explanation = "Servers serve"
            kind = "server_setup"
            "#,
        )
        .unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].missions[0].kind, MissionKind::ServerSetup);
    }

    #[test]
    fn test_load_rejects_empty_course() {
        let err = courses_from_toml_str(
            r#"
            [[course]]
            id = "empty"
            title = "Empty"
            description = ""
            difficulty = 1
            missions = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "course.missions", .. }));
    }

    #[test]
    fn test_load_rejects_unknown_kind() {
        let err = courses_from_toml_str(
            r#"
            [[course]]
            id = "bad"
            title = "Bad"
            description = ""
            difficulty = 1

            [[course.missions]]
            id = 1
            title = "x"
            description = "x"
            hint = "x"
            explanation = "x"
            kind = "fly_to_the_moon"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
