//! LAN Lab - LAN building simulator
//!
//! Runs scripted scenarios, automatic course walkthroughs, a real-time
//! watch mode and an interactive shell over one session.

use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use lanlab_core::{DeviceId, DeviceType, DeviceUpdate, Position};
use lanlab_logging::{LabSubscriberBuilder, SessionContextGuard};
use lanlab_simulation::missions::{self, MissionSet};
use lanlab_simulation::{AdvanceOutcome, ClickOutcome, ClockEvent, LabConfig, Session, drive, scenarios};

#[derive(Parser)]
#[command(name = "lanlab", about = "Build small networks and watch packets cross them", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Extra courses file (TOML)
    #[arg(long, global = true)]
    courses: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available courses
    Courses,

    /// Ping from a PC to a router through a switch
    Ping,

    /// Turn encryption on and watch the key exchange
    Handshake,

    /// Solve every mission of a course automatically
    Walkthrough {
        /// Course id; all courses when omitted
        #[arg(long)]
        course: Option<String>,
    },

    /// Run the ping scenario in real time
    Watch {
        /// Stop after this many ticks
        #[arg(short, long, default_value = "600")]
        ticks: u64,
    },

    /// Interactive mode
    Interactive {
        /// Start a course instead of free build mode
        #[arg(long)]
        course: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LabConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => LabConfig::default(),
    };

    let mut logging = LabSubscriberBuilder::new().with_config(config.logging.clone());
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    if cli.json_logs {
        logging = logging.with_json_console();
    }
    let _log_guard = logging.init();

    let mut courses = missions::builtin_courses();
    if let Some(path) = &cli.courses {
        let extra = missions::load_courses(path).with_context(|| format!("loading {}", path.display()))?;
        courses.extend(extra);
    }

    match cli.command {
        Commands::Courses => {
            for set in &courses {
                println!("{:<20} {} {} ({} missions)", set.id, set.stars(), set.title, set.len());
                println!("{:<20} {}", "", set.description);
            }
        }
        Commands::Ping => {
            scenarios::run_ping_scenario(config);
        }
        Commands::Handshake => {
            scenarios::run_handshake_scenario(config);
        }
        Commands::Walkthrough { course } => {
            let selected: Vec<MissionSet> = match course {
                Some(id) => vec![find_course(&courses, &id)?],
                None => courses,
            };
            for set in selected {
                scenarios::run_course_walkthrough(config.clone(), set);
            }
        }
        Commands::Watch { ticks } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .context("building runtime")?;
            runtime.block_on(run_watch(config, ticks));
        }
        Commands::Interactive { course } => {
            let set = course.map(|id| find_course(&courses, &id)).transpose()?;
            run_interactive(config, set)?;
        }
    }

    Ok(())
}

fn find_course(courses: &[MissionSet], id: &str) -> anyhow::Result<MissionSet> {
    match courses.iter().find(|c| c.id == id) {
        Some(set) => Ok(set.clone()),
        None => bail!("Unknown course: {id}. Run `lanlab courses` to list them."),
    }
}

async fn run_watch(config: LabConfig, ticks: u64) {
    let interval = config.clock.tick_interval();
    let mut session = Session::new(config);
    let _context = SessionContextGuard::new(session.id(), "watch");

    let pc = session.place_device(DeviceType::Pc, Position::new(80.0, 200.0));
    let sw = session.place_device(DeviceType::Switch, Position::new(200.0, 200.0));
    let router = session.place_device(DeviceType::Router, Position::new(320.0, 200.0));
    for (a, b) in [(pc, sw), (sw, router)] {
        session.begin_connect();
        session.click_device(a);
        session.click_device(b);
    }
    session.edit_device(pc, DeviceUpdate::ip("192.168.1.2"));
    session.edit_device(router, DeviceUpdate::ip("192.168.1.1"));
    if let Err(e) = session.request_ping(pc, router) {
        println!("Ping refused: {e}");
        return;
    }

    let ran = drive(&mut session, interval, ticks, |session, events| {
        for packet in session.packets().iter() {
            if let Some((from, to)) = packet.current_segment() {
                println!("  {} {} -> {} [{:>3}%]", packet.id, from, to, packet.hop_progress);
            }
        }
        for event in events {
            if let ClockEvent::Arrived { packet, .. } = event {
                println!("  {} arrived", packet.id);
            }
        }
        if session.clock().is_idle() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .await;

    println!("\nStopped after {ran} ticks. {}", session.clock().state_summary());
}

fn run_interactive(config: LabConfig, course: Option<MissionSet>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let mut session = Session::new(config);
    let mode = if course.is_some() { "course" } else { "free" };
    let _context = SessionContextGuard::new(session.id(), mode);
    match course {
        Some(set) => session.start_course_with(set),
        None => session.start_free_mode(),
    }

    println!("\nInteractive mode. Commands:");
    println!("  add <type> [x y]        - Place a device (pc, switch, router, server, printer, onu, hub)");
    println!("  connect <a> <b>         - Cable two devices (by name)");
    println!("  unlink <a> <b>          - Remove the cable between two devices");
    println!("  ip <dev> <addr> [mask]  - Set a device's address");
    println!("  rename <dev> <name>     - Rename a device");
    println!("  delete <dev>            - Delete a device and its cables");
    println!("  ping <from> <to|ip>     - Send a ping");
    println!("  encrypt                 - Toggle encryption");
    println!("  step [n]                - Advance n ticks (default 1)");
    println!("  run                     - Tick until no packets are in flight");
    println!("  show                    - Show the topology");
    println!("  packets                 - Show packets in flight");
    println!("  log [n]                 - Show the newest log lines");
    println!("  mission                 - Show the current mission");
    println!("  check                   - Check the current mission");
    println!("  next                    - Advance to the next mission");
    println!("  hint                    - Show the current hint");
    println!("  stats                   - Show clock statistics");
    println!("  reset                   - Clear the canvas");
    println!("  quit                    - Exit");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let before = session.log().written();
        match parts[0] {
            "add" => match parts.get(1).map(|s| s.parse::<DeviceType>()) {
                Some(Ok(device_type)) => {
                    let x = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0.0);
                    let y = parts.get(3).and_then(|s| s.parse().ok()).unwrap_or(0.0);
                    session.place_device(device_type, Position::new(x, y));
                }
                Some(Err(e)) => println!("  {e}"),
                None => println!("  Usage: add <type> [x y]"),
            },
            "connect" => match (lookup(&session, parts.get(1)), lookup(&session, parts.get(2))) {
                (Some(a), Some(b)) => {
                    session.begin_connect();
                    session.click_device(a);
                    if let ClickOutcome::Cancelled = session.click_device(b) {
                        println!("  A device cannot be cabled to itself");
                    }
                }
                _ => println!("  Usage: connect <a> <b>"),
            },
            "unlink" => match (lookup(&session, parts.get(1)), lookup(&session, parts.get(2))) {
                (Some(a), Some(b)) => match session.topology().find_connection(a, b).map(|c| c.id) {
                    Some(link) => {
                        session.delete_connection(link);
                    }
                    None => println!("  Not connected"),
                },
                _ => println!("  Usage: unlink <a> <b>"),
            },
            "ip" => match (lookup(&session, parts.get(1)), parts.get(2)) {
                (Some(device), Some(ip)) => {
                    let mut update = DeviceUpdate::ip(*ip);
                    if let Some(mask) = parts.get(3) {
                        update = update.with_subnet_mask(*mask);
                    }
                    session.edit_device(device, update);
                }
                _ => println!("  Usage: ip <device> <address> [mask]"),
            },
            "rename" => match (lookup(&session, parts.get(1)), parts.get(2)) {
                (Some(device), Some(name)) => {
                    session.edit_device(device, DeviceUpdate::default().with_display_name(*name));
                }
                _ => println!("  Usage: rename <device> <name>"),
            },
            "delete" => match lookup(&session, parts.get(1)) {
                Some(device) => {
                    session.delete_device(device);
                }
                None => println!("  Usage: delete <device>"),
            },
            "ping" => match (lookup(&session, parts.get(1)), parts.get(2)) {
                (Some(from), Some(target)) => {
                    let result = match session.topology().device_by_name(target).map(|d| d.id) {
                        Some(to) => session.request_ping(from, to),
                        None => session.request_ping_to_ip(from, target),
                    };
                    if let Err(e) = result {
                        println!("  {e}");
                    }
                }
                _ => println!("  Usage: ping <from> <to-name-or-ip>"),
            },
            "encrypt" => {
                session.toggle_encryption();
            }
            "step" => {
                let n: u64 = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(1);
                session.run_ticks(n);
                println!("  Advanced {} tick(s). {}", n, session.clock().state_summary());
            }
            "run" => {
                let ran = session.run_until_idle(100_000);
                println!("  Ran {} tick(s). {}", ran, session.clock().state_summary());
            }
            "show" => {
                println!("{}", session.topology().visualize());
            }
            "packets" => {
                let packets = session.packets();
                println!("  {} packet(s) in flight", packets.len());
                for packet in packets.iter() {
                    println!(
                        "    {} {:?} {} -> {} hop {}/{} at {}",
                        packet.id,
                        packet.kind,
                        packet.source,
                        packet.destination,
                        packet.hop_index + 1,
                        packet.path.segment_count(),
                        packet.hop_progress
                    );
                }
            }
            "log" => {
                let n: usize = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
                for entry in session.log().entries().take(n) {
                    println!("  [tick {:>5}] {}", entry.tick, entry.message);
                }
            }
            "mission" => print_mission(&session),
            "check" => match session.check_mission() {
                Some(true) => println!("  Passed! Type `next` to continue."),
                Some(false) => println!("  Not yet. Type `hint` for help."),
                None => println!("  No active mission"),
            },
            "next" => match session.advance_mission() {
                AdvanceOutcome::Advanced { .. } => print_mission(&session),
                AdvanceOutcome::Completed => println!("  Course complete!"),
                AdvanceOutcome::NotPassed => println!("  The current mission is not passed yet"),
                AdvanceOutcome::AlreadyComplete => println!("  No active mission"),
            },
            "hint" => match session.current_mission() {
                Some(mission) => println!("  Hint: {}", mission.hint),
                None => println!("  No active mission"),
            },
            "stats" => {
                let stats = session.stats();
                println!("  Ticks: {}", stats.ticks);
                println!("  Packets launched: {}", stats.packets_launched);
                println!("  Segments completed: {}", stats.segments_completed);
                println!("  Packets arrived: {}", stats.packets_arrived);
                println!("  Pings answered: {}", stats.pings_answered);
                println!("  Key exchanges completed: {}", stats.key_exchanges_completed);
            }
            "reset" => session.reset(),
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("  Unknown command: {}", parts[0]);
            }
        }

        // Echo whatever the command added to the activity log, oldest first
        let added = (session.log().written() - before) as usize;
        let mut fresh: Vec<_> = session.log().entries().take(added).collect();
        fresh.reverse();
        for entry in fresh {
            println!("  {}", entry.message);
        }
    }

    Ok(())
}

fn lookup(session: &Session, name: Option<&&str>) -> Option<DeviceId> {
    let name = name?;
    let device = session.topology().device_by_name(name);
    if device.is_none() {
        println!("  No device named {name}");
    }
    device.map(|d| d.id)
}

fn print_mission(session: &Session) {
    let Some(engine) = session.missions() else {
        println!("  Free build mode");
        return;
    };
    let (done, total) = engine.progress();
    match engine.current() {
        Some(mission) => {
            println!("  [{}/{}] {}", done + 1, total, mission.title);
            println!("  {}", mission.description);
        }
        None => println!("  {} complete ({}/{})", engine.set().title, done, total),
    }
}
