//! Mission rule engine
//!
//! - [`kinds`]: the rule each mission is judged by
//! - [`catalog`]: built-in courses and TOML course files
//! - [`engine`]: progress through the active course

pub mod catalog;
pub mod engine;
pub mod kinds;

pub use catalog::{Mission, MissionSet, builtin_courses, course, courses_from_toml_str, load_courses};
pub use engine::{AdvanceOutcome, MissionEngine};
pub use kinds::MissionKind;
