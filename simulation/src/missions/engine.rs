//! Mission progress through one course

use tracing::{debug, info};

use super::catalog::{Mission, MissionSet};
use crate::snapshot::Snapshot;
use crate::topology::Topology;
use crate::types::{Flags, Packet};

/// What `advance` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved on to the mission at `index`
    Advanced { index: usize },
    /// The last mission passed; the course is finished
    Completed,
    /// The current mission does not pass; nothing changed
    NotPassed,
    /// There is no current mission left to advance past
    AlreadyComplete,
}

/// Holds the active course and the index of the current mission
#[derive(Debug, Clone)]
pub struct MissionEngine {
    set: MissionSet,
    index: usize,
}

impl MissionEngine {
    pub fn new(set: MissionSet) -> Self {
        info!(course = %set.id, missions = set.len(), "Course started");
        Self { set, index: 0 }
    }

    pub fn set(&self) -> &MissionSet {
        &self.set
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// `None` once every mission has been passed
    pub fn current(&self) -> Option<&Mission> {
        self.set.missions.get(self.index)
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.set.len()
    }

    /// (missions passed, missions in the course)
    pub fn progress(&self) -> (usize, usize) {
        (self.index.min(self.set.len()), self.set.len())
    }

    /// Evaluate the current mission without changing anything
    pub fn check_current(&self, snapshot: &Snapshot<'_>) -> Option<bool> {
        let mission = self.current()?;
        let passed = mission.kind.evaluate(snapshot);
        debug!(mission = mission.id, kind = ?mission.kind, passed, "Mission checked");
        Some(passed)
    }

    /// Re-check the current mission and move on only if it passes
    ///
    /// Passing resets `flags`, so evidence gathered for one mission never
    /// counts toward the next.
    pub fn advance(&mut self, topology: &Topology, packets: &[Packet], flags: &mut Flags) -> AdvanceOutcome {
        let Some(passed) = self.check_current(&Snapshot::new(topology, packets, flags)) else {
            return AdvanceOutcome::AlreadyComplete;
        };
        if !passed {
            return AdvanceOutcome::NotPassed;
        }

        flags.reset();
        self.index = (self.index + 1).min(self.set.len());

        if self.is_complete() {
            info!(course = %self.set.id, "Course complete");
            AdvanceOutcome::Completed
        } else {
            info!(course = %self.set.id, index = self.index, "Mission advanced");
            AdvanceOutcome::Advanced { index: self.index }
        }
    }
}
