//! # Telemetry
//!
//! Plain data emitted by the scheduler after every turn and generation, for
//! whatever presents the simulation (log lines, a UI, an external renderer).

use serde::Serialize;
use web_time::Duration;

use super::agents::agent::TurnSummary;

/// Colony-wide counters after a turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    /// Generation number, starting at 1.
    pub generation: u32,
    /// Turn number within the generation, starting at 1.
    pub turn: u64,
    /// Nests laid by the queen this generation.
    pub nests_produced: u32,
    /// Live members, queen included.
    pub colony_size: usize,
    /// The queen's health; zero once she has died.
    pub queen_health: i32,
}

impl Telemetry {
    /// Renders the counters as a single JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Everything that happened during one turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnReport {
    /// Counters after the turn.
    pub telemetry: Telemetry,
    /// One entry per agent that acted, in dispatch order.
    pub summaries: Vec<TurnSummary>,
    /// Dead workers dropped from the roster at the start of the turn.
    pub pruned: usize,
}

impl TurnReport {
    /// Renders the counters and every agent's summary as one JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Agents that died during this turn.
    pub fn deaths(&self) -> usize {
        self.summaries.iter().filter(|summary| summary.died).count()
    }
}

/// Outcome of a finished generation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GenerationReport {
    /// Generation number, starting at 1.
    pub generation: u32,
    /// Turns played before the queen died.
    pub turns: u64,
    /// Nests the queen laid.
    pub nests_produced: u32,
    /// Workers still alive when the queen died.
    pub surviving_workers: usize,
    /// Wall-clock duration of the generation, pacing included.
    pub elapsed: Duration,
}
