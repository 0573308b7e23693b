//! Pull-model view of the whole simulation
//!
//! A snapshot is self-contained: an observer that missed every stream message
//! can reconstruct the current picture from it.

use serde::{Deserialize, Serialize};

use crate::agent::AgentState;
use crate::cognition::PhaseConfig;
use crate::core::types::Tick;
use crate::simulation::events::SimulationEvent;

/// Lifecycle state of the simulation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimStatus {
    Idle,
    Running,
    Paused,
}

impl Default for SimStatus {
    fn default() -> Self {
        SimStatus::Idle
    }
}

/// Complete observable state at one moment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: Tick,
    pub status: SimStatus,
    pub speed: f32,
    pub phase: PhaseConfig,
    pub agents: Vec<AgentState>,
    /// Recent transcript tail, oldest-first
    pub events: Vec<SimulationEvent>,
}
