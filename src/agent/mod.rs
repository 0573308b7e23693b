//! Agent entity — persona, mutable state, and private memory
//!
//! Agents are created once at simulation initialization from scenario config
//! and live until a reset. The Scheduler owns them exclusively; mutation
//! happens only during the agent's own turn or when another agent's action
//! delivers a perception.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, AgentStatus, Disposition, Emotion, Tick, TilePos, ZoneId};
use crate::memory::{MemoryEntry, MemoryKind, MemoryStore};
use crate::simulation::action::Action;

/// Static persona definition from the scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub disposition: Disposition,
    pub starting_location: ZoneId,
    pub persona: String,
}

/// Serializable view of an agent for snapshots and the event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub tile: TilePos,
    pub current_zone: Option<ZoneId>,
    pub current_plan: Option<String>,
    pub status: AgentStatus,
    pub emotion: Emotion,
    pub ticks_since_acted: u32,
}

/// A simulated actor
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub disposition: Disposition,
    pub persona: String,
    pub starting_location: ZoneId,

    pub tile: TilePos,
    pub current_zone: Option<ZoneId>,
    pub current_plan: Option<String>,
    pub status: AgentStatus,
    pub emotion: Emotion,
    pub memory: MemoryStore,
    pub last_action: Option<Action>,
    /// Fairness counter: ticks elapsed since this agent last acted
    pub ticks_since_acted: u32,
}

impl Agent {
    pub fn from_config(config: &AgentConfig, spawn: TilePos) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            role: config.role.clone(),
            disposition: config.disposition,
            persona: config.persona.clone(),
            starting_location: config.starting_location.clone(),
            tile: spawn,
            current_zone: Some(config.starting_location.clone()),
            current_plan: None,
            status: AgentStatus::Idle,
            emotion: Emotion::Neutral,
            memory: MemoryStore::new(),
            last_action: None,
            ticks_since_acted: 0,
        }
    }

    /// Record something this agent witnessed
    pub fn observe(
        &mut self,
        tick: Tick,
        content: impl Into<String>,
        importance: u8,
        location: Option<ZoneId>,
        associated_agent: Option<AgentId>,
    ) {
        self.memory.add(MemoryEntry::new(
            tick,
            MemoryKind::Observation,
            content,
            importance,
            associated_agent,
            location,
        ));
    }

    /// Record a synthesized higher-level insight
    pub fn reflect(&mut self, tick: Tick, content: impl Into<String>, importance: u8) {
        self.memory.add(MemoryEntry::new(
            tick,
            MemoryKind::Reflection,
            content,
            importance,
            None,
            None,
        ));
    }

    pub fn state(&self) -> AgentState {
        AgentState {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            tile: self.tile,
            current_zone: self.current_zone.clone(),
            current_plan: self.current_plan.clone(),
            status: self.status,
            emotion: self.emotion,
            ticks_since_acted: self.ticks_since_acted,
        }
    }
}
