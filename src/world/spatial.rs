//! Spatial index — which agent is on which tile, in which zone
//!
//! Zone membership is recomputed on every position update. All queries are
//! O(n) scans over the position table; agent counts are small enough that a
//! spatial tree would be overhead.

use std::collections::HashMap;

use crate::core::types::{AgentId, TilePos, ZoneId};
use crate::world::zones::ZoneRegistry;

#[derive(Debug, Clone)]
pub struct AgentPosition {
    pub agent_id: AgentId,
    pub tile: TilePos,
    pub zone: Option<ZoneId>,
}

/// Agent -> tile -> zone mapping with zone membership queries
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    positions: HashMap<AgentId, AgentPosition>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    /// Place an agent on a tile, recomputing its zone from the registry
    pub fn set_position(&mut self, registry: &ZoneRegistry, agent_id: AgentId, tile: TilePos) {
        let zone = registry.zone_at(tile).map(|z| z.id.clone());
        self.positions.insert(
            agent_id.clone(),
            AgentPosition {
                agent_id,
                tile,
                zone,
            },
        );
    }

    pub fn position(&self, agent_id: &AgentId) -> Option<&AgentPosition> {
        self.positions.get(agent_id)
    }

    pub fn zone_of(&self, agent_id: &AgentId) -> Option<&ZoneId> {
        self.positions.get(agent_id).and_then(|p| p.zone.as_ref())
    }

    /// All agents currently inside the given zone
    pub fn agents_in_zone(&self, zone: &ZoneId) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .positions
            .values()
            .filter(|p| p.zone.as_ref() == Some(zone))
            .map(|p| p.agent_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// All agents sharing the given agent's zone, excluding the agent itself
    pub fn agents_in_same_zone(&self, agent_id: &AgentId) -> Vec<AgentId> {
        match self.zone_of(agent_id) {
            Some(zone) => self
                .agents_in_zone(zone)
                .into_iter()
                .filter(|id| id != agent_id)
                .collect(),
            None => Vec::new(),
        }
    }
}
