//! Per-zone turn-taking conversation state
//!
//! A zone has at most one active conversation at a time. A conversation needs
//! at least two participants to stay active; dropping below that deactivates
//! it, and the next speaker in the zone starts a fresh one.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Tick, ZoneId};

/// One utterance inside a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub content: String,
    pub tick: Tick,
}

/// A conversation between agents sharing a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub zone: ZoneId,
    pub participants: BTreeSet<AgentId>,
    pub turns: Vec<ConversationTurn>,
    pub start_tick: Tick,
    pub active: bool,
}

/// Tracks conversations across all zones
#[derive(Debug, Clone, Default)]
pub struct ConversationTracker {
    conversations: Vec<Conversation>,
    /// Zone -> index into `conversations` of the active one
    active_by_zone: HashMap<ZoneId, usize>,
    next_id: u64,
    /// Stored turns per conversation; older turns are trimmed
    turn_cap: usize,
}

impl ConversationTracker {
    pub fn new(turn_cap: usize) -> Self {
        Self {
            turn_cap,
            next_id: 1,
            ..Default::default()
        }
    }

    pub fn clear(&mut self) {
        self.conversations.clear();
        self.active_by_zone.clear();
    }

    /// The zone's active conversation, created if none exists or the prior
    /// one went inactive
    pub fn ensure(&mut self, zone: &ZoneId, tick: Tick) -> &mut Conversation {
        let idx = match self.active_by_zone.get(zone) {
            Some(&i) if self.conversations[i].active => i,
            _ => {
                let conv = Conversation {
                    id: self.next_id,
                    zone: zone.clone(),
                    participants: BTreeSet::new(),
                    turns: Vec::new(),
                    start_tick: tick,
                    active: true,
                };
                self.next_id += 1;
                self.conversations.push(conv);
                let i = self.conversations.len() - 1;
                self.active_by_zone.insert(zone.clone(), i);
                i
            }
        };
        &mut self.conversations[idx]
    }

    /// Join the zone's active conversation
    pub fn add_participant(&mut self, zone: &ZoneId, agent_id: &AgentId, tick: Tick) {
        self.ensure(zone, tick).participants.insert(agent_id.clone());
    }

    /// Leave the zone's conversation. Below two participants the conversation
    /// deactivates and the zone's active pointer is cleared.
    pub fn remove_participant(&mut self, zone: &ZoneId, agent_id: &AgentId) {
        let Some(&idx) = self.active_by_zone.get(zone) else {
            return;
        };
        let conv = &mut self.conversations[idx];
        conv.participants.remove(agent_id);
        if conv.participants.len() < 2 {
            conv.active = false;
            self.active_by_zone.remove(zone);
        }
    }

    /// Append a turn, implicitly adding the speaker as participant. Stored
    /// turns are trimmed to the cap.
    pub fn add_turn(
        &mut self,
        zone: &ZoneId,
        agent_id: &AgentId,
        agent_name: &str,
        content: &str,
        tick: Tick,
    ) {
        let cap = self.turn_cap;
        let conv = self.ensure(zone, tick);
        conv.participants.insert(agent_id.clone());
        conv.turns.push(ConversationTurn {
            agent_id: agent_id.clone(),
            agent_name: agent_name.into(),
            content: content.into(),
            tick,
        });
        if conv.turns.len() > cap {
            let excess = conv.turns.len() - cap;
            conv.turns.drain(..excess);
        }
    }

    /// Tail of the active conversation's turns, oldest-first within the slice
    pub fn recent_turns(&self, zone: &ZoneId, limit: usize) -> &[ConversationTurn] {
        match self.active_by_zone.get(zone) {
            Some(&idx) => {
                let turns = &self.conversations[idx].turns;
                let start = turns.len().saturating_sub(limit);
                &turns[start..]
            }
            None => &[],
        }
    }

    pub fn has_active(&self, zone: &ZoneId) -> bool {
        self.active_by_zone
            .get(zone)
            .map_or(false, |&i| self.conversations[i].active)
    }

    pub fn all(&self) -> &[Conversation] {
        &self.conversations
    }
}
