//! Event log and live stream protocol
//!
//! Two audiences: the [`EventLog`] is the durable, append-only transcript of
//! everything that happened; [`StreamMessage`] is the push protocol for live
//! observers, fanned out through the [`EventBus`]. A slow or dropped observer
//! never blocks the simulation; dead subscribers are pruned on broadcast.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use crate::core::types::{AgentId, Tick, TilePos};
use crate::simulation::action::Action;
use crate::simulation::snapshot::SimulationSnapshot;

/// Category of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Speech,
    Thought,
    Movement,
    Reflection,
    System,
    Injection,
}

/// One entry in the simulation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationEvent {
    pub id: u64,
    pub tick: Tick,
    /// RFC 3339 wall-clock timestamp at creation
    pub timestamp: String,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Append-only transcript of the whole run
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimulationEvent>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.next_id = 0;
    }

    /// Append an event; id and timestamp are assigned here.
    pub fn add(
        &mut self,
        tick: Tick,
        kind: EventKind,
        agent_id: Option<AgentId>,
        agent_name: Option<String>,
        content: impl Into<String>,
        target: Option<String>,
    ) -> SimulationEvent {
        self.next_id += 1;
        let event = SimulationEvent {
            id: self.next_id,
            tick,
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            agent_id,
            agent_name,
            content: content.into(),
            target,
        };
        self.events.push(event.clone());
        event
    }

    pub fn all(&self) -> &[SimulationEvent] {
        &self.events
    }

    /// Last `limit` events, oldest-first
    pub fn recent(&self, limit: usize) -> &[SimulationEvent] {
        let start = self.events.len().saturating_sub(limit);
        &self.events[start..]
    }

    pub fn by_agent(&self, agent_id: &AgentId) -> Vec<&SimulationEvent> {
        self.events
            .iter()
            .filter(|e| e.agent_id.as_ref() == Some(agent_id))
            .collect()
    }

    pub fn by_kind(&self, kind: EventKind) -> Vec<&SimulationEvent> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Push message for live observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StreamMessage {
    Tick {
        tick: Tick,
        simulation_time: String,
    },
    AgentMove {
        agent_id: AgentId,
        path: Vec<TilePos>,
        speed: f32,
    },
    AgentThinking {
        agent_id: AgentId,
    },
    AgentStreamToken {
        agent_id: AgentId,
        token: String,
    },
    AgentActionComplete(Action),
    Reflection {
        agent_id: AgentId,
        reflections: Vec<String>,
    },
    PhaseChange {
        phase: String,
        description: String,
    },
    StateSync(SimulationSnapshot),
    Error {
        message: String,
    },
}

type Subscriber = (u64, mpsc::UnboundedSender<StreamMessage>);

/// Fan-out channel for [`StreamMessage`]s.
///
/// Cloning is cheap; all clones share the subscriber list. This is the only
/// internally synchronized piece of the simulation, so helper tasks (token
/// forwarders) can publish while the scheduler task holds everything else.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

#[derive(Debug, Default)]
struct BusInner {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer. Returns its id and the receiving end.
    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<StreamMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push((id, tx));
        (id, rx)
    }

    pub fn unsubscribe(&self, id: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.retain(|(sid, _)| *sid != id);
    }

    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.len()
    }

    /// Send a message to every live subscriber, dropping any whose receiver
    /// has gone away.
    pub fn broadcast(&self, message: StreamMessage) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let before = inner.subscribers.len();
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(message.clone()).is_ok());
        let pruned = before - inner.subscribers.len();
        if pruned > 0 {
            trace!(pruned, "dropped dead stream subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_ids_monotonic() {
        let mut log = EventLog::new();
        log.add(0, EventKind::System, None, None, "start", None);
        log.add(1, EventKind::Speech, Some(AgentId::new("a")), None, "hi", None);
        let ids: Vec<u64> = log.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_recent_window() {
        let mut log = EventLog::new();
        for i in 0..10 {
            log.add(i, EventKind::System, None, None, format!("e{i}"), None);
        }
        let recent = log.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "e7");
        assert_eq!(recent[2].content, "e9");
        assert_eq!(log.recent(100).len(), 10);
    }

    #[test]
    fn test_filters() {
        let mut log = EventLog::new();
        let a = AgentId::new("a");
        log.add(0, EventKind::Speech, Some(a.clone()), None, "hi", None);
        log.add(0, EventKind::Thought, Some(AgentId::new("b")), None, "hm", None);
        assert_eq!(log.by_agent(&a).len(), 1);
        assert_eq!(log.by_kind(EventKind::Thought).len(), 1);
    }

    #[test]
    fn test_stream_message_wire_shape() {
        let msg = StreamMessage::Tick {
            tick: 4,
            simulation_time: "09:12".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "tick");
        assert_eq!(json["payload"]["tick"], 4);

        let msg = StreamMessage::AgentStreamToken {
            agent_id: AgentId::new("skeptic"),
            token: "CAC".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "agent_stream_token");
        assert_eq!(json["payload"]["agent_id"], "skeptic");
    }

    #[test]
    fn test_bus_broadcast_and_prune() {
        let bus = EventBus::new();
        let (_id1, mut rx1) = bus.subscribe();
        let (_id2, rx2) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx2);
        bus.broadcast(StreamMessage::Error {
            message: "x".into(),
        });
        assert_eq!(bus.subscriber_count(), 1);
        assert!(matches!(
            rx1.try_recv().unwrap(),
            StreamMessage::Error { .. }
        ));
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let (id, _rx) = bus.subscribe();
        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
