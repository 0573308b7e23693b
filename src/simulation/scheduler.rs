//! Tick scheduler: turn ordering, action execution, perception fan-out
//!
//! The scheduler owns every piece of simulation state and is driven one tick
//! at a time. Within a tick each agent gets exactly one turn; agents who have
//! waited longest act first, ties resolved by roster order. Executing one
//! agent's action delivers perceptions to every other agent in the same zone,
//! to be read on their next turn.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::agent::Agent;
use crate::cognition::{reflect, should_reflect, CognitiveCycle, PhaseManager};
use crate::conversation::ConversationTracker;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, AgentStatus, Tick};
use crate::llm::DecisionMaker;
use crate::scenario::Scenario;
use crate::simulation::action::{Action, ActionKind};
use crate::simulation::events::{EventBus, EventKind, EventLog, StreamMessage};
use crate::simulation::snapshot::{SimStatus, SimulationSnapshot};
use crate::world::{EnvironmentTree, SpatialIndex, ZoneRegistry};

/// Arrival perceptions when an agent enters a zone
const ARRIVAL_IMPORTANCE: u8 = 3;
/// Overheard speech perceptions
const SPEECH_IMPORTANCE: u8 = 6;
/// An agent's own private thoughts
const THOUGHT_IMPORTANCE: u8 = 4;
/// Moderator or inner-voice injections
const INJECTION_IMPORTANCE: u8 = 8;
/// The scenario briefing every agent starts with
const BRIEFING_IMPORTANCE: u8 = 9;

/// On-screen walk speed sent with move messages (pixels per second)
const MOVE_SPEED: f32 = 200.0;

/// Owns all simulation state and advances it tick by tick
pub struct Scheduler {
    config: SimulationConfig,
    scenario: Scenario,
    decider: Arc<dyn DecisionMaker>,
    bus: EventBus,
    turn_pace_ms: u64,

    tick: Tick,
    status: SimStatus,
    speed: f32,
    agents: HashMap<AgentId, Agent>,
    /// Scenario order; breaks turn-order ties
    roster: Vec<AgentId>,
    registry: ZoneRegistry,
    spatial: SpatialIndex,
    env: EnvironmentTree,
    conversations: ConversationTracker,
    cycle: CognitiveCycle,
    phases: PhaseManager,
    event_log: EventLog,
}

impl Scheduler {
    pub fn new(
        scenario: Scenario,
        config: SimulationConfig,
        decider: Arc<dyn DecisionMaker>,
        bus: EventBus,
        phases_enabled: bool,
        live: bool,
    ) -> Result<Self> {
        config.validate()?;
        scenario.validate()?;

        let registry = ZoneRegistry::think_tank();
        let env = EnvironmentTree::from_registry("The Think Tank", &registry);
        let turn_pace_ms = if live {
            config.live_pace_ms
        } else {
            config.scripted_pace_ms
        };

        let mut scheduler = Self {
            turn_pace_ms,
            speed: config.speed,
            conversations: ConversationTracker::new(config.conversation_turn_cap),
            config,
            scenario,
            decider,
            bus,
            tick: 0,
            status: SimStatus::Idle,
            agents: HashMap::new(),
            roster: Vec::new(),
            spatial: SpatialIndex::new(),
            env,
            registry,
            cycle: CognitiveCycle::new(),
            phases: PhaseManager::new(phases_enabled),
            event_log: EventLog::new(),
        };
        scheduler.initialize()?;
        Ok(scheduler)
    }

    /// Reset to tick zero and seed every agent with the scenario briefing
    pub fn initialize(&mut self) -> Result<()> {
        self.tick = 0;
        self.status = SimStatus::Paused;
        self.agents.clear();
        self.roster.clear();
        self.spatial.clear();
        self.conversations.clear();
        self.cycle.clear();
        self.event_log.clear();

        for cfg in &self.scenario.agents {
            let spawn = self
                .registry
                .spawn_tile(&cfg.starting_location)
                .ok_or_else(|| SimError::UnknownZone(cfg.starting_location.to_string()))?;

            let mut agent = Agent::from_config(cfg, spawn);
            agent.observe(
                0,
                format!("Scenario briefing: {}", self.scenario.briefing),
                BRIEFING_IMPORTANCE,
                Some(cfg.starting_location.clone()),
                None,
            );
            self.spatial
                .set_position(&self.registry, cfg.id.clone(), spawn);
            self.roster.push(cfg.id.clone());
            self.agents.insert(cfg.id.clone(), agent);
        }

        self.event_log.add(
            0,
            EventKind::System,
            None,
            None,
            "Simulation initialized. Agents reading scenario briefing.",
            None,
        );
        info!(agents = self.roster.len(), scenario = %self.scenario.id, "simulation initialized");
        self.bus.broadcast(StreamMessage::StateSync(self.snapshot()));
        Ok(())
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SimStatus) {
        self.status = status;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Playback speed multiplier; out-of-range values are rejected
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !(0.25..=8.0).contains(&speed) {
            return Err(SimError::Config(format!("speed out of range: {speed}")));
        }
        self.speed = speed;
        Ok(())
    }

    /// Effective delay before the next scheduled tick
    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis((self.config.tick_interval_ms as f32 / self.speed) as u64)
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Run one tick: every agent gets a turn in fairness order.
    pub async fn run_tick(&mut self) {
        self.tick += 1;
        self.bus.broadcast(StreamMessage::Tick {
            tick: self.tick,
            simulation_time: format!("Tick {}", self.tick),
        });

        if let Some(next) = self.phases.tick() {
            self.announce_phase(&next.description);
        }

        for agent_id in self.turn_order() {
            self.run_turn(&agent_id).await;
            if self.turn_pace_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.turn_pace_ms)).await;
            }
        }
    }

    /// Agents who have waited longest act first; ties keep roster order.
    /// Every agent's wait counter is bumped here, then reset when they act.
    fn turn_order(&mut self) -> Vec<AgentId> {
        let mut order: Vec<AgentId> = self.roster.clone();
        order.sort_by_key(|id| {
            std::cmp::Reverse(self.agents.get(id).map_or(0, |a| a.ticks_since_acted))
        });
        for agent in self.agents.values_mut() {
            agent.ticks_since_acted += 1;
        }
        order
    }

    async fn run_turn(&mut self, agent_id: &AgentId) {
        // The acting agent leaves the map for the duration of its turn so
        // perception fan-out can mutate everyone else.
        let Some(mut agent) = self.agents.remove(agent_id) else {
            return;
        };

        self.bus.broadcast(StreamMessage::AgentThinking {
            agent_id: agent_id.clone(),
        });

        let nearby: Vec<String> = self
            .spatial
            .agents_in_same_zone(agent_id)
            .iter()
            .filter_map(|id| self.agents.get(id))
            .map(|a| format!("{} ({})", a.name, a.role))
            .collect();

        let (token_tx, token_rx) = tokio::sync::mpsc::unbounded_channel();
        let forwarder = spawn_token_forwarder(self.bus.clone(), agent_id.clone(), token_rx);

        let mut action = self
            .cycle
            .decide(
                &mut agent,
                &nearby,
                &self.env,
                &self.scenario.topic,
                &self.config,
                self.decider.as_ref(),
                self.tick,
                Some(token_tx),
            )
            .await;
        forwarder.await.ok();

        action.tick = self.tick;
        agent.ticks_since_acted = 0;
        self.execute_action(&mut agent, action);

        if should_reflect(&agent, self.config.reflection_threshold) {
            self.run_reflection(&mut agent).await;
        }

        self.agents.insert(agent_id.clone(), agent);
    }

    fn execute_action(&mut self, agent: &mut Agent, action: Action) {
        agent.last_action = Some(action.clone());

        match &action.kind {
            ActionKind::MoveTo { destination } => {
                let Some(target) = self.registry.spawn_tile(destination) else {
                    warn!(agent = %agent.id, zone = %destination, "move to unknown zone ignored");
                    return;
                };

                if let Some(old_zone) = agent.current_zone.take() {
                    self.conversations.remove_participant(&old_zone, &agent.id);
                }

                agent.status = AgentStatus::Moving;
                self.bus.broadcast(StreamMessage::AgentMove {
                    agent_id: agent.id.clone(),
                    path: vec![target],
                    speed: MOVE_SPEED,
                });

                agent.tile = target;
                agent.current_zone = Some(destination.clone());
                self.spatial
                    .set_position(&self.registry, agent.id.clone(), target);
                agent.status = AgentStatus::Idle;

                self.conversations
                    .add_participant(destination, &agent.id, self.tick);

                self.event_log.add(
                    self.tick,
                    EventKind::Movement,
                    Some(agent.id.clone()),
                    Some(agent.name.clone()),
                    format!("{} moved to {}", agent.name, destination),
                    None,
                );

                let arrival_obs =
                    format!("{} ({}) arrived at {}", agent.name, agent.role, destination);
                let arrival_perception = format!(
                    "{} ({}) just arrived at {}.",
                    agent.name, agent.role, destination
                );
                for other_id in self.spatial.agents_in_same_zone(&agent.id) {
                    if let Some(other) = self.agents.get_mut(&other_id) {
                        other.observe(
                            self.tick,
                            arrival_obs.clone(),
                            ARRIVAL_IMPORTANCE,
                            Some(destination.clone()),
                            Some(agent.id.clone()),
                        );
                        self.cycle.add_perception(&other_id, arrival_perception.clone());
                    }
                }
            }

            ActionKind::Speak { target, content, .. } => {
                agent.status = AgentStatus::Speaking;
                self.bus
                    .broadcast(StreamMessage::AgentActionComplete(action.clone()));

                self.event_log.add(
                    self.tick,
                    EventKind::Speech,
                    Some(agent.id.clone()),
                    Some(agent.name.clone()),
                    action.summary.clone().unwrap_or_else(|| content.clone()),
                    Some(target.to_string()),
                );

                let heard = format!("{} said: \"{}\"", agent.name, content);
                for other_id in self.spatial.agents_in_same_zone(&agent.id) {
                    if let Some(other) = self.agents.get_mut(&other_id) {
                        other.observe(
                            self.tick,
                            heard.clone(),
                            SPEECH_IMPORTANCE,
                            agent.current_zone.clone(),
                            Some(agent.id.clone()),
                        );
                        self.cycle.add_perception(&other_id, heard.clone());
                    }
                }

                if let Some(zone) = agent.current_zone.clone() {
                    self.conversations
                        .add_turn(&zone, &agent.id, &agent.name, content, self.tick);
                    self.cycle
                        .add_conversation_turn(&zone, format!("{}: {}", agent.name, content));
                }

                agent.status = AgentStatus::Idle;
            }

            ActionKind::Think { content } => {
                agent.status = AgentStatus::Thinking;
                self.bus
                    .broadcast(StreamMessage::AgentActionComplete(action.clone()));

                agent.observe(
                    self.tick,
                    format!("I thought: {content}"),
                    THOUGHT_IMPORTANCE,
                    None,
                    None,
                );

                self.event_log.add(
                    self.tick,
                    EventKind::Thought,
                    Some(agent.id.clone()),
                    Some(agent.name.clone()),
                    action.summary.clone().unwrap_or_else(|| content.clone()),
                    None,
                );

                agent.status = AgentStatus::Idle;
            }

            ActionKind::React { target, content } => {
                // Visible flourish only; leaves no memory trace
                self.bus
                    .broadcast(StreamMessage::AgentActionComplete(action.clone()));
                self.event_log.add(
                    self.tick,
                    EventKind::Speech,
                    Some(agent.id.clone()),
                    Some(agent.name.clone()),
                    content.clone(),
                    Some(target.to_string()),
                );
            }

            ActionKind::Wait => {
                agent.status = AgentStatus::Idle;
            }
        }
    }

    async fn run_reflection(&mut self, agent: &mut Agent) {
        let insights = reflect(agent, self.tick, &self.scenario.topic, self.decider.as_ref()).await;
        if insights.is_empty() {
            return;
        }

        self.bus.broadcast(StreamMessage::Reflection {
            agent_id: agent.id.clone(),
            reflections: insights.clone(),
        });

        for insight in insights {
            let thought = Action::new(
                agent.id.clone(),
                self.tick,
                ActionKind::Think {
                    content: insight.clone(),
                },
            )
            .with_summary(insight.clone())
            .with_emotion(agent.emotion)
            .with_confidence(0.8)
            .with_reasoning("Reflection on recent observations");
            self.bus
                .broadcast(StreamMessage::AgentActionComplete(thought));

            self.event_log.add(
                self.tick,
                EventKind::Reflection,
                Some(agent.id.clone()),
                Some(agent.name.clone()),
                insight,
                None,
            );
        }
    }

    /// Deliver moderator text to one agent or everyone, as a stored
    /// observation plus a perception for their next turn.
    pub fn inject(
        &mut self,
        text: &str,
        target: Option<&AgentId>,
        as_inner_voice: bool,
    ) -> Result<()> {
        if let Some(id) = target {
            if !self.agents.contains_key(id) {
                return Err(SimError::UnknownAgent(id.to_string()));
            }
        }

        let prefix = if as_inner_voice {
            "[Inner voice] "
        } else {
            "[Moderator announcement] "
        };
        let observation = format!("{prefix}{text}");

        let recipients: Vec<AgentId> = match target {
            Some(id) => vec![id.clone()],
            None => self.roster.clone(),
        };
        for id in &recipients {
            if let Some(agent) = self.agents.get_mut(id) {
                let zone = agent.current_zone.clone();
                agent.observe(self.tick, observation.clone(), INJECTION_IMPORTANCE, zone, None);
                self.cycle.add_perception(id, observation.clone());
            }
        }

        self.event_log.add(
            self.tick,
            EventKind::Injection,
            None,
            Some(
                target
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "all".to_string()),
            ),
            format!(
                "{}: {text}",
                if as_inner_voice { "Inner voice" } else { "Moderator" }
            ),
            None,
        );

        self.bus.broadcast(StreamMessage::Tick {
            tick: self.tick,
            simulation_time: format!("Tick {}", self.tick),
        });
        Ok(())
    }

    /// Manually move to the next phase
    pub fn advance_phase(&mut self) -> bool {
        match self.phases.advance_phase() {
            Some(next) => {
                self.announce_phase(&next.description);
                true
            }
            None => false,
        }
    }

    fn announce_phase(&mut self, description: &str) {
        let phase = self.phases.current_phase();
        let name = serde_json::to_value(phase.phase)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();

        info!(phase = %name, "phase change");
        self.bus.broadcast(StreamMessage::PhaseChange {
            phase: name.clone(),
            description: description.to_string(),
        });
        self.event_log.add(
            self.tick,
            EventKind::System,
            None,
            None,
            format!("Phase change: {description}"),
            None,
        );

        let guidance = self.phases.guidance();
        if !guidance.is_empty() {
            for id in &self.roster {
                self.cycle.add_perception(id, guidance);
            }
        }
    }

    /// Self-contained view of the current state
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            status: self.status,
            speed: self.speed,
            phase: self.phases.current_phase(),
            agents: self
                .roster
                .iter()
                .filter_map(|id| self.agents.get(id))
                .map(|a| a.state())
                .collect(),
            events: self
                .event_log
                .recent(self.config.recent_event_window)
                .to_vec(),
        }
    }
}

/// Forward decision tokens to the bus while the scheduler awaits the decision
fn spawn_token_forwarder(
    bus: EventBus,
    agent_id: AgentId,
    mut rx: tokio::sync::mpsc::UnboundedReceiver<String>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(token) = rx.recv().await {
            bus.broadcast(StreamMessage::AgentStreamToken {
                agent_id: agent_id.clone(),
                token,
            });
        }
    })
}
