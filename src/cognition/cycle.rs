//! Per-agent cognitive cycle: perceive, plan, act
//!
//! Drives one agent's decision per tick. Perceptions queued by other agents'
//! actions are delivered exactly once, on the perceiving agent's next turn.

use std::collections::HashMap;

use tracing::warn;

use crate::agent::Agent;
use crate::cognition::prompts::build_decision_prompt;
use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, Tick, ZoneId};
use crate::llm::{DecisionMaker, TokenSink};
use crate::simulation::action::Action;
use crate::world::EnvironmentTree;

/// Conversation scrollback lines kept per zone for prompt assembly
const SCROLLBACK_CAP: usize = 20;

/// Prompt-side state for the perceive/plan/act loop
#[derive(Debug, Default)]
pub struct CognitiveCycle {
    /// Perceptions waiting for each agent's next turn. Drained on delivery.
    pending_perceptions: HashMap<AgentId, Vec<String>>,
    /// Rendered conversation lines per zone, oldest-first
    scrollback: HashMap<ZoneId, Vec<String>>,
}

impl CognitiveCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pending_perceptions.clear();
        self.scrollback.clear();
    }

    /// Queue a perception for delivery on the agent's next turn
    pub fn add_perception(&mut self, agent_id: &AgentId, perception: impl Into<String>) {
        self.pending_perceptions
            .entry(agent_id.clone())
            .or_default()
            .push(perception.into());
    }

    /// Number of perceptions currently queued for an agent
    pub fn pending_count(&self, agent_id: &AgentId) -> usize {
        self.pending_perceptions
            .get(agent_id)
            .map_or(0, |p| p.len())
    }

    /// Record a rendered conversation line in a zone's scrollback
    pub fn add_conversation_turn(&mut self, zone: &ZoneId, line: impl Into<String>) {
        let history = self.scrollback.entry(zone.clone()).or_default();
        history.push(line.into());
        if history.len() > SCROLLBACK_CAP {
            let excess = history.len() - SCROLLBACK_CAP;
            history.drain(..excess);
        }
    }

    /// Run one cognitive cycle for an agent and return their chosen action.
    ///
    /// On any decision-maker failure the agent falls back to waiting; the
    /// error never propagates past this boundary. Queued perceptions are
    /// consumed here whether or not the decision succeeds.
    #[allow(clippy::too_many_arguments)]
    pub async fn decide(
        &mut self,
        agent: &mut Agent,
        nearby: &[String],
        env: &EnvironmentTree,
        topic: &str,
        config: &SimulationConfig,
        decider: &dyn DecisionMaker,
        tick: Tick,
        tokens: Option<TokenSink>,
    ) -> Action {
        let conversation: Vec<String> = agent
            .current_zone
            .as_ref()
            .and_then(|zone| self.scrollback.get(zone))
            .map(|lines| {
                let tail = lines.len().saturating_sub(config.conversation_tail);
                lines[tail..].to_vec()
            })
            .unwrap_or_default();

        let perceptions = self
            .pending_perceptions
            .remove(&agent.id)
            .unwrap_or_default();

        let retrieved = agent.memory.retrieve(tick, topic, config.retrieval_limit);
        let reflections: Vec<String> = agent
            .memory
            .get_recent(
                Some(crate::memory::MemoryKind::Reflection),
                config.reflection_context_limit,
            )
            .iter()
            .map(|m| m.content.clone())
            .collect();

        let prompt = build_decision_prompt(
            agent,
            &retrieved,
            &reflections,
            env,
            nearby,
            &conversation,
            &perceptions,
        );

        match decider.decide(&agent.id, tick, &prompt, tokens).await {
            Ok(action) => {
                if let Some(emotion) = action.emotion {
                    agent.emotion = emotion;
                }
                agent.current_plan = action.reasoning.clone();
                action
            }
            Err(e) => {
                warn!(agent = %agent.id, error = %e, "decision failed, agent waits");
                Action::wait(agent.id.clone(), tick, "Could not determine action")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::core::error::Result;
    use crate::core::types::{Disposition, Emotion, TilePos};
    use crate::simulation::action::ActionKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedDecider {
        prompts: Mutex<Vec<String>>,
        response: Result<Action>,
    }

    impl CannedDecider {
        fn new(response: Result<Action>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                response,
            }
        }
    }

    #[async_trait]
    impl DecisionMaker for CannedDecider {
        async fn decide(
            &self,
            agent_id: &AgentId,
            tick: Tick,
            prompt: &str,
            _tokens: Option<TokenSink>,
        ) -> Result<Action> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.response {
                Ok(action) => {
                    let mut action = action.clone();
                    action.agent_id = agent_id.clone();
                    action.tick = tick;
                    Ok(action)
                }
                Err(_) => Err(crate::core::error::SimError::Llm("canned failure".into())),
            }
        }

        async fn score_importance(&self, _text: &str) -> u8 {
            5
        }

        async fn synthesize_reflections(&self, _prompt: &str) -> Vec<String> {
            Vec::new()
        }
    }

    fn make_agent() -> Agent {
        let config = AgentConfig {
            id: AgentId::new("builder"),
            name: "The Builder".into(),
            role: "CTO".into(),
            disposition: Disposition::Neutral,
            starting_location: ZoneId::new("boardroom"),
            persona: "You build things.".into(),
        };
        Agent::from_config(&config, TilePos { x: 20, y: 14 })
    }

    #[tokio::test]
    async fn test_perceptions_delivered_once() {
        let mut cycle = CognitiveCycle::new();
        let mut agent = make_agent();
        let env = EnvironmentTree::default();
        let config = SimulationConfig::unpaced();
        let decider = CannedDecider::new(Ok(Action::wait(agent.id.clone(), 0, "idle")));

        cycle.add_perception(&agent.id, "You hear a speech.");
        assert_eq!(cycle.pending_count(&agent.id), 1);

        cycle
            .decide(&mut agent, &[], &env, "topic", &config, &decider, 1, None)
            .await;
        assert_eq!(cycle.pending_count(&agent.id), 0);
        assert!(decider.prompts.lock().unwrap()[0].contains("You hear a speech."));

        cycle
            .decide(&mut agent, &[], &env, "topic", &config, &decider, 2, None)
            .await;
        assert!(decider.prompts.lock().unwrap()[1].contains("Nothing new since your last turn."));
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_wait() {
        let mut cycle = CognitiveCycle::new();
        let mut agent = make_agent();
        let env = EnvironmentTree::default();
        let config = SimulationConfig::unpaced();
        let decider = CannedDecider::new(Err(crate::core::error::SimError::Llm("down".into())));

        cycle.add_perception(&agent.id, "noise");
        let action = cycle
            .decide(&mut agent, &[], &env, "topic", &config, &decider, 3, None)
            .await;
        assert_eq!(action.kind, ActionKind::Wait);
        assert_eq!(action.reasoning.as_deref(), Some("Could not determine action"));
        // Perceptions are consumed even when the decision fails
        assert_eq!(cycle.pending_count(&agent.id), 0);
    }

    #[tokio::test]
    async fn test_successful_decision_updates_agent() {
        let mut cycle = CognitiveCycle::new();
        let mut agent = make_agent();
        let env = EnvironmentTree::default();
        let config = SimulationConfig::unpaced();
        let canned = Action::new(
            AgentId::new("builder"),
            0,
            ActionKind::Think {
                content: "Migration is the hard part.".into(),
            },
        )
        .with_emotion(Emotion::Uncertain)
        .with_reasoning("Weighing the migration cost");
        let decider = CannedDecider::new(Ok(canned));

        cycle
            .decide(&mut agent, &[], &env, "topic", &config, &decider, 1, None)
            .await;
        assert_eq!(agent.emotion, Emotion::Uncertain);
        assert_eq!(agent.current_plan.as_deref(), Some("Weighing the migration cost"));
    }

    #[tokio::test]
    async fn test_scrollback_capped_and_tailed() {
        let mut cycle = CognitiveCycle::new();
        let mut agent = make_agent();
        let env = EnvironmentTree::default();
        let config = SimulationConfig::unpaced();
        let decider = CannedDecider::new(Ok(Action::wait(agent.id.clone(), 0, "idle")));

        let zone = ZoneId::new("boardroom");
        for i in 0..30 {
            cycle.add_conversation_turn(&zone, format!("line {i}"));
        }
        assert_eq!(cycle.scrollback[&zone].len(), SCROLLBACK_CAP);

        cycle
            .decide(&mut agent, &[], &env, "topic", &config, &decider, 1, None)
            .await;
        let prompt = decider.prompts.lock().unwrap()[0].clone();
        // Only the configured tail reaches the prompt
        assert!(prompt.contains("line 29"));
        assert!(prompt.contains(&format!("line {}", 30 - config.conversation_tail)));
        assert!(!prompt.contains(&format!("line {}\n", 30 - config.conversation_tail - 1)));
    }
}
