//! Periodic synthesis of observations into higher-level insights
//!
//! When an agent's accumulated observation importance since its last
//! reflection crosses the threshold, recent observations are distilled into
//! up to three insight memories.

use tracing::debug;

use crate::agent::Agent;
use crate::cognition::prompts::build_reflection_prompt;
use crate::core::types::Tick;
use crate::llm::DecisionMaker;
use crate::memory::MemoryKind;

/// Observations fed into one reflection pass
const REFLECTION_SOURCE_LIMIT: usize = 10;

/// Importance assigned to synthesized reflections
pub const REFLECTION_IMPORTANCE: u8 = 7;

/// Whether this agent has accumulated enough unreflected importance
pub fn should_reflect(agent: &Agent, threshold: u32) -> bool {
    agent.memory.unreflected_importance() >= threshold
}

/// Synthesize insights from the agent's recent observations and store them
/// as reflection memories. Returns the insights for event emission.
pub async fn reflect(agent: &mut Agent, tick: Tick, topic: &str, decider: &dyn DecisionMaker) -> Vec<String> {
    let observations: Vec<String> = agent
        .memory
        .get_recent(Some(MemoryKind::Observation), REFLECTION_SOURCE_LIMIT)
        .iter()
        .map(|m| m.content.clone())
        .collect();

    if observations.is_empty() {
        return Vec::new();
    }

    let prompt = build_reflection_prompt(&agent.name, &agent.role, topic, &observations);
    let insights = decider.synthesize_reflections(&prompt).await;

    debug!(agent = %agent.id, count = insights.len(), "reflections synthesized");
    for insight in &insights {
        agent.reflect(tick, insight.clone(), REFLECTION_IMPORTANCE);
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentConfig};
    use crate::core::error::Result;
    use crate::core::types::{AgentId, Disposition, TilePos, ZoneId};
    use crate::llm::TokenSink;
    use crate::simulation::action::Action;
    use async_trait::async_trait;

    struct FixedReflector(Vec<String>);

    #[async_trait]
    impl DecisionMaker for FixedReflector {
        async fn decide(
            &self,
            agent_id: &AgentId,
            tick: Tick,
            _prompt: &str,
            _tokens: Option<TokenSink>,
        ) -> Result<Action> {
            Ok(Action::wait(agent_id.clone(), tick, "idle"))
        }

        async fn score_importance(&self, _text: &str) -> u8 {
            5
        }

        async fn synthesize_reflections(&self, _prompt: &str) -> Vec<String> {
            self.0.clone()
        }
    }

    fn make_agent() -> Agent {
        let config = AgentConfig {
            id: AgentId::new("whisperer"),
            name: "The Whisperer".into(),
            role: "VP Sales".into(),
            disposition: Disposition::Collaborative,
            starting_location: ZoneId::new("office_whisperer"),
            persona: "You read the room.".into(),
        };
        Agent::from_config(&config, TilePos { x: 32, y: 13 })
    }

    #[test]
    fn test_threshold_trip() {
        let mut agent = make_agent();
        agent.observe(1, "a", 5, None, None);
        agent.observe(1, "b", 5, None, None);
        assert!(!should_reflect(&agent, 15));
        agent.observe(2, "c", 6, None, None);
        assert!(should_reflect(&agent, 15));
    }

    #[test]
    fn test_reflection_resets_accumulator() {
        let mut agent = make_agent();
        agent.observe(1, "a", 8, None, None);
        agent.observe(1, "b", 8, None, None);
        assert!(should_reflect(&agent, 15));
        agent.reflect(2, "insight", REFLECTION_IMPORTANCE);
        assert!(!should_reflect(&agent, 15));
    }

    #[tokio::test]
    async fn test_reflect_stores_insights() {
        let mut agent = make_agent();
        agent.observe(1, "The Visionary pushed hard for the pivot", 6, None, None);
        agent.observe(2, "The Skeptic cited CAC numbers", 6, None, None);

        let decider = FixedReflector(vec![
            "The pivot debate is really about risk tolerance.".into(),
            "Numbers alone won't settle this.".into(),
        ]);
        let insights = reflect(&mut agent, 3, "pivot discussion", &decider).await;
        assert_eq!(insights.len(), 2);

        let stored = agent.memory.get_recent(Some(MemoryKind::Reflection), 10);
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|m| m.importance == REFLECTION_IMPORTANCE));
    }

    #[tokio::test]
    async fn test_reflect_without_observations_is_noop() {
        let mut agent = make_agent();
        let decider = FixedReflector(vec!["should not appear".into()]);
        let insights = reflect(&mut agent, 1, "topic", &decider).await;
        assert!(insights.is_empty());
        assert!(agent.memory.is_empty());
    }
}
