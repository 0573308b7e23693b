//! Scripted decision-maker for running without an LLM
//!
//! Each agent plays a fixed think/move/speak opening, then waits. Useful for
//! demos, and as the fallback when no API key is configured. The script is
//! keyed by agent id; unknown agents wait from the start.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::types::{AgentId, Emotion, Tick, ZoneId};
use crate::llm::decision::{DecisionMaker, TokenSink, DEFAULT_IMPORTANCE};
use crate::simulation::action::{Action, ActionKind, SpeechTarget};

/// Plays pre-authored openings for the default scenario roster
pub struct ScriptedDecisionMaker {
    playbooks: HashMap<AgentId, Vec<Action>>,
    cursor: Mutex<HashMap<AgentId, usize>>,
}

impl ScriptedDecisionMaker {
    pub fn new() -> Self {
        Self {
            playbooks: default_playbooks(),
            cursor: Mutex::new(HashMap::new()),
        }
    }

    /// Replace an agent's playbook (used by tests and custom scenarios)
    pub fn set_playbook(&mut self, agent_id: AgentId, actions: Vec<Action>) {
        self.playbooks.insert(agent_id, actions);
    }
}

impl Default for ScriptedDecisionMaker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DecisionMaker for ScriptedDecisionMaker {
    async fn decide(
        &self,
        agent_id: &AgentId,
        tick: Tick,
        _prompt: &str,
        tokens: Option<TokenSink>,
    ) -> Result<Action> {
        let next = {
            let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
            let index = cursor.entry(agent_id.clone()).or_insert(0);
            let action = self
                .playbooks
                .get(agent_id)
                .and_then(|actions| actions.get(*index))
                .cloned();
            if action.is_some() {
                *index += 1;
            }
            action
        };

        let mut action = match next {
            Some(action) => action,
            None => Action::wait(agent_id.clone(), tick, "Listening"),
        };
        action.agent_id = agent_id.clone();
        action.tick = tick;

        if let Some(sink) = tokens {
            if let ActionKind::Speak { content, .. } | ActionKind::Think { content } = &action.kind
            {
                let _ = sink.send(content.clone());
            }
        }
        Ok(action)
    }

    async fn score_importance(&self, _text: &str) -> u8 {
        DEFAULT_IMPORTANCE
    }

    async fn synthesize_reflections(&self, _prompt: &str) -> Vec<String> {
        Vec::new()
    }
}

fn default_playbooks() -> HashMap<AgentId, Vec<Action>> {
    let mut playbooks = HashMap::new();

    playbooks.insert(
        AgentId::new("visionary"),
        vec![
            think(
                "visionary",
                "Time to rally the team. The consumer market is massive.",
                "Thinking about the pivot opportunity",
                Emotion::Excited,
                0.9,
                "Reading the briefing",
            ),
            move_to("visionary", "boardroom", "Need to gather the team"),
            speak(
                "visionary",
                SpeechTarget::All,
                "Team, I've been thinking about this pivot. The consumer TAM is 50 million \
                 users. Even at 1% penetration, that's 500K users. This could be transformative.",
                "Consumer TAM is 50M — this could be huge",
                Emotion::Excited,
                0.85,
                0.8,
            ),
        ],
    );

    playbooks.insert(
        AgentId::new("skeptic"),
        vec![
            think(
                "skeptic",
                "Consumer CAC is astronomical. Need to check the numbers.",
                "Checking the financial implications",
                Emotion::Skeptical,
                0.8,
                "Numbers don't add up",
            ),
            move_to("skeptic", "boardroom", "Need to challenge assumptions"),
            speak(
                "skeptic",
                SpeechTarget::Agent(AgentId::new("visionary")),
                "Hold on. Consumer acquisition costs are 5-10x higher than enterprise. Our \
                 burn rate would triple. With $5M runway, we'd have maybe 8 months.",
                "CAC is 5-10x higher. 8 months of runway.",
                Emotion::Skeptical,
                0.9,
                -0.7,
            ),
        ],
    );

    playbooks.insert(
        AgentId::new("builder"),
        vec![
            think(
                "builder",
                "Product architecture needs significant rework for consumer UX.",
                "Assessing technical feasibility",
                Emotion::Neutral,
                0.7,
                "Evaluating engineering capacity",
            ),
            move_to("builder", "boardroom", "Sharing technical perspective"),
            speak(
                "builder",
                SpeechTarget::All,
                "From a technical standpoint, consumer UX needs a full rebuild. That's 6 \
                 months minimum with our team of 12.",
                "6 months of rework needed for consumer UX",
                Emotion::Uncertain,
                0.75,
                -0.3,
            ),
        ],
    );

    playbooks.insert(
        AgentId::new("whisperer"),
        vec![
            think(
                "whisperer",
                "Customer interviews show organic individual adoption. Data supports hybrid approach.",
                "Reviewing customer interview data",
                Emotion::Confident,
                0.8,
                "200+ interviews tell a story",
            ),
            move_to("whisperer", "boardroom", "Sharing customer data"),
            speak(
                "whisperer",
                SpeechTarget::All,
                "40% of our B2B users came from individual word-of-mouth. There's already \
                 organic consumer pull. We could add a consumer tier without a full pivot.",
                "40% of users came from organic individual adoption",
                Emotion::Confident,
                0.85,
                0.4,
            ),
        ],
    );

    playbooks.insert(
        AgentId::new("devil"),
        vec![
            think(
                "devil",
                "Everyone will have strong opinions. My job is to find blind spots.",
                "Preparing to challenge consensus",
                Emotion::Amused,
                0.9,
                "Preventing groupthink",
            ),
            move_to("devil", "boardroom", "Where the action is"),
            speak(
                "devil",
                SpeechTarget::All,
                "Has anyone asked why our B2B growth is 15% MoM? That's exceptional. Why \
                 abandon a winning strategy? What if the consumer opportunity is a mirage?",
                "Why abandon 15% MoM growth? Is B2C a mirage?",
                Emotion::Skeptical,
                0.85,
                -0.5,
            ),
        ],
    );

    playbooks
}

fn think(
    id: &str,
    content: &str,
    summary: &str,
    emotion: Emotion,
    confidence: f32,
    reasoning: &str,
) -> Action {
    Action::new(
        AgentId::new(id),
        0,
        ActionKind::Think {
            content: content.into(),
        },
    )
    .with_summary(summary)
    .with_emotion(emotion)
    .with_confidence(confidence)
    .with_reasoning(reasoning)
}

fn move_to(id: &str, destination: &str, reasoning: &str) -> Action {
    Action::new(
        AgentId::new(id),
        0,
        ActionKind::MoveTo {
            destination: ZoneId::new(destination),
        },
    )
    .with_reasoning(reasoning)
}

#[allow(clippy::too_many_arguments)]
fn speak(
    id: &str,
    target: SpeechTarget,
    content: &str,
    summary: &str,
    emotion: Emotion,
    confidence: f32,
    agreement: f32,
) -> Action {
    Action::new(
        AgentId::new(id),
        0,
        ActionKind::Speak {
            target,
            content: content.into(),
            agreement_score: Some(agreement),
        },
    )
    .with_summary(summary)
    .with_emotion(emotion)
    .with_confidence(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_playbook_sequence_then_wait() {
        let scripted = ScriptedDecisionMaker::new();
        let id = AgentId::new("visionary");

        let first = scripted.decide(&id, 1, "", None).await.unwrap();
        assert!(matches!(first.kind, ActionKind::Think { .. }));
        assert_eq!(first.tick, 1);

        let second = scripted.decide(&id, 2, "", None).await.unwrap();
        assert_eq!(
            second.kind,
            ActionKind::MoveTo {
                destination: ZoneId::new("boardroom")
            }
        );

        let third = scripted.decide(&id, 3, "", None).await.unwrap();
        assert!(matches!(third.kind, ActionKind::Speak { .. }));

        let fourth = scripted.decide(&id, 4, "", None).await.unwrap();
        assert_eq!(fourth.kind, ActionKind::Wait);
        assert_eq!(fourth.reasoning.as_deref(), Some("Listening"));
    }

    #[tokio::test]
    async fn test_unknown_agent_waits() {
        let scripted = ScriptedDecisionMaker::new();
        let action = scripted
            .decide(&AgentId::new("stranger"), 1, "", None)
            .await
            .unwrap();
        assert_eq!(action.kind, ActionKind::Wait);
    }

    #[tokio::test]
    async fn test_speech_content_streams() {
        let scripted = ScriptedDecisionMaker::new();
        let id = AgentId::new("devil");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        scripted.decide(&id, 1, "", Some(tx)).await.unwrap();
        let token = rx.try_recv().unwrap();
        assert!(token.contains("blind spots"));
    }

    #[tokio::test]
    async fn test_all_five_agents_scripted() {
        let scripted = ScriptedDecisionMaker::new();
        for id in ["visionary", "skeptic", "builder", "whisperer", "devil"] {
            let action = scripted.decide(&AgentId::new(id), 1, "", None).await.unwrap();
            assert!(
                matches!(action.kind, ActionKind::Think { .. }),
                "{id} should open by thinking"
            );
        }
    }
}
