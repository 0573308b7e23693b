//! Structured actions — the decision-maker's output surface
//!
//! An action is produced once per agent per tick and is immutable once
//! executed. The variant set is closed so every executor match is exhaustive
//! and adding a variant is a compile-time-checked change.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Emotion, Tick, ZoneId};

/// Who a speech or reaction is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechTarget {
    All,
    #[serde(rename = "self")]
    Slf,
    #[serde(untagged)]
    Agent(AgentId),
}

impl SpeechTarget {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => Self::All,
            "self" => Self::Slf,
            other => Self::Agent(AgentId::new(other)),
        }
    }
}

impl std::fmt::Display for SpeechTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Slf => f.write_str("self"),
            Self::Agent(id) => f.write_str(id.as_str()),
        }
    }
}

/// The closed set of things an agent can do in one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum ActionKind {
    MoveTo {
        destination: ZoneId,
    },
    Speak {
        target: SpeechTarget,
        content: String,
        /// -1.0 (strongly disagree) to 1.0 (strongly agree) with the prior speaker
        #[serde(skip_serializing_if = "Option::is_none")]
        agreement_score: Option<f32>,
    },
    Think {
        content: String,
    },
    React {
        target: SpeechTarget,
        content: String,
    },
    Wait,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move_to",
            Self::Speak { .. } => "speak",
            Self::Think { .. } => "think",
            Self::React { .. } => "react",
            Self::Wait => "wait",
        }
    }
}

/// One agent's chosen action for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub agent_id: AgentId,
    pub tick: Tick,
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Punchy one-liner for display, <= 80 chars
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    /// 0.0 to 1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Action {
    pub fn new(agent_id: AgentId, tick: Tick, kind: ActionKind) -> Self {
        Self {
            agent_id,
            tick,
            kind,
            summary: None,
            emotion: None,
            confidence: None,
            reasoning: None,
        }
    }

    /// The fallback action when no decision can be made
    pub fn wait(agent_id: AgentId, tick: Tick, reasoning: impl Into<String>) -> Self {
        Self {
            reasoning: Some(reasoning.into()),
            ..Self::new(agent_id, tick, ActionKind::Wait)
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}
