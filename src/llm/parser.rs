//! Parse LLM responses into structured actions
//!
//! The model is instructed to answer with a single flat JSON object. This
//! module extracts that object from whatever prose surrounds it and converts
//! the raw fields into the closed [`Action`] type, rejecting anything that
//! does not name a known action variant.

use serde::Deserialize;

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Emotion, Tick, ZoneId};
use crate::simulation::action::{Action, ActionKind, SpeechTarget};

/// Flat wire form the model produces
#[derive(Debug, Deserialize)]
pub struct RawAction {
    pub action_type: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub emotion: Option<Emotion>,
    #[serde(default)]
    pub agreement_score: Option<f32>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Extract the outermost JSON object from a response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| SimError::Llm("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| SimError::Llm("No closing brace found in response".into()))?;
    Ok(&response[start..=end])
}

/// Parse a full model response into an [`Action`] for the given agent turn
pub fn parse_action(response: &str, agent_id: &AgentId, tick: Tick) -> Result<Action> {
    let json = extract_json(response)?;
    let raw: RawAction = serde_json::from_str(json)
        .map_err(|e| SimError::Llm(format!("Malformed action JSON: {e} - Response: {response}")))?;
    raw_to_action(raw, agent_id, tick)
}

fn raw_to_action(raw: RawAction, agent_id: &AgentId, tick: Tick) -> Result<Action> {
    let kind = match raw.action_type.as_str() {
        "move_to" => {
            let destination = raw
                .destination
                .ok_or_else(|| SimError::InvalidAction("move_to without destination".into()))?;
            ActionKind::MoveTo {
                destination: ZoneId::new(destination),
            }
        }
        "speak" => ActionKind::Speak {
            target: raw
                .target
                .as_deref()
                .map(SpeechTarget::parse)
                .unwrap_or(SpeechTarget::All),
            content: raw
                .content
                .ok_or_else(|| SimError::InvalidAction("speak without content".into()))?,
            agreement_score: raw.agreement_score.map(|s| s.clamp(-1.0, 1.0)),
        },
        "think" => ActionKind::Think {
            content: raw
                .content
                .ok_or_else(|| SimError::InvalidAction("think without content".into()))?,
        },
        "react" => ActionKind::React {
            target: raw
                .target
                .as_deref()
                .map(SpeechTarget::parse)
                .unwrap_or(SpeechTarget::All),
            content: raw.content.unwrap_or_default(),
        },
        "wait" => ActionKind::Wait,
        other => {
            return Err(SimError::InvalidAction(format!(
                "Unknown action type: {other}"
            )))
        }
    };

    let mut action = Action::new(agent_id.clone(), tick, kind);
    action.summary = raw.summary;
    action.emotion = raw.emotion;
    action.confidence = raw.confidence.map(|c| c.clamp(0.0, 1.0));
    action.reasoning = raw.reasoning;
    Ok(action)
}
