//! Decision-maker contract — the simulation's only unreliable collaborator
//!
//! The scheduler never talks to an LLM provider directly; it goes through
//! this trait. Implementations may stream partial text through the token
//! sink before resolving to one structured action. Callers treat every
//! failure as recoverable: a failed `decide` becomes a `wait`, and the
//! best-effort calls return defaults instead of erroring.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::error::Result;
use crate::core::types::{AgentId, Tick};
use crate::simulation::action::Action;

/// Channel end that receives streamed prompt-response tokens
pub type TokenSink = mpsc::UnboundedSender<String>;

/// Default importance when scoring is unavailable
pub const DEFAULT_IMPORTANCE: u8 = 5;

#[async_trait]
pub trait DecisionMaker: Send + Sync {
    /// Produce one structured action for the agent's turn.
    ///
    /// May stream zero or more text tokens into `tokens` before resolving.
    /// An error here is recovered by the caller as a `wait` action.
    async fn decide(
        &self,
        agent_id: &AgentId,
        tick: Tick,
        prompt: &str,
        tokens: Option<TokenSink>,
    ) -> Result<Action>;

    /// Rate a memory's importance, 1..=10. Best-effort; failures yield
    /// [`DEFAULT_IMPORTANCE`].
    async fn score_importance(&self, text: &str) -> u8;

    /// Synthesize high-level insight strings from a reflection prompt.
    /// Best-effort; failures yield an empty list.
    async fn synthesize_reflections(&self, prompt: &str) -> Vec<String>;
}
