//! Simulation configuration with documented constants
//!
//! All tuning knobs are collected here with explanations of their purpose
//! and how they interact with each other.

use crate::core::error::{Result, SimError};

/// Configuration for the simulation core
///
/// These values reproduce the pacing of the reference scenario. Changing them
/// affects how quickly the debate unfolds, not its correctness.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // === SCHEDULING ===
    /// Milliseconds between ticks when the timer loop is running
    ///
    /// The effective delay is `tick_interval_ms / speed`.
    pub tick_interval_ms: u64,

    /// Playback speed multiplier (0.5, 1, 2, 4; divides the tick interval)
    pub speed: f32,

    /// Pause between agent turns within one tick, scripted mode (ms)
    ///
    /// Pacing only. Spreads event bursts out for observers; no invariant
    /// depends on it, and tests set it to 0.
    pub scripted_pace_ms: u64,

    /// Pause between agent turns within one tick, live decision-maker mode (ms)
    pub live_pace_ms: u64,

    // === COGNITION ===
    /// Accumulated observation importance that triggers a reflection
    ///
    /// At the default (15), three mid-importance observations (5+5+5) or two
    /// speech perceptions plus anything else will trip the threshold.
    pub reflection_threshold: u32,

    /// How many memories a decision context retrieves
    pub retrieval_limit: usize,

    /// How many reflections a decision context includes
    pub reflection_context_limit: usize,

    /// How many conversation turns the prompt tail includes
    pub conversation_tail: usize,

    // === BOOKKEEPING ===
    /// Stored conversation turns per zone (older turns are trimmed)
    pub conversation_turn_cap: usize,

    /// Events included in a pull snapshot
    pub recent_event_window: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 3000,
            speed: 1.0,
            scripted_pace_ms: 100,
            live_pace_ms: 500,

            reflection_threshold: 15,
            retrieval_limit: 10,
            reflection_context_limit: 3,
            conversation_tail: 5,

            conversation_turn_cap: 20,
            recent_event_window: 20,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with all pacing delays zeroed, for tests and batch runs
    pub fn unpaced() -> Self {
        Self {
            scripted_pace_ms: 0,
            live_pace_ms: 0,
            ..Self::default()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.speed <= 0.0 {
            return Err(SimError::Config(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(SimError::Config("tick_interval_ms must be nonzero".into()));
        }
        if self.retrieval_limit == 0 {
            return Err(SimError::Config("retrieval_limit must be nonzero".into()));
        }
        if self.conversation_tail > self.conversation_turn_cap {
            return Err(SimError::Config(format!(
                "conversation_tail ({}) exceeds conversation_turn_cap ({})",
                self.conversation_tail, self.conversation_turn_cap
            )));
        }
        Ok(())
    }
}
