//! Optional structured phase progression
//!
//! Phases: Setup → Gather → Open Discussion → Breakout → Reconvene → Decision.
//! When disabled the simulation runs free-form and phase guidance is empty.

use serde::{Deserialize, Serialize};

/// Named stage of a structured session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationPhase {
    Setup,
    Gather,
    OpenDiscussion,
    Breakout,
    Reconvene,
    Decision,
    FreeForm,
}

/// One stage plus its advancement rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub phase: SimulationPhase,
    pub description: String,
    /// Auto-advance after this many ticks in the phase; `None` means manual
    pub auto_advance_ticks: Option<u32>,
}

fn phase_sequence() -> Vec<PhaseConfig> {
    vec![
        PhaseConfig {
            phase: SimulationPhase::Setup,
            description: "Agents read the scenario briefing and form initial thoughts.".into(),
            auto_advance_ticks: Some(3),
        },
        PhaseConfig {
            phase: SimulationPhase::Gather,
            description: "Agents move to the Boardroom for discussion.".into(),
            auto_advance_ticks: Some(5),
        },
        PhaseConfig {
            phase: SimulationPhase::OpenDiscussion,
            description: "Free-form debate. Agents discuss the topic openly.".into(),
            auto_advance_ticks: None,
        },
        PhaseConfig {
            phase: SimulationPhase::Breakout,
            description: "Agents may split into sub-groups at different locations.".into(),
            auto_advance_ticks: None,
        },
        PhaseConfig {
            phase: SimulationPhase::Reconvene,
            description: "Agents return to the Boardroom to share findings.".into(),
            auto_advance_ticks: None,
        },
        PhaseConfig {
            phase: SimulationPhase::Decision,
            description: "Final statements and vote.".into(),
            auto_advance_ticks: None,
        },
    ]
}

fn free_form() -> PhaseConfig {
    PhaseConfig {
        phase: SimulationPhase::FreeForm,
        description: "Free-form simulation.".into(),
        auto_advance_ticks: None,
    }
}

/// Tracks the current phase and its tick budget
#[derive(Debug)]
pub struct PhaseManager {
    enabled: bool,
    phases: Vec<PhaseConfig>,
    current_index: usize,
    ticks_in_phase: u32,
}

impl PhaseManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            phases: phase_sequence(),
            current_index: 0,
            ticks_in_phase: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
        self.current_index = 0;
        self.ticks_in_phase = 0;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn current_phase(&self) -> PhaseConfig {
        if !self.enabled {
            return free_form();
        }
        self.phases
            .get(self.current_index)
            .cloned()
            .unwrap_or_else(free_form)
    }

    /// Call once per tick. Returns the new phase if an auto-advance fired.
    pub fn tick(&mut self) -> Option<PhaseConfig> {
        if !self.enabled {
            return None;
        }

        self.ticks_in_phase += 1;
        let current = self.current_phase();

        match current.auto_advance_ticks {
            Some(budget) if self.ticks_in_phase >= budget => self.advance_phase(),
            _ => None,
        }
    }

    /// Advance to the next phase. Returns the new phase, or `None` at the end.
    pub fn advance_phase(&mut self) -> Option<PhaseConfig> {
        if !self.enabled || self.current_index + 1 >= self.phases.len() {
            return None;
        }
        self.current_index += 1;
        self.ticks_in_phase = 0;
        Some(self.current_phase())
    }

    /// Guidance text injected into agents' perceptions for the current phase
    pub fn guidance(&self) -> &'static str {
        if !self.enabled {
            return "";
        }
        match self.current_phase().phase {
            SimulationPhase::Setup => {
                "You are in the Setup phase. Read the scenario briefing carefully and form \
                 your initial thoughts. Go to your office to think."
            }
            SimulationPhase::Gather => {
                "It's time to gather. Move to The Boardroom for the group discussion."
            }
            SimulationPhase::OpenDiscussion => {
                "Open discussion is underway. Share your perspective and engage with others' arguments."
            }
            SimulationPhase::Breakout => {
                "You may break out into smaller groups. Consider going to the Whiteboard Corner \
                 or Library to think through specific aspects."
            }
            SimulationPhase::Reconvene => {
                "Time to reconvene. Return to The Boardroom and share what you've concluded."
            }
            SimulationPhase::Decision => {
                "Final round. Make your recommendation and explain your reasoning. Be clear \
                 about your position."
            }
            SimulationPhase::FreeForm => "",
        }
    }
}

impl Default for PhaseManager {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_free_form() {
        let mut manager = PhaseManager::new(false);
        assert_eq!(manager.current_phase().phase, SimulationPhase::FreeForm);
        assert!(manager.tick().is_none());
        assert!(manager.advance_phase().is_none());
        assert_eq!(manager.guidance(), "");
    }

    #[test]
    fn test_setup_auto_advances_after_three_ticks() {
        let mut manager = PhaseManager::new(true);
        assert_eq!(manager.current_phase().phase, SimulationPhase::Setup);
        assert!(manager.tick().is_none());
        assert!(manager.tick().is_none());
        let next = manager.tick().unwrap();
        assert_eq!(next.phase, SimulationPhase::Gather);
    }

    #[test]
    fn test_manual_advance_resets_counter() {
        let mut manager = PhaseManager::new(true);
        manager.tick();
        let next = manager.advance_phase().unwrap();
        assert_eq!(next.phase, SimulationPhase::Gather);
        // Gather needs 5 ticks from zero
        for _ in 0..4 {
            assert!(manager.tick().is_none());
        }
        assert_eq!(manager.tick().unwrap().phase, SimulationPhase::OpenDiscussion);
    }

    #[test]
    fn test_no_advance_past_decision() {
        let mut manager = PhaseManager::new(true);
        for _ in 0..5 {
            manager.advance_phase();
        }
        assert_eq!(manager.current_phase().phase, SimulationPhase::Decision);
        assert!(manager.advance_phase().is_none());
        assert_eq!(manager.current_phase().phase, SimulationPhase::Decision);
    }

    #[test]
    fn test_open_discussion_never_auto_advances() {
        let mut manager = PhaseManager::new(true);
        manager.advance_phase();
        manager.advance_phase();
        assert_eq!(manager.current_phase().phase, SimulationPhase::OpenDiscussion);
        for _ in 0..50 {
            assert!(manager.tick().is_none());
        }
    }

    #[test]
    fn test_guidance_non_empty_when_enabled() {
        let mut manager = PhaseManager::new(true);
        loop {
            assert!(!manager.guidance().is_empty());
            if manager.advance_phase().is_none() {
                break;
            }
        }
    }
}
