//! Scenario definitions — briefing, discussion topic, and personas
//!
//! A scenario is everything the simulation needs to start a debate: the
//! briefing every agent reads at tick 0, the fixed topic string memory
//! retrieval scores against, and the cast of personas. Scenarios load from
//! TOML files; the built-in default needs no file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::AgentConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Disposition, ZoneId};

/// A complete debate setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Scenario briefing recorded as every agent's first memory
    pub briefing: String,
    /// Fixed context string used for memory retrieval scoring
    pub topic: String,
    pub agents: Vec<AgentConfig>,
}

impl Scenario {
    /// Load a scenario from a TOML file
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let scenario: Scenario =
            toml::from_str(&raw).map_err(|e| SimError::Config(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(SimError::Config("scenario has no agents".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for agent in &self.agents {
            if !seen.insert(&agent.id) {
                return Err(SimError::Config(format!(
                    "duplicate agent id: {}",
                    agent.id
                )));
            }
        }
        Ok(())
    }

    /// The built-in board debate: should the startup pivot from B2B to B2C?
    pub fn pivot_debate() -> Self {
        fn agent(
            id: &str,
            name: &str,
            role: &str,
            disposition: Disposition,
            starting_location: &str,
            persona: &str,
        ) -> AgentConfig {
            AgentConfig {
                id: AgentId::new(id),
                name: name.into(),
                role: role.into(),
                disposition,
                starting_location: ZoneId::new(starting_location),
                persona: persona.into(),
            }
        }

        Self {
            id: "b2b-b2c-pivot".into(),
            name: "Should our startup pivot from B2B to B2C?".into(),
            briefing: "The board has asked the leadership team to evaluate whether the company \
                should pivot from its current B2B SaaS model to a B2C consumer product. The B2B \
                business is generating $2M ARR with 15% month-over-month growth, but the team \
                believes the consumer market opportunity is 100x larger. The company has $5M in \
                runway. The board wants a recommendation by end of week. Each team member should \
                evaluate this from their area of expertise and discuss."
                .into(),
            topic: "pivot B2B B2C discussion".into(),
            agents: vec![
                agent(
                    "visionary",
                    "The Visionary",
                    "CEO",
                    Disposition::Collaborative,
                    "office_visionary",
                    "You are The Visionary, a startup CEO who thinks in terms of market \
                     opportunity and bold moves. You're excited about the B2C pivot because you \
                     see a massive TAM of 50M consumers. You tend to inspire others but sometimes \
                     overlook execution details. You believe in moving fast and iterating.",
                ),
                agent(
                    "skeptic",
                    "The Skeptic",
                    "CFO",
                    Disposition::Adversarial,
                    "office_skeptic",
                    "You are The Skeptic, a cautious CFO who demands evidence before any major \
                     decision. You're concerned about the B2C pivot because consumer acquisition \
                     costs are 5-10x higher than enterprise, the burn rate would triple, and the \
                     company has zero consumer brand recognition. You challenge assumptions \
                     relentlessly but fairly. You respect data above all.",
                ),
                agent(
                    "builder",
                    "The Builder",
                    "CTO",
                    Disposition::Neutral,
                    "office_builder",
                    "You are The Builder, a pragmatic CTO who thinks about what's technically \
                     feasible and what the team of 12 engineers can actually ship in 6 months. \
                     You have concerns about rebuilding the product for consumer UX, but you also \
                     see technical advantages in the pivot. You're honest about timelines.",
                ),
                agent(
                    "whisperer",
                    "The Customer Whisperer",
                    "Head of Product",
                    Disposition::Collaborative,
                    "office_whisperer",
                    "You are The Customer Whisperer, head of product who deeply understands user \
                     needs through 200+ customer interviews. You have data showing that 40% of \
                     B2B users actually came through word-of-mouth from individual users who \
                     loved the product. This makes you believe a B2C play has organic potential. \
                     You think about product-market fit above all.",
                ),
                agent(
                    "devil",
                    "Devil's Advocate",
                    "Board Advisor",
                    Disposition::Adversarial,
                    "office_devil",
                    "You are the Devil's Advocate, a board advisor whose explicit role is to \
                     challenge every argument, find weaknesses, and prevent groupthink. You don't \
                     have a personal position on the pivot — your job is to stress-test whatever \
                     the current consensus is. If everyone agrees, you disagree. If everyone \
                     disagrees, you find the case for agreement. You ask uncomfortable questions.",
                ),
            ],
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::pivot_debate()
    }
}
