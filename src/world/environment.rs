//! Environment model — the static world hierarchy rendered for prompts
//!
//! A two-level tree: the world contains locations, locations contain objects.
//! Its only runtime job is producing a natural-language description an agent
//! can reason about.

use crate::core::types::ZoneId;
use crate::world::zones::ZoneRegistry;

/// A location node and the objects it contains
#[derive(Debug, Clone)]
pub struct Location {
    pub id: ZoneId,
    pub name: String,
    pub objects: Vec<String>,
}

/// Static hierarchical description of the world
#[derive(Debug, Clone)]
pub struct EnvironmentTree {
    world_name: String,
    locations: Vec<Location>,
}

impl EnvironmentTree {
    /// Build the environment from the zone registry
    pub fn from_registry(world_name: impl Into<String>, registry: &ZoneRegistry) -> Self {
        Self {
            world_name: world_name.into(),
            locations: registry
                .all()
                .iter()
                .map(|z| Location {
                    id: z.id.clone(),
                    name: z.name.clone(),
                    objects: z.objects.clone(),
                })
                .collect(),
        }
    }

    pub fn world_name(&self) -> &str {
        &self.world_name
    }

    pub fn location(&self, id: &ZoneId) -> Option<&Location> {
        self.locations.iter().find(|l| &l.id == id)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Render the world as prose for a decision prompt
    pub fn to_natural_language(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("You are in {}.\n", self.world_name));
        s.push_str("Available locations:\n");
        for loc in &self.locations {
            if loc.objects.is_empty() {
                s.push_str(&format!("- {}\n", loc.name));
            } else {
                s.push_str(&format!(
                    "- {} (contains: {})\n",
                    loc.name,
                    loc.objects.join(", ")
                ));
            }
        }
        s
    }
}

impl Default for EnvironmentTree {
    fn default() -> Self {
        Self::from_registry("The Think Tank", &ZoneRegistry::think_tank())
    }
}
