//! Agent cognition: prompt assembly, decision cycle, reflection, phases

pub mod cycle;
pub mod phase;
pub mod prompts;
pub mod reflection;

pub use cycle::CognitiveCycle;
pub use phase::{PhaseConfig, PhaseManager, SimulationPhase};
pub use reflection::{reflect, should_reflect, REFLECTION_IMPORTANCE};
