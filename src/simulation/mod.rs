//! Tick loop, actions, events, and the ownership boundary around them

pub mod action;
pub mod events;
pub mod handle;
pub mod scheduler;
pub mod scripted;
pub mod snapshot;

pub use action::{Action, ActionKind, SpeechTarget};
pub use events::{EventBus, EventKind, EventLog, SimulationEvent, StreamMessage};
pub use handle::SimulationHandle;
pub use scheduler::Scheduler;
pub use scripted::ScriptedDecisionMaker;
pub use snapshot::{SimStatus, SimulationSnapshot};
