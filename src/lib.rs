//! Think Tank - Multi-Agent Debate Simulation

pub mod agent;
pub mod cognition;
pub mod conversation;
pub mod core;
pub mod llm;
pub mod memory;
pub mod scenario;
pub mod simulation;
pub mod world;
