//! Ownership boundary between the simulation and its callers
//!
//! One tokio task owns the [`Scheduler`] exclusively; everything else talks
//! to it through a [`SimulationHandle`]. The task multiplexes control
//! commands with the tick timer, so pausing takes effect before the next
//! tick and a step never races a scheduled one.

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::debug;

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Tick};
use crate::simulation::events::{EventBus, StreamMessage};
use crate::simulation::scheduler::Scheduler;
use crate::simulation::snapshot::{SimStatus, SimulationSnapshot};

enum Command {
    Start,
    Pause,
    Step(oneshot::Sender<Tick>),
    Reset(oneshot::Sender<Result<()>>),
    Inject {
        text: String,
        target: Option<AgentId>,
        as_inner_voice: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    SetSpeed(f32, oneshot::Sender<Result<()>>),
    AdvancePhase(oneshot::Sender<bool>),
    Snapshot(oneshot::Sender<SimulationSnapshot>),
    Shutdown,
}

/// Cloneable remote control for a running simulation task
#[derive(Clone)]
pub struct SimulationHandle {
    tx: mpsc::UnboundedSender<Command>,
    bus: EventBus,
}

impl SimulationHandle {
    /// Move the scheduler onto its own task and return the control handle.
    pub fn spawn(scheduler: Scheduler) -> Self {
        let bus = scheduler.bus();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_loop(scheduler, rx));
        Self { tx, bus }
    }

    /// Start (or resume) the tick timer
    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    /// Stop the tick timer; in-flight ticks finish first
    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    /// Run exactly one tick and stay paused. Resolves after the tick.
    pub async fn step(&self) -> Result<Tick> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Step(reply))?;
        rx.await.map_err(|_| SimError::ChannelClosed)
    }

    /// Reset to tick zero with the same scenario
    pub async fn reset(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset(reply))?;
        rx.await.map_err(|_| SimError::ChannelClosed)?
    }

    /// Deliver moderator text to one agent or everyone
    pub async fn inject(
        &self,
        text: impl Into<String>,
        target: Option<AgentId>,
        as_inner_voice: bool,
    ) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Inject {
            text: text.into(),
            target,
            as_inner_voice,
            reply,
        })?;
        rx.await.map_err(|_| SimError::ChannelClosed)?
    }

    pub async fn set_speed(&self, speed: f32) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetSpeed(speed, reply))?;
        rx.await.map_err(|_| SimError::ChannelClosed)?
    }

    /// Manually advance the structured phase. Returns false at the end.
    pub async fn advance_phase(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AdvancePhase(reply))?;
        rx.await.map_err(|_| SimError::ChannelClosed)
    }

    pub async fn snapshot(&self) -> Result<SimulationSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| SimError::ChannelClosed)
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }

    /// Subscribe to the live stream. Unsubscribe by dropping the receiver.
    pub fn subscribe(&self) -> (u64, mpsc::UnboundedReceiver<StreamMessage>) {
        self.bus.subscribe()
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| SimError::ChannelClosed)
    }
}

async fn run_loop(mut scheduler: Scheduler, mut rx: mpsc::UnboundedReceiver<Command>) {
    // When the timer is armed this is the next tick deadline
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = rx.recv() => {
                match command {
                    Some(Command::Start) => {
                        if scheduler.status() != SimStatus::Running {
                            scheduler.set_status(SimStatus::Running);
                            scheduler.run_tick().await;
                            deadline = Some(Instant::now() + scheduler.tick_delay());
                        }
                    }
                    Some(Command::Pause) => {
                        scheduler.set_status(SimStatus::Paused);
                        deadline = None;
                    }
                    Some(Command::Step(reply)) => {
                        scheduler.set_status(SimStatus::Paused);
                        deadline = None;
                        scheduler.run_tick().await;
                        let _ = reply.send(scheduler.tick());
                    }
                    Some(Command::Reset(reply)) => {
                        deadline = None;
                        let _ = reply.send(scheduler.initialize());
                    }
                    Some(Command::Inject { text, target, as_inner_voice, reply }) => {
                        let _ = reply.send(scheduler.inject(&text, target.as_ref(), as_inner_voice));
                    }
                    Some(Command::SetSpeed(speed, reply)) => {
                        let _ = reply.send(scheduler.set_speed(speed));
                    }
                    Some(Command::AdvancePhase(reply)) => {
                        let _ = reply.send(scheduler.advance_phase());
                    }
                    Some(Command::Snapshot(reply)) => {
                        let _ = reply.send(scheduler.snapshot());
                    }
                    Some(Command::Shutdown) | None => {
                        debug!("simulation task shutting down");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                scheduler.run_tick().await;
                deadline = Some(Instant::now() + scheduler.tick_delay());
            }
        }
    }
}
