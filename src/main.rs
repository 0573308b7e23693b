//! Think Tank - Entry Point
//!
//! Runs the multi-agent debate simulation from a terminal. Without an API
//! key the agents follow their scripted openings; with LLM_API_KEY set they
//! decide for themselves. The REPL drives the simulation task through its
//! handle; live events are drained and printed after each command.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;

use think_tank::core::config::SimulationConfig;
use think_tank::core::error::Result;
use think_tank::core::types::AgentId;
use think_tank::llm::{DecisionMaker, LlmClient};
use think_tank::scenario::Scenario;
use think_tank::simulation::{
    EventBus, Scheduler, ScriptedDecisionMaker, SimulationHandle, StreamMessage,
};

#[derive(Parser, Debug)]
#[command(name = "think-tank", about = "Multi-agent debate simulation")]
struct Args {
    /// Scenario TOML file (defaults to the built-in pivot debate)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Milliseconds between ticks when running freely
    #[arg(long, default_value_t = 3000)]
    interval_ms: u64,

    /// Run this many ticks non-interactively, then exit
    #[arg(long)]
    ticks: Option<u32>,

    /// Enable structured phase progression
    #[arg(long)]
    phases: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "think_tank=info".into()),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Think Tank starting...");

    let rt = Runtime::new()?;

    let scenario = match &args.scenario {
        Some(path) => Scenario::from_toml_path(path)?,
        None => Scenario::pivot_debate(),
    };

    let (decider, live): (Arc<dyn DecisionMaker>, bool) = match LlmClient::from_env() {
        Ok(client) => (Arc::new(client), true),
        Err(_) => {
            tracing::warn!("LLM_API_KEY not set - agents follow scripted openings");
            (Arc::new(ScriptedDecisionMaker::new()), false)
        }
    };

    let mut config = SimulationConfig::default();
    config.tick_interval_ms = args.interval_ms;

    let scheduler = Scheduler::new(
        scenario,
        config,
        decider,
        EventBus::new(),
        args.phases,
        live,
    )?;
    let handle = rt.block_on(async { SimulationHandle::spawn(scheduler) });
    let (_sub_id, mut stream) = handle.subscribe();

    if let Some(n) = args.ticks {
        for _ in 0..n {
            rt.block_on(handle.step())?;
            drain_stream(&mut stream);
        }
        handle.shutdown();
        return Ok(());
    }

    println!("\n=== THINK TANK ===");
    println!("Five experts, one boardroom, one decision");
    println!();
    println!("Commands:");
    println!("  tick / t           - Advance simulation by one tick");
    println!("  run <n>            - Run n ticks");
    println!("  start              - Run freely on the tick timer");
    println!("  pause              - Stop the tick timer");
    println!("  speed <x>          - Set playback speed (0.25-8)");
    println!("  status / s         - Show simulation status");
    println!("  inject <text>      - Moderator announcement to everyone");
    println!("  phase              - Show the current phase");
    println!("  snapshot           - Dump the full state as JSON");
    println!("  whisper <id> <text> - Inner voice for one agent");
    println!("  advance            - Advance the phase (with --phases)");
    println!("  reset              - Back to tick zero");
    println!("  quit / q           - Exit");
    println!();

    loop {
        drain_stream(&mut stream);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            let tick = rt.block_on(handle.step())?;
            drain_stream(&mut stream);
            println!("Tick {tick} complete.");
            continue;
        }

        if let Some(n) = input.strip_prefix("run ") {
            match n.trim().parse::<u32>() {
                Ok(n) => {
                    println!("Running {n} ticks...");
                    let mut last = 0;
                    for _ in 0..n {
                        last = rt.block_on(handle.step())?;
                        drain_stream(&mut stream);
                    }
                    println!("Completed {n} ticks. Now at tick {last}.");
                }
                Err(_) => println!("Usage: run <number>"),
            }
            continue;
        }

        if input == "start" {
            handle.start()?;
            println!("Running. Type 'pause' to stop.");
            continue;
        }

        if input == "pause" {
            handle.pause()?;
            continue;
        }

        if let Some(speed) = input.strip_prefix("speed ") {
            match speed.trim().parse::<f32>() {
                Ok(speed) => match rt.block_on(handle.set_speed(speed)) {
                    Ok(()) => println!("Speed set to {speed}x."),
                    Err(e) => println!("{e}"),
                },
                Err(_) => println!("Usage: speed <multiplier>"),
            }
            continue;
        }

        if input == "status" || input == "s" {
            print_status(&rt, &handle)?;
            continue;
        }

        if let Some(text) = input.strip_prefix("inject ") {
            rt.block_on(handle.inject(text, None, false))?;
            println!("Injected.");
            continue;
        }

        if let Some(rest) = input.strip_prefix("whisper ") {
            match rest.split_once(' ') {
                Some((id, text)) if !text.trim().is_empty() => {
                    match rt.block_on(handle.inject(text, Some(AgentId::new(id)), true)) {
                        Ok(()) => println!("Whispered to {id}."),
                        Err(e) => println!("{e}"),
                    }
                }
                _ => println!("Usage: whisper <agent_id> <text>"),
            }
            continue;
        }

        if input == "phase" {
            let snapshot = rt.block_on(handle.snapshot())?;
            println!("{}", snapshot.phase.description);
            continue;
        }

        if input == "snapshot" {
            let snapshot = rt.block_on(handle.snapshot())?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            continue;
        }

        if input == "advance" {
            if rt.block_on(handle.advance_phase())? {
                println!("Phase advanced.");
            } else {
                println!("No further phases.");
            }
            continue;
        }

        if input == "reset" {
            rt.block_on(handle.reset())?;
            println!("Reset to tick 0.");
            continue;
        }

        println!("Unknown command: {input}");
    }

    handle.shutdown();
    Ok(())
}

fn print_status(rt: &Runtime, handle: &SimulationHandle) -> Result<()> {
    let snapshot = rt.block_on(handle.snapshot())?;
    println!(
        "Tick {} | {:?} | {}x | phase: {}",
        snapshot.tick,
        snapshot.status,
        snapshot.speed,
        snapshot.phase.description
    );
    for agent in &snapshot.agents {
        println!(
            "  {:<12} {:<16} at {:<18} [{:?}] plan: {}",
            agent.id.as_str(),
            agent.name,
            agent
                .current_zone
                .as_ref()
                .map(|z| z.as_str())
                .unwrap_or("nowhere"),
            agent.emotion,
            agent.current_plan.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Print everything the simulation published since the last drain
fn drain_stream(stream: &mut tokio::sync::mpsc::UnboundedReceiver<StreamMessage>) {
    while let Ok(message) = stream.try_recv() {
        match message {
            StreamMessage::Tick { tick, .. } => println!("--- tick {tick} ---"),
            StreamMessage::AgentActionComplete(action) => {
                let what = action
                    .summary
                    .as_deref()
                    .or(action.reasoning.as_deref())
                    .unwrap_or(action.kind.name());
                println!("[{}] {}: {}", action.kind.name(), action.agent_id, what);
            }
            StreamMessage::AgentMove { agent_id, path, .. } => {
                if let Some(dest) = path.last() {
                    println!("[move] {agent_id} -> ({}, {})", dest.x, dest.y);
                }
            }
            StreamMessage::Reflection { agent_id, reflections } => {
                for r in reflections {
                    println!("[reflection] {agent_id}: {r}");
                }
            }
            StreamMessage::PhaseChange { phase, description } => {
                println!("=== phase: {phase} ({description}) ===");
            }
            StreamMessage::Error { message } => println!("[error] {message}"),
            // Thinking markers and raw tokens are noise on a terminal
            StreamMessage::AgentThinking { .. }
            | StreamMessage::AgentStreamToken { .. }
            | StreamMessage::StateSync(_) => {}
        }
    }
}
