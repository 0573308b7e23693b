//! End-to-end tests for the tick scheduler and perception fan-out

use std::sync::Arc;

use async_trait::async_trait;

use think_tank::core::config::SimulationConfig;
use think_tank::core::error::Result;
use think_tank::core::types::{AgentId, Emotion, Tick, ZoneId};
use think_tank::llm::{DecisionMaker, TokenSink};
use think_tank::scenario::Scenario;
use think_tank::simulation::{
    Action, ActionKind, EventBus, EventKind, Scheduler, ScriptedDecisionMaker, SpeechTarget,
    StreamMessage,
};

/// Decision-maker that hands every agent the same action each turn
struct Uniform(ActionKind);

#[async_trait]
impl DecisionMaker for Uniform {
    async fn decide(
        &self,
        agent_id: &AgentId,
        tick: Tick,
        _prompt: &str,
        _tokens: Option<TokenSink>,
    ) -> Result<Action> {
        Ok(Action::new(agent_id.clone(), tick, self.0.clone()))
    }

    async fn score_importance(&self, _text: &str) -> u8 {
        5
    }

    async fn synthesize_reflections(&self, _prompt: &str) -> Vec<String> {
        vec!["The debate keeps circling the same trade-off.".into()]
    }
}

fn scheduler_with(decider: Arc<dyn DecisionMaker>, bus: EventBus) -> Scheduler {
    Scheduler::new(
        Scenario::pivot_debate(),
        SimulationConfig::unpaced(),
        decider,
        bus,
        false,
        false,
    )
    .unwrap()
}

#[test]
fn briefing_observation_has_importance_nine() {
    let scheduler = scheduler_with(Arc::new(ScriptedDecisionMaker::new()), EventBus::new());
    let visionary = scheduler.agent(&AgentId::new("visionary")).unwrap();
    let memories = visionary.memory.get_all();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].importance, 9);
    assert!(memories[0].content.starts_with("Scenario briefing:"));
}

#[tokio::test]
async fn equal_waiters_rotate_through_roster_order() {
    // Everyone waits every tick, so ticks_since_acted stays equal across the
    // roster and the turn order must match scenario order, tick after tick.
    let bus = EventBus::new();
    let (_id, mut rx) = bus.subscribe();
    let mut scheduler = scheduler_with(Arc::new(Uniform(ActionKind::Wait)), bus);

    for _ in 0..2 {
        scheduler.run_tick().await;
    }

    let mut thinking_order = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let StreamMessage::AgentThinking { agent_id } = message {
            thinking_order.push(agent_id.to_string());
        }
    }
    let roster: Vec<String> = ["visionary", "skeptic", "builder", "whisperer", "devil"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(thinking_order.len(), 10);
    assert_eq!(&thinking_order[..5], roster.as_slice());
    assert_eq!(&thinking_order[5..], roster.as_slice());
}

#[tokio::test]
async fn arrival_delivers_one_perception_per_occupant() {
    let bus = EventBus::new();
    let (_id, mut rx) = bus.subscribe();
    let mut scheduler = scheduler_with(
        Arc::new(Uniform(ActionKind::MoveTo {
            destination: ZoneId::new("boardroom"),
        })),
        bus,
    );

    scheduler.run_tick().await;

    // First mover found an empty boardroom; the last found four occupants.
    // Occupants at arrival time: 0 + 1 + 2 + 3 + 4 = 10 arrival observations.
    let arrivals: usize = ["visionary", "skeptic", "builder", "whisperer", "devil"]
        .iter()
        .map(|id| {
            scheduler
                .agent(&AgentId::new(*id))
                .unwrap()
                .memory
                .get_all()
                .iter()
                .filter(|m| m.content.contains("arrived at"))
                .count()
        })
        .sum();
    assert_eq!(arrivals, 10);

    // Exactly one move message per agent, no duplicates
    let mut moves = 0;
    while let Ok(message) = rx.try_recv() {
        if matches!(message, StreamMessage::AgentMove { .. }) {
            moves += 1;
        }
    }
    assert_eq!(moves, 5);
    assert_eq!(scheduler.event_log().by_kind(EventKind::Movement).len(), 5);
}

#[tokio::test]
async fn targeted_speech_still_reaches_every_occupant() {
    // Scripted opening: tick 1 think, tick 2 gather, tick 3 speeches,
    // including the skeptic addressing the visionary directly.
    let mut scripted = scheduler_with(Arc::new(ScriptedDecisionMaker::new()), EventBus::new());
    for _ in 0..3 {
        scripted.run_tick().await;
    }

    // The skeptic spoke at the visionary specifically; everyone in the
    // boardroom heard it anyway.
    for id in ["visionary", "builder", "whisperer", "devil"] {
        let agent = scripted.agent(&AgentId::new(id)).unwrap();
        assert!(
            agent
                .memory
                .get_all()
                .iter()
                .any(|m| m.content.contains("Consumer acquisition costs")),
            "{id} should have overheard the targeted speech"
        );
    }

    // The targeted speech is one conversation turn, not one per listener
    let speeches = scripted.event_log().by_kind(EventKind::Speech);
    let skeptic_speeches: Vec<_> = speeches
        .iter()
        .filter(|e| e.agent_id == Some(AgentId::new("skeptic")))
        .collect();
    assert_eq!(skeptic_speeches.len(), 1);
    assert_eq!(skeptic_speeches[0].target.as_deref(), Some("visionary"));
}

#[tokio::test]
async fn speech_perceptions_carry_importance_six() {
    let mut scripted = scheduler_with(Arc::new(ScriptedDecisionMaker::new()), EventBus::new());
    for _ in 0..3 {
        scripted.run_tick().await;
    }
    let devil = scripted.agent(&AgentId::new("devil")).unwrap();
    let overheard: Vec<_> = devil
        .memory
        .get_all()
        .into_iter()
        .filter(|m| m.content.contains("said:"))
        .collect();
    assert!(!overheard.is_empty());
    assert!(overheard.iter().all(|m| m.importance == 6));
}

#[tokio::test]
async fn reflection_triggers_at_threshold() {
    let bus = EventBus::new();
    let (_id, mut rx) = bus.subscribe();
    let mut scheduler = Scheduler::new(
        Scenario::pivot_debate(),
        SimulationConfig::unpaced(),
        Arc::new(Uniform(ActionKind::Speak {
            target: SpeechTarget::All,
            content: "We should talk about the pivot.".into(),
            agreement_score: None,
        })),
        bus,
        false,
        false,
    )
    .unwrap();

    // Everyone starts in separate offices: tick 1 produces no perceptions
    // and the briefing alone (9) stays under the threshold.
    scheduler.run_tick().await;
    assert!(scheduler.event_log().by_kind(EventKind::Reflection).is_empty());

    // Briefing (9) plus a moderator injection (8) crosses 15
    scheduler.inject("The CEO wants a decision by Friday.", None, false).unwrap();
    scheduler.run_tick().await;

    let reflections = scheduler.event_log().by_kind(EventKind::Reflection);
    assert_eq!(reflections.len(), 5, "every agent should reflect once");
    assert!(reflections
        .iter()
        .all(|e| e.content.contains("circling the same trade-off")));

    let mut saw_reflection_message = false;
    while let Ok(message) = rx.try_recv() {
        if matches!(message, StreamMessage::Reflection { .. }) {
            saw_reflection_message = true;
        }
    }
    assert!(saw_reflection_message);

    // Reflection entries score importance 7 and reset the accumulator
    let visionary = scheduler.agent(&AgentId::new("visionary")).unwrap();
    let stored: Vec<_> = visionary
        .memory
        .get_all()
        .into_iter()
        .filter(|m| m.content.contains("circling"))
        .collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].importance, 7);
    assert_eq!(visionary.memory.unreflected_importance(), 0);
}

#[tokio::test]
async fn below_threshold_does_not_reflect() {
    let mut scheduler = scheduler_with(Arc::new(Uniform(ActionKind::Wait)), EventBus::new());
    // Briefing alone (9) stays under the threshold of 15
    scheduler.run_tick().await;
    scheduler.run_tick().await;
    assert!(scheduler.event_log().by_kind(EventKind::Reflection).is_empty());
}

#[tokio::test]
async fn think_records_private_observation_only() {
    let mut scheduler = scheduler_with(
        Arc::new(Uniform(ActionKind::Think {
            content: "Keeping my own counsel.".into(),
        })),
        EventBus::new(),
    );
    scheduler.run_tick().await;

    let visionary = scheduler.agent(&AgentId::new("visionary")).unwrap();
    let thought: Vec<_> = visionary
        .memory
        .get_all()
        .into_iter()
        .filter(|m| m.content.starts_with("I thought:"))
        .collect();
    assert_eq!(thought.len(), 1);
    assert_eq!(thought[0].importance, 4);

    let skeptic = scheduler.agent(&AgentId::new("skeptic")).unwrap();
    assert!(!skeptic
        .memory
        .get_all()
        .iter()
        .any(|m| m.content.contains("Keeping my own counsel") && m.associated_agent.is_some()));
}

#[tokio::test]
async fn action_wire_format_is_flat() {
    let action = Action::new(
        AgentId::new("skeptic"),
        4,
        ActionKind::Speak {
            target: SpeechTarget::Agent(AgentId::new("visionary")),
            content: "The numbers matter.".into(),
            agreement_score: Some(-0.5),
        },
    )
    .with_emotion(Emotion::Skeptical);

    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["action_type"], "speak");
    assert_eq!(json["target"], "visionary");
    assert_eq!(json["agent_id"], "skeptic");
    assert_eq!(json["emotion"], "skeptical");
    assert!(json.get("destination").is_none());
}
