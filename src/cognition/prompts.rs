//! Prompt assembly for the cognitive architecture
//!
//! All text the decision-maker sees is built here: the per-turn decision
//! prompt, the importance-scoring prompt and the reflection prompt. Keeping
//! them in one place makes the agent's "mental interface" auditable.

use crate::agent::Agent;
use crate::memory::{MemoryEntry, MemoryKind};
use crate::world::EnvironmentTree;

/// Build the full decision prompt for one agent turn.
///
/// `retrieved` are the top-scored memories for the scenario topic,
/// `reflections` the most recent synthesized insights. `conversation` and
/// `perceptions` are already trimmed to the configured windows.
pub fn build_decision_prompt(
    agent: &Agent,
    retrieved: &[MemoryEntry],
    reflections: &[String],
    env: &EnvironmentTree,
    nearby: &[String],
    conversation: &[String],
    perceptions: &[String],
) -> String {
    let memories = if retrieved.is_empty() {
        "No memories yet.".to_string()
    } else {
        retrieved
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. [{}] {}", i + 1, kind_label(m.kind), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let reflections = if reflections.is_empty() {
        "None yet.".to_string()
    } else {
        reflections
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let nearby = if nearby.is_empty() {
        "none".to_string()
    } else {
        nearby.join(", ")
    };

    let conversation = if conversation.is_empty() {
        "No active conversation.".to_string()
    } else {
        conversation.join("\n")
    };

    let perceptions = if perceptions.is_empty() {
        "Nothing new since your last turn.".to_string()
    } else {
        perceptions.join("\n")
    };

    format!(
        "You are {name}, {role} at a startup.\n\
         \n\
         ## Your Persona\n\
         {persona}\n\
         \n\
         ## Your Cognitive State\n\
         Current plan: {plan}\n\
         Key memories (most relevant to current context):\n\
         {memories}\n\
         \n\
         Recent reflections:\n\
         {reflections}\n\
         \n\
         ## The World\n\
         {world}\n\
         You are currently at: {zone}\n\
         Nearby agents: {nearby}\n\
         \n\
         ## Current Conversation\n\
         {conversation}\n\
         \n\
         ## What Just Happened\n\
         {perceptions}\n\
         \n\
         {instructions}",
        name = agent.name,
        role = agent.role,
        persona = agent.persona,
        plan = agent
            .current_plan
            .as_deref()
            .unwrap_or("None yet — decide what to do."),
        memories = memories,
        reflections = reflections,
        world = env.to_natural_language(),
        zone = agent
            .current_zone
            .as_ref()
            .map(|z| z.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        nearby = nearby,
        conversation = conversation,
        perceptions = perceptions,
        instructions = decision_instructions(&agent.name),
    )
}

fn decision_instructions(agent_name: &str) -> String {
    format!(
        "## Instructions\n\
         Decide your next action. Respond with a single JSON object. Your options:\n\
         - move_to: walk to a location. Set \"destination\" from the available locations list.\n\
         - speak: say something. Set \"target\" to an agent id or \"all\", and \"content\".\n\
         - think: think to yourself. Private, no one else sees it. Set \"content\".\n\
         - react: quick emotional reaction. Set \"target\" and \"content\".\n\
         - wait: do nothing this turn. Observe.\n\
         \n\
         JSON fields: action_type (required), destination, target, content, summary,\n\
         emotion (confident|uncertain|skeptical|excited|alarmed|neutral|amused),\n\
         agreement_score (-1.0 to 1.0), confidence (0.0 to 1.0), reasoning (required).\n\
         \n\
         Guidelines:\n\
         - Stay in character as {agent_name} at all times.\n\
         - Be concise: speeches should be 1-3 sentences. Thoughts should be 1 sentence.\n\
         - Take specific positions with concrete details (numbers, examples).\n\
         - Reference things other agents have said when responding.\n\
         - Your summary field should be at most 80 characters.\n\
         - If you're moving to a location, briefly explain why in your reasoning field.\n\
         - Prefer speaking over waiting if there's an active discussion."
    )
}

/// Prompt for rating one memory's importance (1-10 scale)
pub fn build_importance_prompt(content: &str) -> String {
    format!(
        "On a scale of 1 to 10, where 1 is completely mundane (e.g., \"The Visionary \
         walked to the break room\") and 10 is extremely critical (e.g., \"The Skeptic \
         revealed the company only has 3 months of runway, not 5\"), rate the importance \
         of this memory:\n\n\"{content}\"\n\nRespond with ONLY a single integer from 1 to 10."
    )
}

/// Prompt for synthesizing reflections from recent observations
pub fn build_reflection_prompt(
    agent_name: &str,
    agent_role: &str,
    topic: &str,
    observations: &[String],
) -> String {
    let listed = observations
        .iter()
        .enumerate()
        .map(|(i, o)| format!("{}. {}", i + 1, o))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are {agent_name}. Here are your most recent observations:\n\
         {listed}\n\
         \n\
         Based on these observations, generate exactly 3 high-level insights or questions. \
         These should be:\n\
         - Synthetic (combine multiple observations into a higher-level understanding)\n\
         - Relevant to the {topic}\n\
         - Grounded in your role as {agent_role}\n\
         \n\
         Format each as a single sentence. Respond with a JSON array of 3 strings."
    )
}

fn kind_label(kind: MemoryKind) -> &'static str {
    match kind {
        MemoryKind::Observation => "observation",
        MemoryKind::Reflection => "reflection",
        MemoryKind::Plan => "plan",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentConfig};
    use crate::core::types::{Disposition, TilePos, ZoneId};
    use crate::memory::{MemoryEntry, MemoryKind};

    fn make_agent() -> Agent {
        let config = AgentConfig {
            id: crate::core::types::AgentId::new("skeptic"),
            name: "The Skeptic".into(),
            role: "CFO".into(),
            disposition: Disposition::Adversarial,
            starting_location: ZoneId::new("office_skeptic"),
            persona: "You question everything with numbers.".into(),
        };
        Agent::from_config(&config, TilePos { x: 20, y: 3 })
    }

    #[test]
    fn test_decision_prompt_sections() {
        let agent = make_agent();
        let env = EnvironmentTree::default();
        let prompt = build_decision_prompt(&agent, &[], &[], &env, &[], &[], &[]);
        assert!(prompt.contains("You are The Skeptic, CFO at a startup."));
        assert!(prompt.contains("## Your Persona"));
        assert!(prompt.contains("No memories yet."));
        assert!(prompt.contains("None yet — decide what to do."));
        assert!(prompt.contains("Nearby agents: none"));
        assert!(prompt.contains("No active conversation."));
        assert!(prompt.contains("Nothing new since your last turn."));
        assert!(prompt.contains("Stay in character as The Skeptic"));
    }

    #[test]
    fn test_decision_prompt_includes_memories_and_perceptions() {
        let agent = make_agent();
        let env = EnvironmentTree::default();
        let memories = vec![MemoryEntry::new(
            1,
            MemoryKind::Observation,
            "The Visionary proposed pivoting to B2C",
            8,
            None,
            None,
        )];
        let reflections = vec!["The team is split on the pivot.".to_string()];
        let perceptions = vec!["The Builder said: \"Migration takes 6 months.\"".to_string()];
        let prompt = build_decision_prompt(
            &agent,
            &memories,
            &reflections,
            &env,
            &["The Builder (CTO)".to_string()],
            &["The Builder: Migration takes 6 months.".to_string()],
            &perceptions,
        );
        assert!(prompt.contains("pivoting to B2C"));
        assert!(prompt.contains("- The team is split on the pivot."));
        assert!(prompt.contains("Nearby agents: The Builder (CTO)"));
        assert!(prompt.contains("Migration takes 6 months."));
    }

    #[test]
    fn test_importance_prompt() {
        let prompt = build_importance_prompt("The Skeptic revealed the runway numbers");
        assert!(prompt.contains("runway numbers"));
        assert!(prompt.contains("ONLY a single integer"));
    }

    #[test]
    fn test_reflection_prompt_numbers_observations() {
        let observations = vec!["saw a".to_string(), "heard b".to_string()];
        let prompt =
            build_reflection_prompt("The Whisperer", "VP Sales", "pivot discussion", &observations);
        assert!(prompt.contains("1. saw a"));
        assert!(prompt.contains("2. heard b"));
        assert!(prompt.contains("exactly 3 high-level insights"));
        assert!(prompt.contains("your role as VP Sales"));
    }
}
