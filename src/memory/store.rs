//! Append-only per-agent memory log with scored retrieval
//!
//! Retrieval blends recency (exponential decay over ticks), importance
//! (normalized 1-10 score) and relevance (keyword overlap with the query
//! context). Entries are never deleted; only `last_accessed` mutates.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Tick, ZoneId};
use crate::memory::keywords::{extract_keywords, keyword_overlap};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// Kind of memory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Observation,
    Reflection,
    Plan,
}

/// One record in an agent's memory log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Monotonic, process-unique id
    pub id: u64,
    pub tick: Tick,
    /// RFC 3339 wall-clock timestamp at creation
    pub timestamp: String,
    pub kind: MemoryKind,
    pub content: String,
    /// 1-10; 10 is critical
    pub importance: u8,
    pub keywords: Vec<String>,
    pub associated_agent: Option<AgentId>,
    pub location: Option<ZoneId>,
    pub last_accessed: Tick,
}

impl MemoryEntry {
    /// Build an entry for the given tick; id and keywords are derived here.
    pub fn new(
        tick: Tick,
        kind: MemoryKind,
        content: impl Into<String>,
        importance: u8,
        associated_agent: Option<AgentId>,
        location: Option<ZoneId>,
    ) -> Self {
        let content = content.into();
        Self {
            id: NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed),
            tick,
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            keywords: extract_keywords(&content),
            content,
            importance: importance.clamp(1, 10),
            associated_agent,
            location,
            last_accessed: tick,
        }
    }
}

/// Append-only memory log owned by a single agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: Vec<MemoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries are never removed afterwards.
    pub fn add(&mut self, entry: MemoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, newest-first
    pub fn get_all(&self) -> Vec<&MemoryEntry> {
        self.entries.iter().rev().collect()
    }

    /// Top-k entries by composite score against `context`.
    ///
    /// `score = exp(-0.1 * age) + importance/10 + jaccard(context, entry)`.
    /// Ties keep input order (stable sort, no extra tie-break key). The
    /// returned entries have `last_accessed` bumped to `current_tick`.
    pub fn retrieve(&mut self, current_tick: Tick, context: &str, k: usize) -> Vec<MemoryEntry> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        let context_keywords = extract_keywords(context);

        let mut scored: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, score_entry(entry, current_tick, &context_keywords)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(i, _)| {
                self.entries[i].last_accessed = current_tick;
                self.entries[i].clone()
            })
            .collect()
    }

    /// Most recent `limit` entries, optionally filtered by kind, newest-first
    pub fn get_recent(&self, kind: Option<MemoryKind>, limit: usize) -> Vec<&MemoryEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .take(limit)
            .collect()
    }

    /// Sum of observation importance accumulated since the last reflection.
    ///
    /// Walks backward from the newest entry and stops at the first reflection,
    /// so reflections cap the scan window.
    pub fn unreflected_importance(&self) -> u32 {
        let mut sum = 0u32;
        for entry in self.entries.iter().rev() {
            match entry.kind {
                MemoryKind::Reflection => break,
                MemoryKind::Observation => sum += entry.importance as u32,
                MemoryKind::Plan => {}
            }
        }
        sum
    }
}

/// Composite retrieval score. Each component is individually bounded:
/// recency in (0,1], importance in [0.1,1], relevance in [0,1].
pub fn score_entry(entry: &MemoryEntry, current_tick: Tick, context_keywords: &[String]) -> f64 {
    let age = current_tick.saturating_sub(entry.tick) as f64;
    let recency = (-0.1 * age).exp();
    let importance = entry.importance as f64 / 10.0;
    let relevance = keyword_overlap(context_keywords, &entry.keywords);
    recency + importance + relevance
}
