//! Per-entity episodic and semantic memory.
//!
//! Episodic memories are capped per entity: when the cap is exceeded, the
//! lowest-importance entries are evicted, with the oldest entry breaking
//! ties. Every entry carries an expiry tick derived from its importance,
//! so trivia fades quickly while formative events linger. Semantic memory
//! is a plain key -> (value, confidence, tick) map with upsert-by-key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vivarium_types::{EntityId, Position};

/// Configuration for the memory system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum episodic memories retained per entity.
    pub max_episodic: usize,
    /// Ticks of retention granted per point of importance.
    pub retention_factor: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_episodic: 50,
            retention_factor: 200.0,
        }
    }
}

/// One remembered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicMemory {
    /// Short natural-language summary of the event.
    pub summary: String,
    /// Importance weight; drives retention and eviction order.
    pub importance: f64,
    /// Tick the memory was formed.
    pub created_tick: u64,
    /// Tick after which the memory expires.
    pub expires_tick: u64,
    /// Other entities involved in the event.
    pub related: Vec<EntityId>,
    /// Where the event happened, when known.
    pub location: Option<Position>,
    /// Category tag (e.g. `"conflict"`, `"discovery"`).
    pub category: String,
}

/// A single semantic fact: learned value plus confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticFact {
    /// The learned value.
    pub value: String,
    /// Confidence in [0,1].
    pub confidence: f64,
    /// Tick the fact was last updated.
    pub updated_tick: u64,
}

/// The complete memory of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    /// Episodic entries, unordered; eviction keeps the store under cap.
    episodic: Vec<EpisodicMemory>,
    /// Semantic facts keyed by name.
    semantic: BTreeMap<String, SemanticFact>,
}

impl MemoryStore {
    /// An empty memory store.
    pub const fn new() -> Self {
        Self {
            episodic: Vec::new(),
            semantic: BTreeMap::new(),
        }
    }

    /// Record an episodic memory, computing its expiry from importance and
    /// enforcing the per-entity cap.
    ///
    /// Returns the summaries of any evicted entries.
    pub fn add_episodic(
        &mut self,
        summary: impl Into<String>,
        importance: f64,
        created_tick: u64,
        related: Vec<EntityId>,
        location: Option<Position>,
        category: impl Into<String>,
        config: &MemoryConfig,
    ) -> Vec<String> {
        let importance = importance.max(0.0);
        let retention = (importance * config.retention_factor).round() as u64;
        self.episodic.push(EpisodicMemory {
            summary: summary.into(),
            importance,
            created_tick,
            expires_tick: created_tick.saturating_add(retention),
            related,
            location,
            category: category.into(),
        });
        let evicted = self.enforce_cap(config.max_episodic);
        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                cap = config.max_episodic,
                "episodic cap reached, low-importance memories evicted"
            );
        }
        evicted
    }

    /// Evict lowest-importance (oldest tie-break) entries until the store
    /// holds at most `cap` memories. Returns evicted summaries.
    fn enforce_cap(&mut self, cap: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.episodic.len() > cap {
            let victim = self
                .episodic
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.importance
                        .partial_cmp(&b.importance)
                        .unwrap_or(core::cmp::Ordering::Equal)
                        .then(a.created_tick.cmp(&b.created_tick))
                })
                .map(|(i, _)| i);
            match victim {
                Some(i) => evicted.push(self.episodic.remove(i).summary),
                None => break,
            }
        }
        evicted
    }

    /// Drop all episodic memories whose expiry tick has passed.
    pub fn sweep_expired(&mut self, current_tick: u64) -> usize {
        let before = self.episodic.len();
        self.episodic.retain(|m| m.expires_tick >= current_tick);
        before - self.episodic.len()
    }

    /// All episodic memories, unordered.
    pub fn episodic(&self) -> &[EpisodicMemory] {
        &self.episodic
    }

    /// Episodic memories involving the given entity, most recent first.
    pub fn involving(&self, other: EntityId) -> Vec<&EpisodicMemory> {
        let mut hits: Vec<&EpisodicMemory> = self
            .episodic
            .iter()
            .filter(|m| m.related.contains(&other))
            .collect();
        hits.sort_by(|a, b| b.created_tick.cmp(&a.created_tick));
        hits
    }

    /// Insert or update a semantic fact by key.
    pub fn upsert_semantic(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        confidence: f64,
        tick: u64,
    ) {
        self.semantic.insert(
            key.into(),
            SemanticFact {
                value: value.into(),
                confidence: confidence.clamp(0.0, 1.0),
                updated_tick: tick,
            },
        );
    }

    /// Look up a semantic fact.
    pub fn semantic(&self, key: &str) -> Option<&SemanticFact> {
        self.semantic.get(key)
    }

    /// All semantic facts.
    pub const fn semantic_facts(&self) -> &BTreeMap<String, SemanticFact> {
        &self.semantic
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small_config(cap: usize) -> MemoryConfig {
        MemoryConfig {
            max_episodic: cap,
            retention_factor: 100.0,
        }
    }

    #[test]
    fn cap_is_never_exceeded() {
        let config = small_config(5);
        let mut store = MemoryStore::new();
        for i in 0..20 {
            store.add_episodic(
                format!("event {i}"),
                1.0,
                i,
                Vec::new(),
                None,
                "test",
                &config,
            );
            assert!(store.episodic().len() <= 5);
        }
    }

    #[test]
    fn eviction_removes_lowest_importance_oldest_first() {
        let config = small_config(3);
        let mut store = MemoryStore::new();
        store.add_episodic("low old", 0.1, 1, Vec::new(), None, "t", &config);
        store.add_episodic("high", 5.0, 2, Vec::new(), None, "t", &config);
        store.add_episodic("low new", 0.1, 3, Vec::new(), None, "t", &config);

        // The fourth entry forces eviction of the lowest-importance,
        // oldest entry: "low old".
        let evicted = store.add_episodic("mid", 1.0, 4, Vec::new(), None, "t", &config);
        assert_eq!(evicted, vec![String::from("low old")]);

        let summaries: Vec<&str> =
            store.episodic().iter().map(|m| m.summary.as_str()).collect();
        assert!(summaries.contains(&"high"));
        assert!(summaries.contains(&"low new"));
        assert!(summaries.contains(&"mid"));
    }

    #[test]
    fn expiry_derives_from_importance() {
        let config = small_config(10);
        let mut store = MemoryStore::new();
        store.add_episodic("minor", 0.5, 100, Vec::new(), None, "t", &config);
        store.add_episodic("major", 2.0, 100, Vec::new(), None, "t", &config);

        let minor = store.episodic().iter().find(|m| m.summary == "minor").unwrap();
        let major = store.episodic().iter().find(|m| m.summary == "major").unwrap();
        assert_eq!(minor.expires_tick, 150);
        assert_eq!(major.expires_tick, 300);

        assert_eq!(store.sweep_expired(151), 1);
        assert_eq!(store.episodic().len(), 1);
    }

    #[test]
    fn involving_filters_and_sorts() {
        let config = small_config(10);
        let other = EntityId::new();
        let mut store = MemoryStore::new();
        store.add_episodic("a", 1.0, 1, vec![other], None, "t", &config);
        store.add_episodic("b", 1.0, 5, vec![other], None, "t", &config);
        store.add_episodic("c", 1.0, 3, Vec::new(), None, "t", &config);

        let hits = store.involving(other);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].summary, "b");
        assert_eq!(hits[1].summary, "a");
    }

    #[test]
    fn semantic_upsert_replaces_by_key() {
        let mut store = MemoryStore::new();
        store.upsert_semantic("home", "the meadow", 0.6, 10);
        store.upsert_semantic("home", "the ridge", 0.9, 20);

        let fact = store.semantic("home").unwrap();
        assert_eq!(fact.value, "the ridge");
        assert!((fact.confidence - 0.9).abs() < 1e-9);
        assert_eq!(fact.updated_tick, 20);
        assert!(store.semantic("unknown").is_none());
    }
}
