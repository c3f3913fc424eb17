//! Shared enumerations: behavior modes, conflict archetypes, entity
//! classes, and event results.

use serde::{Deserialize, Serialize};

/// Behavior mode derived from an entity's evolution pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorMode {
    /// Pressure below the desperate threshold.
    Normal,
    /// Pressure in the desperate band.
    Desperate,
    /// Pressure above the rampage threshold; forces duels on contact.
    Rampage,
}

impl Default for BehaviorMode {
    fn default() -> Self {
        Self::Normal
    }
}

/// Category of antagonistic resolution between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictArchetype {
    /// Verbal contest; both sides spend a little energy, winner gains awareness.
    Debate,
    /// Physical contest; the loser pays heavily.
    Duel,
    /// Standoff over space; the loser is displaced.
    Territorial,
}

impl core::fmt::Display for ConflictArchetype {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Debate => "debate",
            Self::Duel => "duel",
            Self::Territorial => "territorial",
        };
        write!(f, "{s}")
    }
}

/// Broad class of an entity.
///
/// `Apex` entities receive an amplified evolution-pressure signal and carry
/// the elevated privilege for destructive world edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    /// Ordinary autonomous or player-owned entity.
    Citizen,
    /// High-rank entity with amplified pressure and elevated privilege.
    Apex,
}

impl Default for EntityClass {
    fn default() -> Self {
        Self::Citizen
    }
}

/// The recorded result of a processed action proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventResult {
    /// The proposal passed validation and was applied.
    Accepted,
    /// The proposal was rejected; the event carries the reason.
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&BehaviorMode::Rampage).unwrap();
        assert_eq!(json, "\"rampage\"");
        let json = serde_json::to_string(&EventResult::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
    }
}
