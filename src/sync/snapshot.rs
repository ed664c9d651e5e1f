//! Progress snapshot record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::achievements::Achievement;

/// Immutable progress record queued for persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub score: u64,
    pub level: u32,
    #[serde(default)]
    pub achievements: BTreeSet<Achievement>,
    /// Unix timestamp (ms) when taken
    pub timestamp: f64,
    /// Account the progress belongs to, stamped when first sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}

impl ProgressSnapshot {
    pub fn new(score: u64, level: u32, achievements: BTreeSet<Achievement>, timestamp: f64) -> Self {
        Self {
            score,
            level,
            achievements,
            timestamp,
            profile_id: None,
        }
    }

    /// Copy with the owning account filled in (existing owner is kept)
    pub fn stamped(mut self, profile_id: Option<&str>) -> Self {
        if self.profile_id.is_none() {
            self.profile_id = profile_id.map(str::to_string);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_keeps_existing_owner() {
        let snap = ProgressSnapshot::new(10, 1, BTreeSet::new(), 0.0).stamped(Some("alice"));
        assert_eq!(snap.profile_id.as_deref(), Some("alice"));
        let snap = snap.stamped(Some("bob"));
        assert_eq!(snap.profile_id.as_deref(), Some("alice"));
    }

    #[test]
    fn test_guest_snapshot_omits_profile() {
        let snap = ProgressSnapshot::new(10, 1, BTreeSet::new(), 5.0);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("profile_id"));
        let back: ProgressSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
