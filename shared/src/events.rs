use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::land::{LandCollection, LandRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LandEvent {
    Snapshot {
        #[serde(default)]
        seq: u64,
        lands: LandCollection,
        timestamp: DateTime<Utc>,
    },
    Update {
        #[serde(default)]
        seq: u64,
        changes: Vec<LandRecord>,
        timestamp: DateTime<Utc>,
    },
}

impl LandEvent {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Snapshot { seq, .. } | Self::Update { seq, .. } => *seq,
        }
    }
}

/// Produce the collection that results from applying `changes` to `lands`.
///
/// Changed records replace the record with the same id; new ids are appended.
/// The input is left untouched so consumers always see a wholesale replacement.
pub fn apply_changes(lands: &[LandRecord], changes: &[LandRecord]) -> LandCollection {
    let mut next = lands.to_vec();
    for change in changes {
        match next.iter_mut().find(|land| land.id == change.id) {
            Some(slot) => *slot = change.clone(),
            None => next.push(change.clone()),
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_snapshot() {
        let json = r#"{
            "type": "Snapshot",
            "seq": 4,
            "lands": [{"id": 0, "owner_address": "0xaa"}],
            "timestamp": "2026-01-02T03:04:05Z"
        }"#;
        let event: LandEvent = serde_json::from_str(json).expect("snapshot should parse");
        assert_eq!(event.seq(), 4);
        match event {
            LandEvent::Snapshot { lands, .. } => assert_eq!(lands.len(), 1),
            LandEvent::Update { .. } => panic!("expected snapshot"),
        }
    }

    #[test]
    fn apply_changes_replaces_and_appends() {
        let lands = vec![LandRecord::unclaimed(0), LandRecord::unclaimed(1)];
        let changes = vec![LandRecord::owned_by(1, "0xbb"), LandRecord::unclaimed(2)];
        let next = apply_changes(&lands, &changes);

        assert_eq!(next.len(), 3);
        assert_eq!(next[1].owner_address.as_deref(), Some("0xbb"));
        assert_eq!(next[2].id, 2);
        assert!(lands[1].is_unclaimed());
    }
}
