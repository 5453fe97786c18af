use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::model::{BackLink, DocumentId};

/// Persisted form of the reverse index.
///
/// The wire format is a flat list of `(key, backlinks)` pairs rather
/// than a map, since JSON objects cannot carry non-string keys directly;
/// it deserializes back into the typed map via [`CacheSnapshot::into_backlinks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub entries: Vec<(String, Vec<BackLink>)>,
    /// Build timestamp, epoch milliseconds.
    pub built_at: u64,
}

impl CacheSnapshot {
    pub fn new(backlinks: &HashMap<DocumentId, Vec<BackLink>>, built_at: SystemTime) -> Self {
        let mut entries: Vec<(String, Vec<BackLink>)> = backlinks
            .iter()
            .map(|(id, links)| (id.to_string(), links.clone()))
            .collect();
        // Deterministic on disk; per-key list order is preserved as built.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            entries,
            built_at: epoch_millis(built_at),
        }
    }

    pub fn from_index(index: &crate::index::LinkIndex) -> Self {
        Self::new(index.backlinks(), index.built_at())
    }

    /// The typed reverse index this snapshot carries.
    pub fn into_backlinks(self) -> HashMap<DocumentId, Vec<BackLink>> {
        self.entries
            .into_iter()
            .map(|(key, links)| (DocumentId::from_key(&key), links))
            .collect()
    }

    pub fn built_at_time(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(self.built_at)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Epoch milliseconds for a timestamp; pre-epoch times clamp to zero.
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backlink(slug: &str, source_key: &str) -> BackLink {
        BackLink {
            slug: slug.to_string(),
            title: slug.to_string(),
            source_key: source_key.to_string(),
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut backlinks = HashMap::new();
        backlinks.insert(
            DocumentId::Identifier("20240326T195811".to_string()),
            vec![backlink("docker", "20240327T093642")],
        );
        backlinks.insert(
            DocumentId::Filename("emacs".to_string()),
            vec![backlink("docker", "20240327T093642"), backlink("lxd", "20240326T195811")],
        );

        let snapshot = CacheSnapshot::new(&backlinks, SystemTime::now());
        let json = snapshot.to_json().unwrap();
        let restored = CacheSnapshot::from_json(&json).unwrap();

        assert_eq!(restored, snapshot);
        assert_eq!(restored.into_backlinks(), backlinks);
    }

    #[test]
    fn test_wire_shape() {
        let mut backlinks = HashMap::new();
        backlinks.insert(
            DocumentId::Identifier("20240326T195811".to_string()),
            vec![backlink("docker", "20240327T093642")],
        );
        let snapshot = CacheSnapshot::new(&backlinks, SystemTime::UNIX_EPOCH + Duration::from_millis(1700));

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["builtAt"], 1700);
        assert_eq!(value["entries"][0][0], "20240326T195811");
        assert_eq!(value["entries"][0][1][0]["slug"], "docker");
        assert_eq!(value["entries"][0][1][0]["sourceKey"], "20240327T093642");
    }

    #[test]
    fn test_entries_sorted_by_key() {
        let mut backlinks = HashMap::new();
        backlinks.insert(DocumentId::Filename("zebra".to_string()), vec![]);
        backlinks.insert(DocumentId::Filename("apple".to_string()), vec![]);

        let snapshot = CacheSnapshot::new(&backlinks, SystemTime::now());
        assert_eq!(snapshot.entries[0].0, "apple");
        assert_eq!(snapshot.entries[1].0, "zebra");
    }

    #[test]
    fn test_built_at_time_round_trip() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
        let snapshot = CacheSnapshot::new(&HashMap::new(), time);
        assert_eq!(snapshot.built_at_time(), time);
    }
}
