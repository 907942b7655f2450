use super::backend::DraftBackend;
use crate::error::{DraftError, Result};
use crate::model::{Draft, DraftRecord};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keyed, timestamped draft storage over a single backing document.
///
/// The mapping is loaded lazily on first access and then held in memory; every
/// mutation flushes the whole mapping back through the backend. If a flush fails the
/// in-memory mapping stays authoritative until the next successful one.
///
/// Entries are kept as raw JSON values and only decoded when asked for, so keys this
/// store doesn't understand survive a rewrite untouched.
pub struct DraftStore<B: DraftBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    entries: Option<Map<String, Value>>,
}

impl<B: DraftBackend> DraftStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            entries: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// Read the backing document into memory.
    ///
    /// Never fails: a missing document is an empty store, and an unreadable or
    /// unparseable one is logged and also treated as empty.
    pub fn load(&mut self) {
        let location = self.backend.location();
        let entries = match self.backend.read() {
            Ok(None) => Map::new(),
            Ok(Some(raw)) => parse_mapping(&raw).unwrap_or_else(|e| {
                warn!(path = %location.display(), error = %e, "Draft file is corrupt, starting fresh");
                Map::new()
            }),
            Err(e) => {
                warn!(path = %location.display(), error = %e, "Could not read draft file, starting fresh");
                Map::new()
            }
        };
        debug!(path = %location.display(), drafts = entries.len(), "Loaded drafts");
        self.entries = Some(entries);
    }

    fn entries_mut(&mut self) -> &mut Map<String, Value> {
        if self.entries.is_none() {
            self.load();
        }
        self.entries.get_or_insert_with(Map::new)
    }

    /// Fetch the draft for `key` if it is at most `max_age` seconds old at `now`.
    ///
    /// Stale and malformed entries are removed as a side effect, so they are never
    /// returned and don't linger on disk.
    pub fn get(&mut self, key: &str, max_age: f64, now: f64) -> Option<Draft> {
        if key.is_empty() {
            return None;
        }

        let decoded = decode_entry(key, self.entries_mut().get(key)?);
        let draft = match decoded {
            Ok(draft) => draft,
            Err(e) => {
                warn!(template = key, error = %e, "Discarding invalid draft");
                self.discard(key);
                return None;
            }
        };

        if draft.is_stale(max_age, now) {
            debug!(
                template = key,
                age_secs = draft.age_seconds(now),
                "Discarding stale draft"
            );
            self.discard(key);
            return None;
        }

        Some(draft)
    }

    /// Store a snapshot for `key` stamped at `now`, replacing any previous one, and flush.
    pub fn put(
        &mut self,
        key: &str,
        fields: Vec<String>,
        tags: Vec<String>,
        now: f64,
    ) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        let draft = Draft::new(key, fields, tags, now);
        let value = serde_json::to_value(draft.to_record())?;
        self.entries_mut().insert(key.to_string(), value);
        self.persist()
    }

    /// Remove the draft for `key`. Absent keys are a no-op.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }
        if self.entries_mut().remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Remove every entry whose `last_saved` is older than `max_age`.
    ///
    /// Entries without a readable timestamp are left alone here; [`DraftStore::get`]
    /// deals with them when their key is asked for.
    pub fn prune_stale(&mut self, max_age: f64, now: f64) -> Result<usize> {
        let entries = self.entries_mut();
        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, value)| {
                value
                    .get("last_saved")
                    .and_then(Value::as_f64)
                    .is_some_and(|saved| now - saved > max_age)
            })
            .map(|(key, _)| key.clone())
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }
        for key in &stale {
            entries.remove(key);
        }
        debug!(count = stale.len(), "Pruned stale drafts");
        self.persist()?;
        Ok(stale.len())
    }

    /// Drop every draft and remove the backing document.
    pub fn clear_all(&mut self) -> Result<()> {
        self.entries_mut().clear();
        self.persist()
    }

    /// Write the whole mapping through the backend.
    ///
    /// An empty mapping removes the backing document instead of writing `{}`.
    pub fn persist(&mut self) -> Result<()> {
        let content = {
            let entries = self.entries_mut();
            if entries.is_empty() {
                None
            } else {
                Some(serde_json::to_string_pretty(&*entries)?)
            }
        };
        match content {
            Some(content) => self.backend.write(&content),
            None => self.backend.remove(),
        }
    }

    pub fn contains(&mut self, key: &str) -> bool {
        self.entries_mut().contains_key(key)
    }

    pub fn keys(&mut self) -> Vec<String> {
        self.entries_mut().keys().cloned().collect()
    }

    pub fn len(&mut self) -> usize {
        self.entries_mut().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn discard(&mut self, key: &str) {
        if self.entries_mut().remove(key).is_some() {
            if let Err(e) = self.persist() {
                warn!(template = key, error = %e, "Failed to persist draft removal");
            }
        }
    }
}

fn parse_mapping(raw: &str) -> Result<Map<String, Value>> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(DraftError::Store(format!(
            "expected a JSON object at top level, found {}",
            json_kind(&other)
        ))),
    }
}

fn decode_entry(key: &str, value: &Value) -> Result<Draft> {
    let record = DraftRecord::deserialize(value).map_err(|e| DraftError::InvalidEntry {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Draft::from_record(key, record))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::store::InMemoryDraftStore;

    const MAX_AGE: f64 = 172_800.0;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn seeded(raw: &str) -> InMemoryDraftStore {
        DraftStore::with_backend(MemBackend::with_content(raw))
    }

    #[test]
    fn test_load_is_lazy() {
        let mut store = InMemoryDraftStore::new();
        assert!(!store.is_loaded());
        assert!(store.get("Basic", MAX_AGE, 0.0).is_none());
        assert!(store.is_loaded());
    }

    #[test]
    fn test_put_then_get_returns_same_content() {
        let mut store = InMemoryDraftStore::new();
        store
            .put("Basic", strings(&["What is 2+2?", "4"]), strings(&["math"]), 1000.0)
            .unwrap();

        let draft = store.get("Basic", MAX_AGE, 1010.0).unwrap();
        assert_eq!(draft.template_key, "Basic");
        assert_eq!(draft.fields, strings(&["What is 2+2?", "4"]));
        assert_eq!(draft.tags, strings(&["math"]));
        assert_eq!(draft.saved_at, 1000.0);
    }

    #[test]
    fn test_put_overwrites_existing() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["old"]), vec![], 1000.0).unwrap();
        store.put("Basic", strings(&["new"]), vec![], 1005.0).unwrap();

        assert_eq!(store.len(), 1);
        let draft = store.get("Basic", MAX_AGE, 1005.0).unwrap();
        assert_eq!(draft.fields, strings(&["new"]));
        assert_eq!(draft.saved_at, 1005.0);
    }

    #[test]
    fn test_put_flushes_immediately() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q", "A"]), vec![], 1000.0).unwrap();

        let raw = store.backend().raw().unwrap();
        let on_disk: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk["Basic"]["fields"][1], "A");
        assert_eq!(on_disk["Basic"]["last_saved"], 1000.0);
    }

    #[test]
    fn test_stale_draft_is_absent_and_deleted() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();

        assert!(store.get("Basic", MAX_AGE, 1000.0 + MAX_AGE + 1.0).is_none());
        assert!(!store.contains("Basic"));
        // A later lookup inside the window still finds nothing.
        assert!(store.get("Basic", MAX_AGE, 1000.0).is_none());
        assert!(store.backend().raw().is_none());
    }

    #[test]
    fn test_age_exactly_max_is_fresh() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();
        assert!(store.get("Basic", 10.0, 1010.0).is_some());
    }

    #[test]
    fn test_keys_are_isolated() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q", "A"]), vec![], 1000.0).unwrap();

        assert!(store.get("Cloze", MAX_AGE, 1000.0).is_none());
        store.put("Cloze", strings(&["{{c1::x}}"]), vec![], 1001.0).unwrap();

        let basic = store.get("Basic", MAX_AGE, 1001.0).unwrap();
        assert_eq!(basic.fields, strings(&["Q", "A"]));
    }

    #[test]
    fn test_delete_twice_is_noop() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();

        store.delete("Basic").unwrap();
        let writes = store.backend().write_count();
        store.delete("Basic").unwrap();

        assert_eq!(store.backend().write_count(), writes);
        assert!(store.get("Basic", MAX_AGE, 1000.0).is_none());
    }

    #[test]
    fn test_delete_keeps_other_keys() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();
        store.put("Cloze", strings(&["C"]), vec![], 1000.0).unwrap();

        store.delete("Basic").unwrap();
        assert_eq!(store.keys(), strings(&["Cloze"]));
        assert!(store.backend().raw().unwrap().contains("Cloze"));
    }

    #[test]
    fn test_corrupt_content_loads_empty() {
        let mut store = seeded("{ this is not json");
        store.load();
        assert!(store.is_loaded());
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_object_top_level_loads_empty() {
        let mut store = seeded(r#"["Basic", "Cloze"]"#);
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_error_loads_empty() {
        let backend = MemBackend::with_content(r#"{"Basic": {}}"#);
        backend.set_simulate_read_error(true);
        let mut store = DraftStore::with_backend(backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_entry_is_absent_and_deleted() {
        let mut store = seeded(
            r#"{
                "Basic": {"last_saved": 1000.0, "fields": ["Q"]},
                "Cloze": {"last_saved": 1000.0, "fields": ["C"], "tags": []}
            }"#,
        );

        assert!(store.get("Basic", MAX_AGE, 1000.0).is_none());
        assert!(!store.contains("Basic"));
        assert!(store.get("Cloze", MAX_AGE, 1000.0).is_some());
    }

    #[test]
    fn test_unknown_keys_survive_rewrite() {
        let mut store = seeded(r#"{"_meta": {"schema": 2}, "Legacy": "not a draft"}"#);
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();

        let on_disk: Value = serde_json::from_str(&store.backend().raw().unwrap()).unwrap();
        assert_eq!(on_disk["_meta"]["schema"], 2);
        assert_eq!(on_disk["Legacy"], "not a draft");
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut store = InMemoryDraftStore::new();
        store.backend().set_simulate_write_error(true);

        let result = store.put("Basic", strings(&["Q"]), vec![], 1000.0);
        assert!(result.is_err());
        assert!(store.backend().raw().is_none());

        // In-memory state is still authoritative.
        assert!(store.get("Basic", MAX_AGE, 1000.0).is_some());

        store.backend().set_simulate_write_error(false);
        store.persist().unwrap();
        assert!(store.backend().raw().unwrap().contains("Basic"));
    }

    #[test]
    fn test_get_survives_write_failure_on_discard() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();
        store.backend().set_simulate_write_error(true);

        assert!(store.get("Basic", 10.0, 2000.0).is_none());
        assert!(!store.contains("Basic"));
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let mut store = InMemoryDraftStore::new();
        store.put("", strings(&["Q"]), vec![], 1000.0).unwrap();
        assert!(store.is_empty());
        assert!(store.get("", MAX_AGE, 1000.0).is_none());
        store.delete("").unwrap();
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn test_prune_stale_leaves_invalid_drafts_for_get() {
        let mut store = seeded(
            r#"{"Basic": {"last_saved": 1000.0, "fields": ["Q"]}, "Cloze": {"fields": []}}"#,
        );

        assert_eq!(store.prune_stale(MAX_AGE, 1000.0).unwrap(), 0);
        assert_eq!(store.keys(), strings(&["Basic", "Cloze"]));

        // The lookup is what purges a malformed entry.
        assert!(store.get("Basic", MAX_AGE, 1000.0).is_none());
        assert!(store.get("Cloze", MAX_AGE, 1000.0).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_prune_stale_removes_stale_invalid_draft() {
        let mut store = seeded(r#"{"Basic": {"last_saved": 100.0, "fields": ["Q"]}}"#);
        assert_eq!(store.prune_stale(10.0, 1000.0).unwrap(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_prune_stale_removes_only_old_entries() {
        let mut store = InMemoryDraftStore::new();
        store.put("Old", strings(&["x"]), vec![], 100.0).unwrap();
        store.put("Fresh", strings(&["y"]), vec![], 1000.0).unwrap();

        let removed = store.prune_stale(500.0, 1000.0).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.keys(), strings(&["Fresh"]));
    }

    #[test]
    fn test_prune_stale_leaves_unknown_entries() {
        let mut store = seeded(r#"{"_meta": {"schema": 2}}"#);
        assert_eq!(store.prune_stale(10.0, 1_000_000.0).unwrap(), 0);
        assert!(store.contains("_meta"));
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn test_empty_mapping_removes_backing_content() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();
        store.delete("Basic").unwrap();
        assert!(store.backend().raw().is_none());
    }

    #[test]
    fn test_clear_all() {
        let mut store = InMemoryDraftStore::new();
        store.put("Basic", strings(&["Q"]), vec![], 1000.0).unwrap();
        store.put("Cloze", strings(&["C"]), vec![], 1000.0).unwrap();

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert!(store.backend().raw().is_none());
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let mut store = InMemoryDraftStore::new();
        store
            .put("Basic", strings(&["Q"]), strings(&["b", "a", "b"]), 1000.0)
            .unwrap();
        let draft = store.get("Basic", MAX_AGE, 1000.0).unwrap();
        assert_eq!(draft.tags, strings(&["b", "a"]));
    }
}
