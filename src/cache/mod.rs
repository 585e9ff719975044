//! Normalized resource cache
//!
//! The cache maps entity type to entity id to record. It is a persistent
//! value: `apply_update` and `delete_entity` return a new snapshot and leave
//! their input untouched.
//!
//! # Sharing
//!
//! Each type table sits behind an `Arc`. Tables a payload does not touch are
//! shared between the old and new snapshot; touched tables are copied on
//! write through `Arc::make_mut`, so no mutation leaks into older snapshots.
//!
//! # Invariant
//!
//! An id lives in at most one type table. Deletion by id relies on it and
//! stops at the first table holding the id.

pub mod payload;
pub mod record;

pub use payload::{
    is_delete, parse_action_flag, Fragment, UpdatePayload, DELETE_ACTION_FLAG, LOG_ENTRY_TYPE,
};
pub use record::{EntityRecord, Link};

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Records of one entity type keyed by id
pub type EntityTable = BTreeMap<String, EntityRecord>;

/// Snapshot of every known entity, grouped by type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cache {
    tables: BTreeMap<String, Arc<EntityTable>>,
}

impl Cache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an update payload, returning the resulting snapshot.
    ///
    /// Records overwrite whatever was stored under their id; fields are
    /// never merged. `LogEntry` records with action flag 3 delete their id
    /// from whichever table holds it. Fragments apply in payload order, so
    /// a delete and an insert of the same id in one payload resolve to the
    /// one that comes last.
    pub fn apply_update(&self, payload: &UpdatePayload) -> Self {
        let mut next = self.clone();

        for fragment in payload.fragments() {
            if fragment.is_log_entry() {
                for (id, record) in &fragment.records {
                    if is_delete(record) {
                        next.remove_in_place(id);
                    }
                }
                continue;
            }

            let table = next
                .tables
                .entry(fragment.type_name.clone())
                .or_default();
            let table = Arc::make_mut(table);
            for (id, record) in &fragment.records {
                table.insert(id.clone(), record.clone());
            }
            debug!(
                "Applied {} record(s) to {}",
                fragment.records.len(),
                fragment.type_name
            );
        }

        next
    }

    /// Remove the entity with `id` from the first table that holds it.
    ///
    /// Removing an unknown id returns an equal snapshot.
    pub fn delete_entity(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.remove_in_place(id);
        next
    }

    fn remove_in_place(&mut self, id: &str) -> bool {
        for (type_name, table) in self.tables.iter_mut() {
            if table.contains_key(id) {
                Arc::make_mut(table).remove(id);
                debug!("Deleted {}[{}]", type_name, id);
                return true;
            }
        }
        false
    }

    /// Look up a record by type and id
    pub fn get(&self, type_name: &str, id: &str) -> Option<&EntityRecord> {
        self.tables.get(type_name)?.get(id)
    }

    /// Table for one type, if the type has been seen
    pub fn table(&self, type_name: &str) -> Option<&EntityTable> {
        self.tables.get(type_name).map(Arc::as_ref)
    }

    /// Known type names in sorted order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Resolve a link value (`{"link": {"id", "type"}}`) to its record
    pub fn follow_link(&self, value: &Value) -> Option<&EntityRecord> {
        let link = Link::parse(value)?;
        self.get(&link.type_name, &link.id)
    }

    /// Total number of records across all tables
    pub fn len(&self) -> usize {
        self.tables.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn shares_table_with(&self, other: &Cache, type_name: &str) -> bool {
        match (self.tables.get(type_name), other.tables.get(type_name)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Cache {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.tables.iter().map(|(k, v)| (k, v.as_ref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(content: Value) -> UpdatePayload {
        UpdatePayload::from_value("resource_updated", content).unwrap()
    }

    fn machine_five() -> Value {
        json!({"TestClassData": {"5": {
            "id": "5", "name": "m1", "owner": null, "reserved": null, "is_available": true
        }}})
    }

    #[test]
    fn insert_into_empty_cache() {
        let cache = Cache::new().apply_update(&payload(machine_five()));

        let record = cache.get("TestClassData", "5").unwrap();
        assert_eq!(record.name(), Some("m1"));
        assert_eq!(record.field("is_available"), Some(&json!(true)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn log_entry_flag_three_deletes_across_types() {
        let cache = Cache::new().apply_update(&payload(machine_five()));
        let cache = cache.apply_update(&payload(json!({"LogEntry": {"5": {"action_flag": 3}}})));

        assert!(cache.get("TestClassData", "5").is_none());
        assert!(cache.table("LogEntry").is_none());
        // The emptied table itself stays.
        assert!(cache.table("TestClassData").is_some());
    }

    #[test]
    fn log_entry_other_flags_are_ignored() {
        let cache = Cache::new().apply_update(&payload(machine_five()));
        let after = cache.apply_update(&payload(json!({"LogEntry": {
            "5": {"action_flag": 2}
        }})));
        assert_eq!(after, cache);

        let after = cache.apply_update(&payload(json!({"LogEntry": {
            "5": {"action_flag": "change"}
        }})));
        assert_eq!(after, cache);
    }

    #[test]
    fn record_update_overwrites_instead_of_merging() {
        let cache = Cache::new().apply_update(&payload(machine_five()));
        let cache =
            cache.apply_update(&payload(json!({"TestClassData": {"5": {"owner": "alice"}}})));

        let record = cache.get("TestClassData", "5").unwrap();
        assert_eq!(record.owner(), Some("alice"));
        assert_eq!(record.len(), 1);
        assert!(record.field("name").is_none());
        assert!(record.field("is_available").is_none());
    }

    #[test]
    fn delete_missing_id_is_identity() {
        let cache = Cache::new().apply_update(&payload(machine_five()));
        assert_eq!(cache.delete_entity("missing"), cache);
        assert_eq!(Cache::new().delete_entity("missing"), Cache::new());
    }

    #[test]
    fn delete_entity_removes_only_that_id() {
        let cache = Cache::new().apply_update(&payload(json!({
            "TestClassData": {"5": {"id": "5"}, "6": {"id": "6"}},
            "Device": {"7": {"id": "7"}}
        })));

        let cache = cache.delete_entity("6");
        assert!(cache.get("TestClassData", "5").is_some());
        assert!(cache.get("TestClassData", "6").is_none());
        assert!(cache.get("Device", "7").is_some());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let update = payload(json!({
            "TestClassData": {"1": {"id": "1", "owner": "bob"}},
            "Device": {"2": {"id": "2"}},
            "LogEntry": {"9": {"action_flag": 3}}
        }));
        let once = Cache::new().apply_update(&update);
        let twice = once.apply_update(&update);
        assert_eq!(once, twice);
    }

    #[test]
    fn old_snapshot_is_untouched() {
        let before = Cache::new().apply_update(&payload(machine_five()));
        let after = before.apply_update(&payload(json!({
            "TestClassData": {"5": {"owner": "alice"}, "6": {"id": "6"}}
        })));
        let after = after.delete_entity("5");

        assert_eq!(before.get("TestClassData", "5").unwrap().name(), Some("m1"));
        assert!(before.get("TestClassData", "6").is_none());
        assert!(after.get("TestClassData", "5").is_none());
    }

    #[test]
    fn untouched_tables_are_shared() {
        let before = Cache::new().apply_update(&payload(json!({
            "TestClassData": {"5": {"id": "5"}},
            "Device": {"7": {"id": "7"}}
        })));
        let after = before.apply_update(&payload(json!({"Device": {"8": {"id": "8"}}})));

        assert!(after.shares_table_with(&before, "TestClassData"));
        assert!(!after.shares_table_with(&before, "Device"));
    }

    #[test]
    fn sequential_updates_match_one_merged_payload() {
        let first = payload(json!({
            "TestClassData": {"1": {"id": "1", "owner": "a"}, "2": {"id": "2"}}
        }));
        let second = payload(json!({
            "TestClassData": {"2": {"id": "2", "reserved": "b"}},
            "Device": {"3": {"id": "3"}}
        }));
        let merged = payload(json!({
            "TestClassData": {
                "1": {"id": "1", "owner": "a"},
                "2": {"id": "2", "reserved": "b"}
            },
            "Device": {"3": {"id": "3"}}
        }));

        let folded = Cache::new().apply_update(&first).apply_update(&second);
        assert_eq!(folded, Cache::new().apply_update(&merged));
    }

    #[test]
    fn reinsert_after_delete_wins() {
        let cache = Cache::new().apply_update(&payload(machine_five()));
        let cache = cache
            .apply_update(&payload(json!({"LogEntry": {"5": {"action_flag": 3}}})))
            .apply_update(&payload(json!({"Device": {"5": {"id": "5", "name": "moved"}}})));

        assert!(cache.get("TestClassData", "5").is_none());
        assert_eq!(cache.get("Device", "5").unwrap().name(), Some("moved"));
    }

    #[test]
    fn delete_and_insert_in_one_payload_last_wins() {
        let cache = Cache::new().apply_update(&payload(machine_five()));

        let insert_last = cache.apply_update(&payload(json!({
            "LogEntry": {"5": {"action_flag": 3}},
            "TestClassData": {"5": {"id": "5", "name": "again"}}
        })));
        assert_eq!(
            insert_last.get("TestClassData", "5").unwrap().name(),
            Some("again")
        );

        let delete_last = cache.apply_update(&payload(json!({
            "TestClassData": {"5": {"id": "5", "name": "again"}},
            "LogEntry": {"5": {"action_flag": "3"}}
        })));
        assert!(delete_last.get("TestClassData", "5").is_none());
    }

    #[test]
    fn empty_fragment_creates_table() {
        let cache = Cache::new().apply_update(&payload(json!({"Device": {}})));
        assert!(cache.table("Device").is_some_and(|t| t.is_empty()));
        assert!(cache.is_empty());
    }

    #[test]
    fn follow_link_resolves_targets() {
        let cache = Cache::new().apply_update(&payload(json!({
            "Group": {"3": {"id": 3, "name": "lab"}},
            "TestClassData": {"5": {"id": 5, "group": {"link": {"id": 3, "type": "Group"}}}}
        })));

        let group = cache
            .get("TestClassData", "5")
            .and_then(|r| r.field("group"))
            .and_then(|v| cache.follow_link(v))
            .unwrap();
        assert_eq!(group.name(), Some("lab"));
        assert!(cache
            .follow_link(&json!({"link": {"id": 4, "type": "Group"}}))
            .is_none());
    }

    #[test]
    fn serializes_as_nested_maps() {
        let cache = Cache::new().apply_update(&payload(machine_five()));
        let value = serde_json::to_value(&cache).unwrap();
        assert_eq!(value["TestClassData"]["5"]["name"], "m1");
    }
}
