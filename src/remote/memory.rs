//! In-process remote.
//!
//! Behaves like the REST backend (sequential ids, merge-on-update, 404 for
//! unknown records) and records every call. Failures and latency can be
//! injected per call, which is how the store tests exercise rollback and
//! out-of-order completion.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{Collection, RecordId, Remote};
use crate::error::{NotelyError, Result};

/// A call as received by [`MemoryRemote`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Collection),
    Create(Collection, Value),
    Update(Collection, RecordId, Value),
    Delete(Collection, RecordId),
}

impl Call {
    pub fn is_write(&self) -> bool {
        !matches!(self, Call::List(_))
    }
}

type CallPredicate = Box<dyn Fn(&Call) -> bool + Send + Sync>;
type CallLatency = Box<dyn Fn(&Call) -> Duration + Send + Sync>;

#[derive(Default)]
struct MemoryState {
    records: HashMap<Collection, Vec<Map<String, Value>>>,
    next_id: RecordId,
    calls: Vec<Call>,
    fail_when: Option<CallPredicate>,
    latency: Option<CallLatency>,
}

impl MemoryState {
    fn assign_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<MemoryState>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert records directly, bypassing the call log. Records without an
    /// `id` get one assigned.
    pub fn seed(&self, collection: Collection, records: Vec<Value>) {
        let mut state = self.lock();
        for record in records {
            let mut object = match record {
                Value::Object(object) => object,
                _ => continue,
            };
            match object.get("id").and_then(Value::as_i64) {
                Some(id) => state.next_id = state.next_id.max(id),
                None => {
                    let id = state.assign_id();
                    object.insert("id".to_string(), Value::from(id));
                }
            }
            state.records.entry(collection).or_default().push(object);
        }
    }

    /// Current contents of a collection, in insertion order
    pub fn records(&self, collection: Collection) -> Vec<Value> {
        self.lock()
            .records
            .get(&collection)
            .map(|records| records.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    pub fn record(&self, collection: Collection, id: RecordId) -> Option<Value> {
        self.lock()
            .records
            .get(&collection)
            .and_then(|records| records.iter().find(|r| record_id(r) == Some(id)))
            .cloned()
            .map(Value::Object)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.lock().calls.iter().filter(|c| c.is_write()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Fail every matching call with a 503 and leave the records untouched.
    pub fn fail_when(&self, predicate: impl Fn(&Call) -> bool + Send + Sync + 'static) {
        self.lock().fail_when = Some(Box::new(predicate));
    }

    pub fn clear_failures(&self) {
        self.lock().fail_when = None;
    }

    /// Delay each call by the returned duration before it takes effect.
    pub fn set_latency(&self, latency: impl Fn(&Call) -> Duration + Send + Sync + 'static) {
        self.lock().latency = Some(Box::new(latency));
    }

    /// Log the call, then wait out its latency. Returns an error if the call
    /// is set up to fail.
    async fn admit(&self, call: Call) -> Result<()> {
        let (fail, delay) = {
            let mut state = self.lock();
            let fail = state.fail_when.as_ref().map_or(false, |p| p(&call));
            let delay = state.latency.as_ref().map(|l| l(&call));
            state.calls.push(call);
            (fail, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(NotelyError::Api {
                status: 503,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

fn record_id(record: &Map<String, Value>) -> Option<RecordId> {
    record.get("id").and_then(Value::as_i64)
}

fn not_found(collection: Collection, id: RecordId) -> NotelyError {
    NotelyError::NotFound { collection, id }
}

#[async_trait]
impl Remote for MemoryRemote {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        self.admit(Call::List(collection)).await?;
        Ok(self.records(collection))
    }

    async fn create(&self, collection: Collection, fields: Value) -> Result<Value> {
        self.admit(Call::Create(collection, fields.clone())).await?;

        let mut object = match fields {
            Value::Object(object) => object,
            other => {
                return Err(NotelyError::Api {
                    status: 400,
                    message: format!("expected a JSON object, got {}", other),
                })
            }
        };

        let mut state = self.lock();
        let id = state.assign_id();
        object.insert("id".to_string(), Value::from(id));
        state.records.entry(collection).or_default().push(object.clone());
        Ok(Value::Object(object))
    }

    async fn update(&self, collection: Collection, id: RecordId, fields: Value) -> Result<Value> {
        self.admit(Call::Update(collection, id, fields.clone())).await?;

        let mut state = self.lock();
        let record = state
            .records
            .get_mut(&collection)
            .and_then(|records| records.iter_mut().find(|r| record_id(r) == Some(id)))
            .ok_or_else(|| not_found(collection, id))?;

        if let Value::Object(fields) = fields {
            for (key, value) in fields {
                if key != "id" {
                    record.insert(key, value);
                }
            }
        }
        Ok(Value::Object(record.clone()))
    }

    async fn delete(&self, collection: Collection, id: RecordId) -> Result<()> {
        self.admit(Call::Delete(collection, id)).await?;

        let mut state = self.lock();
        let records = state.records.entry(collection).or_default();
        let before = records.len();
        records.retain(|r| record_id(r) != Some(id));
        if records.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let remote = MemoryRemote::new();
        let a = remote.create(Collection::Notes, json!({"title": "A"})).await.unwrap();
        let b = remote.create(Collection::Notes, json!({"title": "B"})).await.unwrap();
        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
        assert_eq!(remote.records(Collection::Notes).len(), 2);
        assert!(remote.records(Collection::Quotes).is_empty());
    }

    #[tokio::test]
    async fn test_seed_keeps_ids_and_continues_after_them() {
        let remote = MemoryRemote::new();
        remote.seed(Collection::Notes, vec![json!({"id": 10, "title": "old"})]);
        let created = remote.create(Collection::Notes, json!({"title": "new"})).await.unwrap();
        assert_eq!(created["id"], 11);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let remote = MemoryRemote::new();
        remote.seed(
            Collection::Notes,
            vec![json!({"id": 1, "title": "A", "position": 0, "section": "todo"})],
        );

        let updated = remote
            .update(Collection::Notes, 1, json!({"position": 3}))
            .await
            .unwrap();
        assert_eq!(updated["title"], "A");
        assert_eq!(updated["position"], 3);
        assert_eq!(updated["section"], "todo");
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let remote = MemoryRemote::new();
        let err = remote
            .update(Collection::Notes, 99, json!({"title": "x"}))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = remote.delete(Collection::Quotes, 5).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_records_untouched() {
        let remote = MemoryRemote::new();
        remote.seed(Collection::Notes, vec![json!({"id": 1, "title": "A"})]);
        remote.fail_when(|call| matches!(call, Call::Delete(_, 1)));

        let err = remote.delete(Collection::Notes, 1).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(remote.record(Collection::Notes, 1).is_some());

        remote.clear_failures();
        remote.delete(Collection::Notes, 1).await.unwrap();
        assert!(remote.record(Collection::Notes, 1).is_none());
    }

    #[tokio::test]
    async fn test_call_log() {
        let remote = MemoryRemote::new();
        remote.list(Collection::Notes).await.unwrap();
        remote.create(Collection::Quotes, json!({"text": "q"})).await.unwrap();

        assert_eq!(remote.calls().len(), 2);
        assert_eq!(remote.writes().len(), 1);
        assert_eq!(remote.calls()[0], Call::List(Collection::Notes));

        remote.clear_calls();
        assert!(remote.calls().is_empty());
    }
}
