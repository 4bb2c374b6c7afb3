//! Remote Sync Client
//!
//! A minimal resource interface over the backend's record collections.
//! Every call is one independent round trip; nothing is batched and no
//! call spans more than one record.

mod http;
mod memory;

pub use http::HttpRemote;
pub use memory::{Call, MemoryRemote};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Result;

/// Backend-assigned record identifier
pub type RecordId = i64;

/// Named record collection exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Notes,
    Quotes,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Quotes => "quotes",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic list/create/update/delete access to a record store.
///
/// Records travel as JSON objects. `update` has merge semantics: only the
/// fields present in `fields` change.
#[async_trait]
pub trait Remote: Send + Sync {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    async fn create(&self, collection: Collection, fields: Value) -> Result<Value>;

    async fn update(&self, collection: Collection, id: RecordId, fields: Value) -> Result<Value>;

    async fn delete(&self, collection: Collection, id: RecordId) -> Result<()>;
}

/// One collection of a remote, decoded as `T`.
pub struct Resource<T> {
    remote: Arc<dyn Remote>,
    collection: Collection,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            collection: self.collection,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn new(remote: Arc<dyn Remote>, collection: Collection) -> Self {
        Self {
            remote,
            collection,
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<T>> {
        tracing::debug!(collection = %self.collection, "list");
        let records = self.remote.list(self.collection).await?;
        records
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(Into::into))
            .collect()
    }

    pub async fn create<F: Serialize + ?Sized>(&self, fields: &F) -> Result<T> {
        let fields = serde_json::to_value(fields)?;
        tracing::debug!(collection = %self.collection, "create");
        let record = self.remote.create(self.collection, fields).await?;
        Ok(serde_json::from_value(record)?)
    }

    pub async fn update<F: Serialize + ?Sized>(&self, id: RecordId, fields: &F) -> Result<T> {
        let fields = serde_json::to_value(fields)?;
        tracing::debug!(collection = %self.collection, id, %fields, "update");
        let record = self.remote.update(self.collection, id, fields).await?;
        Ok(serde_json::from_value(record)?)
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        tracing::debug!(collection = %self.collection, id, "delete");
        self.remote.delete(self.collection, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewQuote, Quote};

    #[tokio::test]
    async fn test_resource_decodes_records() {
        let remote = Arc::new(MemoryRemote::new());
        let quotes: Resource<Quote> = Resource::new(remote.clone(), Collection::Quotes);

        let created = quotes.create(&NewQuote { text: "Stay hungry" }).await.unwrap();
        assert_eq!(created.text, "Stay hungry");

        let all = quotes.list().await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn test_resource_reports_malformed_records() {
        let remote = Arc::new(MemoryRemote::new());
        remote.seed(Collection::Quotes, vec![serde_json::json!({"id": 1})]);

        let quotes: Resource<Quote> = Resource::new(remote, Collection::Quotes);
        let err = quotes.list().await.unwrap_err();
        assert!(matches!(err, crate::NotelyError::Decode(_)));
    }
}
