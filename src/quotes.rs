//! Quote Store
//!
//! Quotes are unordered and never edited: load, add, delete.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::Result;
use crate::models::{NewQuote, Quote, QuoteId};
use crate::remote::{Collection, Remote, Resource};

#[derive(Clone)]
pub struct QuoteStore {
    quotes: Arc<RwLock<Vec<Quote>>>,
    resource: Resource<Quote>,
}

impl QuoteStore {
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self {
            quotes: Arc::new(RwLock::new(Vec::new())),
            resource: Resource::new(remote, Collection::Quotes),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Quote>> {
        self.quotes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Quote>> {
        self.quotes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace local quotes with the remote collection. Keeps the current
    /// quotes on failure.
    pub async fn load(&self) -> Result<usize> {
        let quotes = self.resource.list().await?;
        let count = quotes.len();
        *self.write() = quotes;
        Ok(count)
    }

    pub fn quotes(&self) -> Vec<Quote> {
        self.read().clone()
    }

    /// Add a quote. Blank text is rejected with `Ok(None)`.
    pub async fn add(&self, text: &str) -> Result<Option<Quote>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        match self.resource.create(&NewQuote { text }).await {
            Ok(quote) => {
                self.write().push(quote.clone());
                tracing::info!(id = quote.id, "quote added");
                Ok(Some(quote))
            }
            Err(e) => {
                self.reconcile(&e).await;
                Err(e)
            }
        }
    }

    /// Delete a quote. Unknown ids are a no-op returning `Ok(false)`.
    pub async fn delete(&self, id: QuoteId) -> Result<bool> {
        if !self.read().iter().any(|q| q.id == id) {
            return Ok(false);
        }

        match self.resource.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => tracing::debug!(id, "quote already deleted remotely"),
            Err(e) => {
                self.reconcile(&e).await;
                return Err(e);
            }
        }

        self.write().retain(|q| q.id != id);
        tracing::info!(id, "quote deleted");
        Ok(true)
    }

    async fn reconcile(&self, cause: &crate::NotelyError) {
        if let Err(e) = self.load().await {
            tracing::warn!(cause = %cause, error = %e, "re-fetch of quotes failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{Call, MemoryRemote};
    use serde_json::json;

    async fn setup(texts: &[&str]) -> (Arc<MemoryRemote>, QuoteStore) {
        let remote = Arc::new(MemoryRemote::new());
        remote.seed(
            Collection::Quotes,
            texts.iter().map(|t| json!({ "text": t })).collect(),
        );
        let store = QuoteStore::new(remote.clone());
        store.load().await.unwrap();
        remote.clear_calls();
        (remote, store)
    }

    #[tokio::test]
    async fn test_add_quote() {
        let (remote, store) = setup(&["first"]).await;

        let quote = store.add("Make it work, then make it fast").await.unwrap().unwrap();
        assert_eq!(quote.id, 2);
        assert_eq!(store.quotes().len(), 2);
        assert_eq!(remote.records(Collection::Quotes).len(), 2);
    }

    #[tokio::test]
    async fn test_blank_quote_rejected() {
        let (remote, store) = setup(&[]).await;
        assert!(store.add(" \n ").await.unwrap().is_none());
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_quote() {
        let (remote, store) = setup(&["a", "b"]).await;

        assert!(store.delete(1).await.unwrap());
        assert_eq!(store.quotes().iter().map(|q| q.text.as_str()).collect::<Vec<_>>(), vec!["b"]);
        assert!(!store.delete(1).await.unwrap());
        assert_eq!(remote.writes().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_quote() {
        let (remote, store) = setup(&["a"]).await;
        remote.fail_when(|call| matches!(call, Call::Delete(..)));

        assert!(store.delete(1).await.is_err());
        assert_eq!(store.quotes().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_quotes() {
        let (remote, store) = setup(&["a"]).await;
        remote.fail_when(|call| matches!(call, Call::List(_)));

        assert!(store.load().await.is_err());
        assert_eq!(store.quotes().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_add_resynchronises() {
        let (remote, store) = setup(&["a"]).await;
        remote.fail_when(|call| matches!(call, Call::Create(..)));

        assert!(store.add("b").await.is_err());
        assert_eq!(store.quotes().len(), 1);
        assert!(remote
            .calls()
            .iter()
            .any(|call| matches!(call, Call::List(Collection::Quotes))));
    }
}
