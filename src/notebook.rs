//! Both stores wired to one remote.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::quotes::QuoteStore;
use crate::remote::{HttpRemote, Remote};
use crate::store::NoteStore;

#[derive(Clone)]
pub struct Notebook {
    pub notes: NoteStore,
    pub quotes: QuoteStore,
}

impl Notebook {
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self {
            notes: NoteStore::new(Arc::clone(&remote)),
            quotes: QuoteStore::new(remote),
        }
    }

    /// Notebook backed by the HTTP API named in `config`
    pub fn connect(config: &Config) -> Result<Self> {
        let remote = HttpRemote::new(config)?;
        tracing::debug!(base_url = %remote.base_url(), "connecting");
        Ok(Self::new(Arc::new(remote)))
    }

    /// Load notes and quotes concurrently. Fails if either load fails.
    pub async fn load_all(&self) -> Result<(usize, usize)> {
        tokio::try_join!(self.notes.load(), self.quotes.load())
    }
}
