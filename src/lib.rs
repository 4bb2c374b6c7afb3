pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod notebook;
pub mod quotes;
pub mod remote;
pub mod store;

pub use config::Config;
pub use error::{NotelyError, Result};
pub use notebook::Notebook;
pub use quotes::QuoteStore;
pub use store::{DragOutcome, NoteStore};
