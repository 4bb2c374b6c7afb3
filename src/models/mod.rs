mod note;
mod quote;

pub use note::{is_valid_title, NewNote, Note, NoteId, NotePatch, Section, MAX_TITLE_LEN};
pub use quote::{NewQuote, Quote, QuoteId};
