use serde::{Deserialize, Serialize};

use crate::remote::RecordId;

pub type QuoteId = RecordId;

/// Short free-standing annotation shown above the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuote<'a> {
    pub text: &'a str,
}
