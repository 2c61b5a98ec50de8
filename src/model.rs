//! Row types that flow through the pipeline, and the house-of-origin code.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// House of origin for a speech row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Unknown,
    Commons,
    Lords,
}

impl House {
    /// Fold a raw `speaker_house` value: uppercase, strip everything
    /// non-alphabetic, compare. Anything unrecognized is `Unknown`.
    pub fn fold(raw: &str) -> House {
        let squashed: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match squashed.as_str() {
            "HOUSEOFCOMMONS" => House::Commons,
            "HOUSEOFLORDS" => House::Lords,
            _ => House::Unknown,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            House::Unknown => 0,
            House::Commons => 1,
            House::Lords => 2,
        }
    }
}

/// One utterance row from the source corpus, after house folding and date
/// parsing.
#[derive(Debug, Clone)]
pub struct SpeechRow {
    pub sentence_id: i64,
    pub speechdate: NaiveDate,
    pub speaker: String,
    pub debate_id: i64,
    pub house: House,
}

/// A resolved output row. `suggested_speaker` is a member id, a pipe-joined
/// candidate list on ambiguity, or empty on miss/ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub sentence_id: i64,
    pub speaker: String,
    pub suggested_speaker: String,
    pub ambiguous: u8,
    pub fuzzy_matched: u8,
    pub ignored: u8,
}

/// Rows travel between threads in whole chunks.
pub type Chunk = Vec<SpeechRow>;
