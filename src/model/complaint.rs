//! Complaint records and their status enumeration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream complaint disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The consumer reviewed the company's answer
    Evaluated,
    /// The consumer marked the complaint as not solved
    NotSolved,
    /// The consumer marked the complaint as solved
    Solved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Evaluated, Status::NotSolved, Status::Solved];

    /// Returns the wire code for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Evaluated => "EVALUATED",
            Status::NotSolved => "NOT_SOLVED",
            Status::Solved => "SOLVED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a wire code, ignoring case
impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| {
                format!(
                    "expected one of EVALUATED, NOT_SOLVED, SOLVED, got '{}'",
                    s
                )
            })
    }
}

/// One message in the complaint thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message (consumer or company), as labelled upstream
    pub owner: String,
    pub date: String,
    pub message: String,
}

/// The consumer's closing evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalConsideration {
    pub message: Option<String>,
    /// Service score, 0 to 10
    pub service_note: Option<u8>,
    pub would_do_business_again: Option<bool>,
    pub date: Option<String>,
}

/// A complaint as displayed upstream at scrape time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    /// Upstream timestamp text, kept verbatim
    pub date: String,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub chat: Vec<ChatMessage>,
    pub final_consideration: Option<FinalConsideration>,
    pub url: String,
}
