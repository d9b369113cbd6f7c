use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::validation::ValidationError;

/// The longest candidate name; matches the `CHAR(6)` column width.
pub const CANDIDATE_WIDTH: usize = 6;

/// How many recent votes the summary carries.
pub const RECENT_VOTES_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Candidate {
    Tabs,
    Spaces,
}

impl Candidate {
    pub const ALL: [Candidate; 2] = [Candidate::Tabs, Candidate::Spaces];

    pub fn as_str(self) -> &'static str {
        match self {
            Candidate::Tabs => "TABS",
            Candidate::Spaces => "SPACES",
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of a stored value. `CHAR(6)` pads with trailing blanks, so
/// those are ignored; anything else must already be uppercase.
impl FromStr for Candidate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_end() {
            "TABS" => Ok(Candidate::Tabs),
            "SPACES" => Ok(Candidate::Spaces),
            other => Err(ValidationError::UnknownTeam(other.to_string())),
        }
    }
}

/// One stored ballot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i32,
    pub candidate: Candidate,
    #[serde(with = "time::serde::rfc3339")]
    pub cast_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub tabs_count: i64,
    pub spaces_count: i64,
    /// Most recent first, at most [`RECENT_VOTES_LIMIT`] entries.
    pub recent_votes: Vec<Vote>,
}

impl VoteSummary {
    pub fn count_for(&self, candidate: Candidate) -> i64 {
        match candidate {
            Candidate::Tabs => self.tabs_count,
            Candidate::Spaces => self.spaces_count,
        }
    }

    pub fn total_votes(&self) -> i64 {
        self.tabs_count + self.spaces_count
    }

    /// The side with more votes, or `None` on a tie.
    pub fn leader(&self) -> Option<Candidate> {
        match self.tabs_count.cmp(&self.spaces_count) {
            std::cmp::Ordering::Greater => Some(Candidate::Tabs),
            std::cmp::Ordering::Less => Some(Candidate::Spaces),
            std::cmp::Ordering::Equal => None,
        }
    }
}
