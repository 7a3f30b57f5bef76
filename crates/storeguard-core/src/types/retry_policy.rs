//! Retry policy types
//!
//! A policy bounds how many times a failed remote call is re-issued. The
//! bound counts retries after the first attempt, so `Bounded(n)` permits at
//! most `n + 1` attempts in total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Upper bound on retries after the first attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "MaxRetriesRepr", into = "MaxRetriesRepr")]
pub enum MaxRetries {
    /// At most this many retries after the first attempt
    Bounded(u32),

    /// Retry until the operation succeeds (default)
    #[default]
    Unbounded,
}

impl MaxRetries {
    /// Check whether the bound is finite
    pub fn is_bounded(&self) -> bool {
        matches!(self, MaxRetries::Bounded(_))
    }
}

impl fmt::Display for MaxRetries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxRetries::Bounded(n) => write!(f, "{}", n),
            MaxRetries::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl FromStr for MaxRetries {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "unbounded" | "infinite" | "inf" => Ok(MaxRetries::Unbounded),
            _ => trimmed
                .parse::<u32>()
                .map(MaxRetries::Bounded)
                .map_err(|_| Error::invalid_max_retries(s)),
        }
    }
}

impl From<u32> for MaxRetries {
    fn from(n: u32) -> Self {
        MaxRetries::Bounded(n)
    }
}

/// Wire form: either an integer count or a keyword
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MaxRetriesRepr {
    Count(u32),
    Keyword(String),
}

impl TryFrom<MaxRetriesRepr> for MaxRetries {
    type Error = Error;

    fn try_from(repr: MaxRetriesRepr) -> Result<Self, Self::Error> {
        match repr {
            MaxRetriesRepr::Count(n) => Ok(MaxRetries::Bounded(n)),
            MaxRetriesRepr::Keyword(word) => word.parse(),
        }
    }
}

impl From<MaxRetries> for MaxRetriesRepr {
    fn from(max: MaxRetries) -> Self {
        match max {
            MaxRetries::Bounded(n) => MaxRetriesRepr::Count(n),
            MaxRetries::Unbounded => MaxRetriesRepr::Keyword("unbounded".to_string()),
        }
    }
}

/// Retry policy for a store
///
/// Immutable once handed to an executor; every call made through a facade
/// shares the same policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    #[serde(default)]
    pub max_retries: MaxRetries,
}

impl RetryPolicy {
    /// Create a policy with the given bound
    pub fn new(max_retries: MaxRetries) -> Self {
        Self { max_retries }
    }

    /// A policy that retries at most `n` times after the first attempt
    pub fn bounded(n: u32) -> Self {
        Self::new(MaxRetries::Bounded(n))
    }

    /// A policy that retries until success
    pub fn unbounded() -> Self {
        Self::new(MaxRetries::Unbounded)
    }

    /// A policy that makes exactly one attempt
    pub fn no_retry() -> Self {
        Self::bounded(0)
    }

    /// Total attempts permitted, or `None` when unbounded
    ///
    /// Widened to `u64` so `Bounded(u32::MAX)` still counts its first attempt.
    pub fn max_attempts(&self) -> Option<u64> {
        match self.max_retries {
            MaxRetries::Bounded(n) => Some(u64::from(n) + 1),
            MaxRetries::Unbounded => None,
        }
    }

    /// Whether another attempt may follow `attempts_made` failed attempts
    pub fn allows_retry(&self, attempts_made: u64) -> bool {
        match self.max_retries {
            MaxRetries::Bounded(n) => attempts_made <= u64::from(n),
            MaxRetries::Unbounded => true,
        }
    }
}

impl From<MaxRetries> for RetryPolicy {
    fn from(max_retries: MaxRetries) -> Self {
        Self::new(max_retries)
    }
}
