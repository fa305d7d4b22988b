//! The closed set of local-part construction templates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A template for building an email local part from a first and last name.
///
/// Serialized as its template string (`"first.last"`, `"f-last"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EmailPattern {
    Last,
    FirstDotLast,
    LastDotFirst,
    FirstDashLast,
    LastDashFirst,
    FirstUnderscoreLast,
    LastUnderscoreFirst,
    FirstLast,
    LastFirst,
    InitialDotLast,
    InitialDashLast,
    InitialUnderscoreLast,
    InitialLast,
}

/// Used when neither a learned nor a detected pattern is available.
pub const DEFAULT_EMAIL_PATTERN: EmailPattern = EmailPattern::InitialDashLast;

impl EmailPattern {
    /// Every pattern, in candidate generation order.
    pub const ALL: [EmailPattern; 13] = [
        EmailPattern::Last,
        EmailPattern::FirstDotLast,
        EmailPattern::LastDotFirst,
        EmailPattern::FirstDashLast,
        EmailPattern::LastDashFirst,
        EmailPattern::FirstUnderscoreLast,
        EmailPattern::LastUnderscoreFirst,
        EmailPattern::FirstLast,
        EmailPattern::LastFirst,
        EmailPattern::InitialDotLast,
        EmailPattern::InitialDashLast,
        EmailPattern::InitialUnderscoreLast,
        EmailPattern::InitialLast,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EmailPattern::Last => "last",
            EmailPattern::FirstDotLast => "first.last",
            EmailPattern::LastDotFirst => "last.first",
            EmailPattern::FirstDashLast => "first-last",
            EmailPattern::LastDashFirst => "last-first",
            EmailPattern::FirstUnderscoreLast => "first_last",
            EmailPattern::LastUnderscoreFirst => "last_first",
            EmailPattern::FirstLast => "firstlast",
            EmailPattern::LastFirst => "lastfirst",
            EmailPattern::InitialDotLast => "f.last",
            EmailPattern::InitialDashLast => "f-last",
            EmailPattern::InitialUnderscoreLast => "f_last",
            EmailPattern::InitialLast => "flast",
        }
    }

    /// Render the local part for already-normalised name segments.
    ///
    /// The initial is the first character of `first`; an empty `first`
    /// yields an empty initial rather than an error.
    #[must_use]
    pub fn local_part(self, first: &str, last: &str) -> String {
        let initial: String = first.chars().take(1).collect();
        match self {
            EmailPattern::Last => last.to_string(),
            EmailPattern::FirstDotLast => format!("{first}.{last}"),
            EmailPattern::LastDotFirst => format!("{last}.{first}"),
            EmailPattern::FirstDashLast => format!("{first}-{last}"),
            EmailPattern::LastDashFirst => format!("{last}-{first}"),
            EmailPattern::FirstUnderscoreLast => format!("{first}_{last}"),
            EmailPattern::LastUnderscoreFirst => format!("{last}_{first}"),
            EmailPattern::FirstLast => format!("{first}{last}"),
            EmailPattern::LastFirst => format!("{last}{first}"),
            EmailPattern::InitialDotLast => format!("{initial}.{last}"),
            EmailPattern::InitialDashLast => format!("{initial}-{last}"),
            EmailPattern::InitialUnderscoreLast => format!("{initial}_{last}"),
            EmailPattern::InitialLast => format!("{initial}{last}"),
        }
    }
}

impl std::fmt::Display for EmailPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailPattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EmailPattern::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownPattern(s.to_string()))
    }
}

impl TryFrom<String> for EmailPattern {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EmailPattern> for String {
    fn from(value: EmailPattern) -> Self {
        value.as_str().to_string()
    }
}

fn default_found() -> bool {
    true
}

/// Output of the external pattern detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern: EmailPattern,
    pub reason: String,
    /// `false` when the detector only guessed without observed evidence.
    #[serde(default = "default_found")]
    pub found: bool,
}

/// A pattern promoted from the verification ledger of earlier scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub pattern: EmailPattern,
    pub reason: String,
}
