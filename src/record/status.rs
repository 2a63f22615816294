/// Analysis status definitions for tracking a record through the remote pipeline
///
/// The remote service drives every transition; the client only ever reads the
/// status it was last sent.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of an analysis record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    // ===== Active States =====
    /// Submitted and waiting for an analyzer
    Queued,

    /// Currently being fetched and analyzed
    Running,

    // ===== Terminal States =====
    /// Analysis finished and metrics are available
    #[serde(alias = "completed")]
    Done,

    /// Analysis failed
    Error,
}

impl RecordStatus {
    /// Returns true if this is a terminal state (no further polling needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the remote service may still change this record
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    /// Converts the status to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Parses a status from its wire representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "done" | "completed" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Human-readable label used by the detail view
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Running => "Analyzing...",
            Self::Done => "Completed",
            Self::Error => "Failed",
        }
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 4] {
        [Self::Queued, Self::Running, Self::Done, Self::Error]
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
