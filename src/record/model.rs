//! Analysis record data transfer object
//!
//! A [`Record`] is replaced wholesale on every fetch; nothing here mutates one.

use crate::record::RecordStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable server-assigned identifier of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One analyzed address with its status and page-structure metrics
///
/// Field names follow the camelCase JSON contract. The PascalCase names a
/// Go-default encoder emits and the snake_case names of the older dashboard
/// contract are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(alias = "ID")]
    pub id: RecordId,

    #[serde(alias = "Address", alias = "url")]
    pub address: String,

    #[serde(alias = "Status")]
    pub status: RecordStatus,

    /// Page title, present once analysis is done
    #[serde(
        default,
        alias = "Title",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,

    /// Detected HTML version, present once analysis is done
    #[serde(
        default,
        alias = "HTMLVersion",
        alias = "html_version",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub html_version: Option<String>,

    #[serde(default, alias = "H1", alias = "h1_count")]
    pub h1: u32,
    #[serde(default, alias = "H2", alias = "h2_count")]
    pub h2: u32,
    #[serde(default, alias = "H3", alias = "h3_count")]
    pub h3: u32,
    #[serde(default, alias = "H4", alias = "h4_count")]
    pub h4: u32,
    #[serde(default, alias = "H5", alias = "h5_count")]
    pub h5: u32,
    #[serde(default, alias = "H6", alias = "h6_count")]
    pub h6: u32,

    #[serde(default, alias = "InternalLinks", alias = "internal_links")]
    pub internal_links: u32,

    #[serde(default, alias = "ExternalLinks", alias = "external_links")]
    pub external_links: u32,

    #[serde(default, alias = "BrokenLinks", alias = "broken_links")]
    pub broken_links: u32,

    #[serde(default, alias = "HasLoginForm", alias = "has_login_form")]
    pub has_login_form: bool,

    #[serde(alias = "CreatedAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Builds a freshly queued record with zeroed metrics
    pub fn queued(id: u64, address: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RecordId(id),
            address: address.into(),
            status: RecordStatus::Queued,
            title: None,
            html_version: None,
            h1: 0,
            h2: 0,
            h3: 0,
            h4: 0,
            h5: 0,
            h6: 0,
            internal_links: 0,
            external_links: 0,
            broken_links: 0,
            has_login_form: false,
            created_at,
        }
    }

    /// Heading counts in h1..h6 order
    pub fn headings(&self) -> [u32; 6] {
        [self.h1, self.h2, self.h3, self.h4, self.h5, self.h6]
    }

    /// Internal plus external links
    pub fn total_links(&self) -> u32 {
        self.internal_links.saturating_add(self.external_links)
    }

    /// True when the broken-link count does not exceed the links found
    pub fn link_counts_consistent(&self) -> bool {
        self.broken_links <= self.total_links()
    }

    /// Title, or an empty string when the analysis has not produced one
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
