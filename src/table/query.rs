//! View parameters for the record table
//!
//! Every setter reports whether it changed anything. Changes to the search
//! term, status filter, sort field, sort order or page size reset the page to 1.

use crate::config::TableConfig;
use crate::record::RecordStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column a table can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Address,
    Status,
    Title,
    CreatedAt,
    InternalLinks,
    ExternalLinks,
    BrokenLinks,
}

impl SortField {
    /// Wire name, as sent in the `sort` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Status => "status",
            Self::Title => "title",
            Self::CreatedAt => "createdAt",
            Self::InternalLinks => "internalLinks",
            Self::ExternalLinks => "externalLinks",
            Self::BrokenLinks => "brokenLinks",
        }
    }

    /// Returns all sortable fields
    pub fn all() -> [Self; 7] {
        [
            Self::Address,
            Self::Status,
            Self::Title,
            Self::CreatedAt,
            Self::InternalLinks,
            Self::ExternalLinks,
            Self::BrokenLinks,
        ]
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    /// Accepts camelCase, snake_case and kebab-case spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        Self::all()
            .into_iter()
            .find(|field| field.as_str().to_ascii_lowercase() == key)
            .ok_or_else(|| format!("unknown sort field '{}'", s))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Wire name, as sent in the `order` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction
    pub fn toggled(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(format!("unknown sort order '{}'", s)),
        }
    }
}

/// The user's current view parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    search_term: String,
    status_filter: Option<RecordStatus>,
    sort_field: SortField,
    sort_order: SortOrder,
    page: usize,
    page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(10, SortField::CreatedAt, SortOrder::Desc)
    }
}

impl QueryState {
    /// Creates a query on page 1 with no filters
    pub fn new(page_size: usize, sort_field: SortField, sort_order: SortOrder) -> Self {
        Self {
            search_term: String::new(),
            status_filter: None,
            sort_field,
            sort_order,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Creates the initial query from the table configuration
    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.page_size, config.sort_field, config.sort_order)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status_filter(&self) -> Option<RecordStatus> {
        self.status_filter
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_field
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Current page, 1-based
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Index of the first row of the current page in the derived sequence
    ///
    /// Saturates for pages far past the end; the controller clamps those.
    pub fn start_index(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term == self.search_term {
            return false;
        }
        self.search_term = term;
        self.page = 1;
        true
    }

    pub fn set_status_filter(&mut self, status: Option<RecordStatus>) -> bool {
        if status == self.status_filter {
            return false;
        }
        self.status_filter = status;
        self.page = 1;
        true
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) -> bool {
        if field == self.sort_field && order == self.sort_order {
            return false;
        }
        self.sort_field = field;
        self.sort_order = order;
        self.page = 1;
        true
    }

    /// Header-click semantics: the active column flips direction, a new column starts ascending
    pub fn toggle_sort(&mut self, field: SortField) -> bool {
        let order = if field == self.sort_field {
            self.sort_order.toggled()
        } else {
            SortOrder::Asc
        };
        self.set_sort(field, order)
    }

    /// Moves to `page` (values below 1 become 1); upper bounds are the controller's concern
    pub fn set_page(&mut self, page: usize) -> bool {
        let page = page.max(1);
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let page_size = page_size.max(1);
        if page_size == self.page_size {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        true
    }
}
