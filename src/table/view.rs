//! Derived view computation: filter, stable sort, paginate
//!
//! Everything here is a pure function of the record collection and the query.

use crate::client::Pagination;
use crate::record::Record;
use crate::table::{QueryState, SortField, SortOrder};
use std::cmp::Ordering;

/// One rendered page of the derived view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPage<'a> {
    /// Rows on the current page, in display order
    pub rows: Vec<&'a Record>,

    /// Number of records matching the query across all pages
    pub total: usize,

    /// Number of pages available for `total` matches
    pub total_pages: usize,

    /// Index of the first row of this page within all matches
    pub start_index: usize,
}

/// Returns true if the record passes the search term and status filter
///
/// The search term matches case-insensitively anywhere in the address or title.
pub fn matches(record: &Record, query: &QueryState) -> bool {
    let needle = query.search_term().to_lowercase();
    let matches_search = needle.is_empty()
        || record.address.to_lowercase().contains(&needle)
        || record
            .title
            .as_deref()
            .is_some_and(|title| title.to_lowercase().contains(&needle));

    let matches_status = query
        .status_filter()
        .map_or(true, |status| record.status == status);

    matches_search && matches_status
}

/// Compares two records by a single field, ascending
///
/// Numbers and timestamps compare by value, strings case-insensitively.
pub fn compare_by(a: &Record, b: &Record, field: SortField) -> Ordering {
    match field {
        SortField::Address => compare_text(&a.address, &b.address),
        SortField::Status => compare_text(a.status.as_str(), b.status.as_str()),
        SortField::Title => compare_text(a.title_or_empty(), b.title_or_empty()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::InternalLinks => a.internal_links.cmp(&b.internal_links),
        SortField::ExternalLinks => a.external_links.cmp(&b.external_links),
        SortField::BrokenLinks => a.broken_links.cmp(&b.broken_links),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Sorts records in place, keeping ties in their original relative order
///
/// Descending order reverses the comparator rather than the result, so equal
/// keys stay in collection order in both directions.
pub fn sort_records(records: &mut [&Record], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Number of pages needed for `total` rows
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Filters and sorts the whole collection
pub fn filter_and_sort<'a>(records: &'a [Record], query: &QueryState) -> Vec<&'a Record> {
    let mut matching: Vec<&Record> = records.iter().filter(|r| matches(r, query)).collect();
    sort_records(&mut matching, query.sort_field(), query.sort_order());
    matching
}

/// Computes the page of the derived view the query asks for
///
/// With local pagination the collection is sliced here. With server
/// pagination the collection already is the requested page; it is filtered
/// and sorted the same way and the page count comes from the server total.
pub fn derive_page<'a>(
    records: &'a [Record],
    query: &QueryState,
    pagination: Pagination,
) -> DerivedPage<'a> {
    let matching = filter_and_sort(records, query);
    let page_size = query.page_size();
    let start_index = query.start_index();

    let (rows, total) = match pagination {
        Pagination::Local => {
            let total = matching.len();
            let rows = matching
                .into_iter()
                .skip(start_index)
                .take(page_size)
                .collect();
            (rows, total)
        }
        Pagination::Server { total } => {
            let rows = matching.into_iter().take(page_size).collect();
            (rows, total)
        }
    };

    DerivedPage {
        rows,
        total,
        total_pages: page_count(total, page_size),
        start_index,
    }
}
