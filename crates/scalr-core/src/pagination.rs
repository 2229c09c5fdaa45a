//! The generic list contract: page options in, one page out
//!
//! Every list endpoint accepts `page[number]` and `page[size]` plus its own
//! `filter[...]` and `include` parameters, and answers with one page of
//! items and a `meta.pagination` block describing the whole result set.

use serde::{Deserialize, Serialize};

/// Page selection shared by every list query
///
/// Unset fields are not sent, so the service applies its own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// 1-based page number
    pub page_number: Option<u32>,
    /// Items per page (the service enforces its own maximum)
    pub page_size: Option<u32>,
}

impl ListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// `page[number]` / `page[size]` query pairs for the fields that are set
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(number) = self.page_number {
            pairs.push(("page[number]".to_string(), number.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page[size]".to_string(), size.to_string()));
        }
        pairs
    }
}

/// A list query: page selection plus resource-specific filters
pub trait ListQuery: Clone {
    fn list_options(&self) -> &ListOptions;

    fn list_options_mut(&mut self) -> &mut ListOptions;

    /// `filter[...]` and `include` pairs; unset filters produce nothing
    fn filters(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Complete query string pairs for this request
    fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = self.list_options().query_pairs();
        pairs.extend(self.filters());
        pairs
    }
}

impl ListQuery for ListOptions {
    fn list_options(&self) -> &ListOptions {
        self
    }

    fn list_options_mut(&mut self) -> &mut ListOptions {
        self
    }
}

/// Push `filter[name]=value` when `value` is set
pub(crate) fn push_filter(pairs: &mut Vec<(String, String)>, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        pairs.push((format!("filter[{name}]"), value.to_string()));
    }
}

/// Push `include=a,b` when any related resources were requested
pub(crate) fn push_include(pairs: &mut Vec<(String, String)>, include: &[String]) {
    if !include.is_empty() {
        pairs.push(("include".to_string(), include.join(",")));
    }
}

fn first_page() -> u32 {
    1
}

/// `meta.pagination` as returned by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub prev_page: Option<u32>,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
}

impl Pagination {
    /// Metadata for a response that carried none: a single, complete page
    pub fn single(current_page: u32, count: usize) -> Self {
        Self {
            current_page,
            prev_page: None,
            next_page: None,
            total_pages: u32::from(count > 0),
            total_count: count as u64,
        }
    }
}

/// One page of a list query's results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Build a page, synthesizing metadata when the response had none
    pub fn new(items: Vec<T>, pagination: Option<Pagination>, requested: &ListOptions) -> Self {
        let pagination = pagination.unwrap_or_else(|| {
            Pagination::single(requested.page_number.unwrap_or(1), items.len())
        });
        Self { items, pagination }
    }

    /// Number of items across all pages of the query
    pub fn total_count(&self) -> u64 {
        self.pagination.total_count
    }

    pub fn current_page(&self) -> u32 {
        self.pagination.current_page
    }

    /// Next page number, `None` on the last page
    pub fn next_page(&self) -> Option<u32> {
        self.pagination
            .next_page
            .filter(|next| *next > self.pagination.current_page)
    }

    pub fn is_last_page(&self) -> bool {
        self.next_page().is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
