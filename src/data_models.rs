use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SearchResponse {
    pub results: Vec<BookResult>,
    pub pagination: Option<Pagination>,
}

impl SearchResponse {
    pub fn new(results: Vec<BookResult>, pagination: Option<Pagination>) -> SearchResponse {
        SearchResponse {
            results,
            pagination,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next_page)
    }
}

/// One row of the fiction listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookResult {
    pub title: String,
    pub authors: String,
    pub series: String,
    pub language: String,
    pub image_url: String,
    /// Content hash; keys the detail page.
    pub md5: String,
    pub mirrors: Vec<Mirror>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Mirror {
    pub url: String,
    pub size: f64,
    pub unit: String,
    pub format: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pagination {
    pub total_results: u64,
    /// 1-based index of the first row on this page.
    pub first: u64,
    pub last: u64,
    pub page: u32,
    pub has_next_page: bool,
}
