//! Pagination and search parameters for list endpoints, and the page
//! envelope they return.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maximum number of rows per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(size: u32) -> u32 {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// Query for one page of a list endpoint (`?page=&size=&search=`).
///
/// `page` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            search: None,
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: clamp_page_size(size),
            search: None,
        }
    }

    /// Attach a search term. Blank terms clear the search.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    /// Query-string pairs, omitting the search term when there is none.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("size", clamp_page_size(self.size).to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of rows across all pages.
    pub total: u64,
    pub total_pages: u32,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
}

impl<T: DeserializeOwned> Page<T> {
    /// Parse a list response.
    ///
    /// Accepts a bare JSON array or an envelope of the form
    /// `{ "content" | "data" | "items": [...], "totalElements" | "total",
    /// "totalPages", "number" | "page", "size" }`. Missing envelope fields are
    /// derived from `query` and the item count.
    pub fn from_value(value: serde_json::Value, query: &PageQuery) -> Result<Self, serde_json::Error> {
        let page = match serde_json::from_value::<PageWire<T>>(value)? {
            PageWire::Bare(items) => {
                let total = items.len() as u64;
                Page {
                    size: items.len() as u32,
                    total_pages: u32::from(!items.is_empty()),
                    page: 0,
                    total,
                    items,
                }
            }
            PageWire::Envelope(envelope) => {
                let size = envelope.size.unwrap_or(query.size);
                let total = envelope.total_elements.unwrap_or(envelope.content.len() as u64);
                let total_pages = envelope
                    .total_pages
                    .unwrap_or_else(|| total_pages_for(total, size));
                Page {
                    items: envelope.content,
                    total,
                    total_pages,
                    page: envelope.number.unwrap_or(query.page),
                    size,
                }
            }
        };
        Ok(page)
    }
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

fn total_pages_for(total: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(size)) as u32
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageWire<T> {
    Bare(Vec<T>),
    Envelope(Envelope<T>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    #[serde(alias = "data", alias = "items")]
    content: Vec<T>,
    #[serde(default, alias = "total")]
    total_elements: Option<u64>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default, alias = "page")]
    number: Option<u32>,
    #[serde(default)]
    size: Option<u32>,
}
