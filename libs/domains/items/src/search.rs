//! Request shaping for the ranking pipeline.

use crate::cursor::Cursor;
use crate::models::{Item, ListItemsQuery};
use crate::repository::{ItemQuery, StructuredFilters};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

/// Default 20, clamped to `1..=100`.
pub fn clamp_limit(limit: Option<i64>) -> u64 {
    match limit {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, MAX_LIMIT as i64) as u64,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// One owner-scoped search, normalized from the query string.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub owner_id: String,
    pub text: Option<String>,
    pub filters: StructuredFilters,
    pub cursor: Option<Cursor>,
    pub limit: u64,
    pub semantic: bool,
}

impl SearchRequest {
    pub fn new(owner_id: impl Into<String>, query: ListItemsQuery) -> Self {
        Self {
            owner_id: owner_id.into(),
            text: non_blank(query.query),
            filters: StructuredFilters {
                category: non_blank(query.category),
                vendor: non_blank(query.vendor),
                colour_hex: non_blank(query.hex),
                price_max: query.price_max,
            },
            // Malformed cursors read as "first page".
            cursor: query.cursor.as_deref().and_then(Cursor::parse),
            limit: clamp_limit(query.limit),
            semantic: query.semantic,
        }
    }

    /// Semantic ranking needs a non-empty query.
    pub fn wants_semantic(&self) -> bool {
        self.semantic && self.text.is_some()
    }

    pub fn text_query(&self) -> ItemQuery {
        ItemQuery {
            owner_id: self.owner_id.clone(),
            text: self.text.clone(),
            filters: self.filters.clone(),
            cursor: self.cursor.clone(),
            limit: self.limit,
        }
    }
}

/// Structured predicates applied after vector retrieval. Unlike text mode,
/// an item with no colour or price passes the matching filter.
pub fn post_filter(items: Vec<Item>, filters: &StructuredFilters) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| filters.admits(item))
        .collect()
}
