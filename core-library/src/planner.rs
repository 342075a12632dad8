//! Query Planner
//!
//! Splits a [`QuerySpec`] into what the media index can evaluate itself
//! (media types, favorites, collection scope, sort, row window) and what must
//! run after normalization (the filename-extension allow-list).
//!
//! When a post-filter is present the row window cannot be pushed into the
//! store: skipping rows there would skip rows the filter might have dropped.
//! In that case the store returns every matching row and the window is
//! applied in memory after filtering.

use bridge_traits::media_store::{columns, StoreQuery, StoreValue};
use std::collections::BTreeSet;

use crate::models::{Asset, QuerySpec, SortBy, SortOrder};
use crate::pagination::PaginationWindow;

/// Predicates evaluated on normalized assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Every asset passes
    None,
    /// Filename extension must be in the set (lowercase, no dot)
    Extensions(BTreeSet<String>),
}

impl PostFilter {
    pub fn is_none(&self) -> bool {
        matches!(self, PostFilter::None)
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        match self {
            PostFilter::None => true,
            PostFilter::Extensions(allowed) => asset
                .filename
                .rsplit_once('.')
                .map(|(_, ext)| allowed.contains(&ext.to_ascii_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// Where the row window is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPlacement {
    Store,
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// `WHERE` body over store columns, `None` for all rows
    pub selection: Option<String>,
    pub args: Vec<StoreValue>,
    /// `ORDER BY` body over store columns
    pub sort_order: String,
    pub window: PaginationWindow,
    pub window_placement: WindowPlacement,
    pub post_filter: PostFilter,
    /// The plan can only produce an empty page; skip the store
    pub yields_nothing: bool,
}

impl QueryPlan {
    /// The query to hand to the media index.
    pub fn store_query(&self) -> StoreQuery {
        let mut query = StoreQuery::new().with_sort_order(self.sort_order.clone());
        if let Some(selection) = &self.selection {
            query = query.with_selection(selection.clone(), self.args.clone());
        }
        match self.window_placement {
            WindowPlacement::Store => query.with_window(self.window.offset, self.window.limit),
            WindowPlacement::Memory => query,
        }
    }

    /// Post-filter and window already-normalized assets, preserving order.
    pub fn finish(&self, assets: Vec<Asset>) -> Vec<Asset> {
        let filtered: Vec<Asset> = if self.post_filter.is_none() {
            assets
        } else {
            assets
                .into_iter()
                .filter(|a| self.post_filter.matches(a))
                .collect()
        };

        match self.window_placement {
            WindowPlacement::Store => filtered,
            WindowPlacement::Memory => self.window.apply(filtered),
        }
    }
}

pub fn plan(spec: &QuerySpec) -> QueryPlan {
    let mut conditions: Vec<String> = Vec::new();
    let mut args: Vec<StoreValue> = Vec::new();

    let codes: Vec<i64> = spec.media_types().iter().map(|t| t.store_code()).collect();
    if !codes.is_empty() {
        let placeholders = vec!["?"; codes.len()].join(", ");
        conditions.push(format!("{} IN ({})", columns::MEDIA_TYPE, placeholders));
        args.extend(codes.into_iter().map(StoreValue::Integer));
    }

    if spec.only_favorites() {
        conditions.push(format!("{} = 1", columns::IS_FAVORITE));
    }

    if let Some(collection_id) = spec.collection_id() {
        conditions.push(format!("{} = ?", columns::BUCKET_ID));
        args.push(StoreValue::Text(collection_id.to_string()));
    }

    let selection = if conditions.is_empty() {
        None
    } else {
        Some(conditions.join(" AND "))
    };

    let column = match spec.sort_by() {
        SortBy::CreationTime => columns::DATE_ADDED,
        SortBy::ModificationTime => columns::DATE_MODIFIED,
    };
    let direction = match spec.sort_order() {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let sort_order = format!("{col} {dir}, {id} {dir}", col = column, dir = direction, id = columns::ID);

    let post_filter = match spec.extensions() {
        Some(extensions) => PostFilter::Extensions(extensions.clone()),
        None => PostFilter::None,
    };

    let window = PaginationWindow::new(spec.offset(), spec.limit());
    let window_placement = if post_filter.is_none() {
        WindowPlacement::Store
    } else {
        WindowPlacement::Memory
    };

    QueryPlan {
        selection,
        args,
        sort_order,
        window,
        window_placement,
        post_filter,
        yields_nothing: window.is_empty() || spec.media_types().is_empty(),
    }
}
