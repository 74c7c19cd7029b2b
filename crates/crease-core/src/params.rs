// ── List parameters ──
//
// Pagination, ordering and filters for list requests, flattened into the
// query map the backend expects.

use crease_api::QueryMap;

/// Sort direction for list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Builder for list query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    offset: Option<u32>,
    sort: Option<(String, SortOrder)>,
    search: Option<String>,
    filters: QueryMap,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Flatten into a query map. Explicit filters never override the
    /// pagination or sort keys.
    pub fn into_query(self) -> QueryMap {
        let mut query = self.filters;
        if let Some(term) = self.search {
            query.insert("search".into(), term);
        }
        if let Some(page) = self.page {
            query.insert("page".into(), page.to_string());
        }
        if let Some(limit) = self.limit {
            query.insert("limit".into(), limit.to_string());
        }
        if let Some(offset) = self.offset {
            query.insert("offset".into(), offset.to_string());
        }
        if let Some((field, order)) = self.sort {
            query.insert("sort".into(), field);
            query.insert("order".into(), order.to_string());
        }
        query
    }
}
