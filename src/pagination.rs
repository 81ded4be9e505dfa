//! Pagination for the back-office list endpoints.

use serde::{Deserialize, Serialize};

/// Limit/offset pair as it arrives on the query string. Accessors apply
/// the defaults and clamps, so handlers never see out-of-range values.
#[derive(Debug, Deserialize, Default)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationQuery {
    /// Page size, defaulting to 50 and capped at 100.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// One page of results plus the total count, echoing the applied
/// limit/offset back to the client.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
