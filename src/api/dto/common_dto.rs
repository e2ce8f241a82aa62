//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to 1..=100.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }
}

/// Applies pagination to an already-filtered item list.
pub fn paginate<T>(items: Vec<T>, params: PaginationParams) -> (Vec<T>, PaginationMeta) {
    let params = params.clamped();
    #[allow(clippy::cast_possible_truncation)]
    let total = items.len() as u32;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(params.per_page)
    };
    let start = ((params.page - 1) * params.per_page) as usize;
    let data = items
        .into_iter()
        .skip(start)
        .take(params.per_page as usize)
        .collect();
    (
        data,
        PaginationMeta {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        },
    )
}
