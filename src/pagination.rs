use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::QueryError;
use crate::models::QueryDescriptor;

/// Page bounds taken from a descriptor's `skip` (1-based page number) and
/// `limit` (page size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

/// Paging summary returned next to a listing's items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub items_per_page: u64,
}

impl Pagination {
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidPagination`] when `limit` or `skip` is
    /// missing, fractional, or below 1. `limit` is checked first.
    pub fn from_descriptor(descriptor: &QueryDescriptor) -> Result<Self, QueryError> {
        let per_page = positive_integer(descriptor.limit)
            .ok_or_else(|| QueryError::invalid_pagination("Limit must be greater than 0"))?;
        let page = positive_integer(descriptor.skip)
            .ok_or_else(|| QueryError::invalid_pagination("Skip must be greater than 0"))?;
        Ok(Self { page, per_page })
    }

    /// Number of items before the first one on this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    #[must_use]
    pub fn meta(&self, total_items: u64) -> PageMeta {
        PageMeta {
            total_items,
            total_pages: total_items.div_ceil(self.per_page),
            current_page: self.page,
            items_per_page: self.per_page,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn positive_integer(number: Option<f64>) -> Option<u64> {
    number
        .filter(|n| n.is_finite() && n.fract() == 0.0 && *n >= 1.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
}
