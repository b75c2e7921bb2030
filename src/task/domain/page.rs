//! Pagination for relationship listings.

use super::TaskRelationDomainError;
use serde::{Deserialize, Serialize};

/// Requested page of a listing. Pages are numbered from 1.
///
/// Deserialization goes through [`PageRequest::new`], so a zero page or
/// limit is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

#[derive(Deserialize)]
struct RawPageRequest {
    page: u32,
    limit: u32,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = TaskRelationDomainError;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        Self::new(raw.page, raw.limit)
    }
}

impl PageRequest {
    /// Creates a validated page request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationDomainError::InvalidPageNumber`] when `page` is
    /// zero or [`TaskRelationDomainError::InvalidPageLimit`] when `limit` is
    /// zero.
    pub const fn new(page: u32, limit: u32) -> Result<Self, TaskRelationDomainError> {
        if page == 0 {
            return Err(TaskRelationDomainError::InvalidPageNumber);
        }
        if limit == 0 {
            return Err(TaskRelationDomainError::InvalidPageLimit);
        }
        Ok(Self { page, limit })
    }

    /// Returns the first page of `limit` rows. A zero limit is raised to one.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self {
            page: 1,
            limit: if limit == 0 { 1 } else { limit },
        }
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }

    /// Returns this request with the limit capped at `max_limit`.
    #[must_use]
    pub fn clamped(self, max_limit: u32) -> Self {
        Self {
            page: self.page,
            limit: self.limit.min(max_limit.max(1)),
        }
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(self) -> u64 {
        (self.page as u64).saturating_sub(1) * self.limit as u64
    }

    /// Cuts this page out of an already ordered result set.
    #[must_use]
    pub fn slice<T>(self, ordered: Vec<T>) -> Page<T> {
        let total = ordered.len() as u64;
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let items = ordered.into_iter().skip(skip).take(take).collect();
        Page::new(items, self, total)
    }
}

/// One page of an ordered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Page size used for the query.
    pub limit: u32,
    /// Total rows across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page from rows and the request that produced them.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
        }
    }

    /// Transforms every row, keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }

    /// Returns whether a later page exists.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        (self.page as u64) * (self.limit as u64) < self.total
    }
}
