//! Tunables shared by the relationship services.

use crate::task::domain::{CHECKLIST_TEXT_MAX_CHARS, PageRequest};

/// Configuration for listings and checklist validation.
///
/// # Examples
///
/// ```
/// use trellis::task::services::TaskRelationConfig;
///
/// let config = TaskRelationConfig::default();
/// assert_eq!(config.default_page_limit, 20);
///
/// let compact = TaskRelationConfig::compact();
/// assert!(compact.max_page_limit < config.max_page_limit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRelationConfig {
    /// Page size used when the caller does not ask for one.
    pub default_page_limit: u32,
    /// Largest page size served; larger requests are clamped.
    pub max_page_limit: u32,
    /// Maximum checklist item length in characters.
    pub max_checklist_text_chars: usize,
}

impl Default for TaskRelationConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 20,
            max_page_limit: 100,
            max_checklist_text_chars: CHECKLIST_TEXT_MAX_CHARS,
        }
    }
}

impl TaskRelationConfig {
    /// Creates a configuration with small pages and short checklist items.
    ///
    /// Useful for constrained clients such as mobile views.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            default_page_limit: 10,
            max_page_limit: 25,
            max_checklist_text_chars: 280,
        }
    }

    /// Resolves an optional caller request into the page that will be served.
    #[must_use]
    pub fn resolve_page(&self, requested: Option<PageRequest>) -> PageRequest {
        requested.map_or_else(
            || PageRequest::first(self.default_page_limit.min(self.max_page_limit)),
            |request| request.clamped(self.max_page_limit),
        )
    }
}
