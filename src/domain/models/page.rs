//! Pagination primitives shared by every listing operation.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Largest page size the HTTP boundary accepts.
pub const MAX_LIMIT: u32 = 100;

/// Window into a filtered, ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Build a request from raw caller values: missing values take the
    /// defaults, `limit` is clamped to `1..=MAX_LIMIT` and `offset` to `>= 0`.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit.map_or(DEFAULT_LIMIT, |l| {
            u32::try_from(l.clamp(1, i64::from(MAX_LIMIT))).unwrap_or(DEFAULT_LIMIT)
        });
        let offset = offset.map_or(0, |o| u32::try_from(o.max(0)).unwrap_or(u32::MAX));
        Self { limit, offset }
    }

    /// Apply this window to an already filtered and ordered slice.
    ///
    /// An offset at or past the end yields an empty page; a window running
    /// past the end is truncated.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = (self.offset as usize).min(items.len());
        let end = start.saturating_add(self.limit as usize).min(items.len());
        items[start..end].to_vec()
    }
}

/// One page of results plus the number of rows matching the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_defaults() {
        assert_eq!(PageRequest::clamped(None, None), PageRequest::new(20, 0));
    }

    #[test]
    fn test_clamped_bounds() {
        assert_eq!(PageRequest::clamped(Some(0), Some(-5)), PageRequest::new(1, 0));
        assert_eq!(PageRequest::clamped(Some(1000), Some(7)), PageRequest::new(100, 7));
        assert_eq!(PageRequest::clamped(Some(50), Some(0)), PageRequest::new(50, 0));
    }

    #[test]
    fn test_slice_truncates_and_empties() {
        let items = vec![1, 2, 3];
        assert_eq!(PageRequest::new(2, 1).slice(&items), vec![2, 3]);
        assert_eq!(PageRequest::new(5, 2).slice(&items), vec![3]);
        assert!(PageRequest::new(5, 3).slice(&items).is_empty());
        assert!(PageRequest::new(5, 10).slice(&items).is_empty());
    }
}
