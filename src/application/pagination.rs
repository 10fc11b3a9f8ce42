//! Offset/limit pagination shared by listings and lyrics.

use serde::Serialize;

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_OFFSET: u32 = 0;
pub const MAX_LIMIT: u32 = 100;

/// A resolved `LIMIT`/`OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    limit: u32,
    offset: u32,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl PageWindow {
    /// Absent or non-positive limits fall back to the default; negative offsets become zero.
    pub fn from_raw(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(value) if value > 0 => value.min(i64::from(MAX_LIMIT)) as u32,
            _ => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
            _ => DEFAULT_OFFSET,
        };
        Self { limit, offset }
    }

    pub fn new(limit: u32, offset: u32) -> Self {
        Self::from_raw(Some(i64::from(limit)), Some(i64::from(offset)))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub(crate) fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub(crate) fn sql_offset(&self) -> i64 {
        i64::from(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        let window = PageWindow::from_raw(None, None);
        assert_eq!(window.limit(), DEFAULT_LIMIT);
        assert_eq!(window.offset(), DEFAULT_OFFSET);
    }

    #[test]
    fn non_positive_values_use_defaults() {
        let window = PageWindow::from_raw(Some(0), Some(-4));
        assert_eq!(window, PageWindow::default());

        let window = PageWindow::from_raw(Some(-1), Some(0));
        assert_eq!(window, PageWindow::default());
    }

    #[test]
    fn limit_is_capped() {
        let window = PageWindow::from_raw(Some(10_000), Some(30));
        assert_eq!(window.limit(), MAX_LIMIT);
        assert_eq!(window.offset(), 30);
    }

    #[test]
    fn huge_offset_saturates() {
        let window = PageWindow::from_raw(Some(5), Some(i64::MAX));
        assert_eq!(window.offset(), u32::MAX);
        assert_eq!(window.sql_offset(), i64::from(u32::MAX));
    }
}
