//! Offset/limit paging shared by list endpoints.

pub const MAX_PAGE_LIMIT: u32 = 100;
pub const COURSE_PAGE_LIMIT: u32 = 50;
pub const BLOG_PAGE_LIMIT: u32 = 20;
pub const USER_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageRequest {
    /// Build a page from optional query values.
    ///
    /// Missing limits take `default_limit`; zero or oversized limits are
    /// clamped into `1..=MAX_PAGE_LIMIT`.
    pub fn new(limit: Option<u32>, offset: Option<u32>, default_limit: u32) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT);
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }

    /// Every row, for internal aggregation and small fixed lists.
    pub fn unbounded() -> Self {
        Self {
            limit: u32::MAX,
            offset: 0,
        }
    }

    pub fn offset_usize(self) -> usize {
        self.offset as usize
    }

    pub fn limit_usize(self) -> usize {
        self.limit as usize
    }

    pub fn sql_limit(self) -> i64 {
        i64::from(self.limit)
    }

    pub fn sql_offset(self) -> i64 {
        i64::from(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let page = PageRequest::new(None, None, COURSE_PAGE_LIMIT);
        assert_eq!(page, PageRequest { limit: 50, offset: 0 });
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(PageRequest::new(Some(0), None, BLOG_PAGE_LIMIT).limit, 1);
        assert_eq!(
            PageRequest::new(Some(5_000), Some(10), BLOG_PAGE_LIMIT),
            PageRequest {
                limit: MAX_PAGE_LIMIT,
                offset: 10
            }
        );
    }
}
