//! Page-based listing arithmetic and permissive parameter parsing.
//!
//! Pagination input comes straight from the query string and is never
//! rejected: anything that does not yield a positive integer falls back to
//! the default. A leading run of digits is honoured, so `"3abc"` reads as 3.

use std::collections::HashMap;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT } }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn from_query(params: &HashMap<String, String>) -> Self {
        Self::parse(params.get("page").map(String::as_str), params.get("limit").map(String::as_str))
    }

    /// Number of documents before this page.
    pub fn skip(&self) -> u64 { (self.page - 1).saturating_mul(self.limit) }
}

/// `ceil(total / limit)`; zero items means zero pages.
pub fn total_pages(total_items: u64, limit: u64) -> u64 {
    if limit == 0 { return 0; }
    total_items.div_ceil(limit)
}

/// Integer prefix of the input (after leading whitespace and an optional `+`),
/// kept only if positive. Values past `u64::MAX` saturate.
fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let s = raw?.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 { return None; }
    let n: u64 = s[..end].parse().unwrap_or(u64::MAX);
    if n == 0 { None } else { Some(n) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_missing_or_garbage() {
        assert_eq!(PageRequest::parse(None, None), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("abc"), Some("")), PageRequest::default());
        assert_eq!(PageRequest::parse(Some("0"), Some("-3")), PageRequest::default());
    }

    #[test]
    fn oversized_page_saturates() {
        let req = PageRequest::parse(Some("99999999999999999999999"), Some("99999999999999999999999"));
        assert_eq!(req, PageRequest { page: u64::MAX, limit: u64::MAX });
        assert_eq!(req.skip(), u64::MAX);
        assert_eq!(PageRequest::parse(Some("00000000000000000000000"), None).page, DEFAULT_PAGE);
    }

    #[test]
    fn numeric_prefix_is_honoured() {
        assert_eq!(PageRequest::parse(Some("3abc"), Some(" 10")), PageRequest { page: 3, limit: 10 });
        assert_eq!(PageRequest::parse(Some("2.9"), Some("+4")), PageRequest { page: 2, limit: 4 });
    }

    #[test]
    fn skip_and_total_pages() {
        assert_eq!(PageRequest::new(1, 5).skip(), 0);
        assert_eq!(PageRequest::new(3, 5).skip(), 10);
        assert_eq!(PageRequest::new(u64::MAX, u64::MAX).skip(), u64::MAX);
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 1000), 1);
    }
}
