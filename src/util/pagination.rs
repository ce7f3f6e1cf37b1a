use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Raw `?page=&limit=` query values. Anything unparsable falls back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page < 1 { DEFAULT_PAGE } else { page as u64 };
        let limit = if limit < 1 { DEFAULT_LIMIT } else { (limit as u64).min(MAX_LIMIT) };
        PageRequest { page, limit }
    }

    /// Capped at `i64::MAX`, the largest skip the database accepts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit).min(i64::MAX as u64)
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        Pagination { total, page: self.page, pages: total.div_ceil(self.limit) }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

impl From<PageParams> for PageRequest {
    fn from(params: PageParams) -> Self {
        let parse = |raw: Option<String>, default: u64| {
            raw.and_then(|v| v.trim().parse::<i64>().ok()).unwrap_or(default as i64)
        };
        PageRequest::new(parse(params.page, DEFAULT_PAGE), parse(params.limit, DEFAULT_LIMIT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}
