//! Page normalisation and navigation links for list endpoints.
//!
//! Raw `perPage`/`page` query values are normalised leniently: anything that
//! does not start with an integer falls back to the default, `perPage` is
//! capped at [`MAX_PER_PAGE`], and nothing here ever fails.

use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;
pub const DEFAULT_PAGE: i64 = 1;

/// Raw pagination query parameters, exactly as the client sent them.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub page: Option<String>,
}

/// Normalised pagination parameters for one list request.
///
/// Serializes as the `_meta` object of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub total_items: u64,
    pub per_page: i64,
    /// `ceil(total_items / per_page)`; `None` when `per_page` is zero and
    /// the quotient is not a finite number.
    pub total_pages: Option<i64>,
    pub page: i64,
}

/// Navigation links for a paginated list; serializes as `_links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub current: String,
    pub next: Option<String>,
    pub prev: Option<String>,
    pub first: String,
    pub last: Option<String>,
}

/// One page of results together with the state that produced it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub state: PaginationState,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            state: self.state,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl PaginationState {
    /// Normalises raw query values against the number of matching items.
    ///
    /// A non-positive `perPage` is passed through unchanged and flows into
    /// the page count as is; only the upper bound is enforced.
    #[must_use]
    pub fn compute(per_page_raw: Option<&str>, page_raw: Option<&str>, total_items: u64) -> Self {
        let per_page = per_page_raw
            .and_then(parse_leading_int)
            .unwrap_or(DEFAULT_PER_PAGE)
            .min(MAX_PER_PAGE);

        let page = page_raw.and_then(parse_leading_int).unwrap_or(DEFAULT_PAGE);

        Self {
            total_items,
            per_page,
            total_pages: total_pages(total_items, per_page),
            page,
        }
    }

    #[must_use]
    pub fn from_query(query: &PageQuery, total_items: u64) -> Self {
        Self::compute(query.per_page.as_deref(), query.page.as_deref(), total_items)
    }

    /// `(page - 1) * perPage`, saturating at the `i64` bounds.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page
    }

    /// The `(limit, offset)` window to fetch from storage, or `None` when the
    /// window is necessarily empty.
    #[must_use]
    pub fn fetch_window(&self) -> Option<(u64, u64)> {
        let limit = u64::try_from(self.limit()).ok().filter(|l| *l > 0)?;
        let offset = u64::try_from(self.offset()).unwrap_or(0);
        Some((limit, offset))
    }

    /// `page < totalPages`, where a zero `per_page` over a non-empty list
    /// leaves the page count unbounded.
    fn has_next(&self) -> bool {
        match self.total_pages {
            Some(total) => self.page < total,
            None => self.per_page == 0 && self.total_items > 0,
        }
    }

    /// Builds `self`/`next`/`prev`/`first`/`last` from `base`.
    ///
    /// Only `perPage` and `page` survive on the generated links; any query
    /// string already present on `base` is dropped.
    #[must_use]
    pub fn build_links(&self, base: &Url) -> PageLinks {
        let link = |page: i64| page_url(base, self.per_page, page);

        let next = self.has_next().then(|| link(self.page.saturating_add(1)));
        let prev = (self.page > 1).then(|| link(self.page - 1));

        PageLinks {
            current: link(self.page),
            next,
            prev,
            first: link(1),
            last: self.total_pages.map(link),
        }
    }
}

/// Rounds towards positive infinity, so a negative `per_page` yields a
/// non-positive count (`12 / -5` gives `-2`).
fn total_pages(total_items: u64, per_page: i64) -> Option<i64> {
    let pages = match per_page {
        0 => return None,
        p if p > 0 => total_items.div_ceil(p.unsigned_abs()),
        p => total_items / p.unsigned_abs(),
    };
    let pages = i64::try_from(pages).unwrap_or(i64::MAX);
    Some(if per_page < 0 { -pages } else { pages })
}

fn page_url(base: &Url, per_page: i64, page: i64) -> String {
    let mut url = base.clone();
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("perPage", &per_page.to_string())
        .append_pair("page", &page.to_string());
    url.into()
}

/// Reads the integer at the start of `raw`, ignoring leading whitespace and
/// anything after the digits. Out-of-range values saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = if let Some(rest) = trimmed.strip_prefix('-') {
        (true, rest)
    } else {
        (false, trimmed.strip_prefix('+').unwrap_or(trimmed))
    };

    let digits: Vec<i64> = rest
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(i64::from)
        .collect();

    if digits.is_empty() {
        return None;
    }

    let magnitude = digits
        .into_iter()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d));

    Some(if negative { -magnitude } else { magnitude })
}
