//! Page based pagination for list endpoints.

use url::Url;

/// How many items to request per page and which page to request.
///
/// Both values are always at least `1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pagination {
    items_per_page: u32,
    page: u32,
}

impl Pagination {
    pub fn new(items_per_page: u32, page: u32) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            page: page.max(1),
        }
    }

    /// 16 items per page, starting from page 1.
    pub fn standard() -> Self {
        Self::new(16, 1)
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns a copy advanced by `pages`, saturating at `u32::MAX`.
    #[must_use]
    pub fn advancing(self, pages: u32) -> Self {
        Self::new(self.items_per_page, self.page.saturating_add(pages))
    }

    pub fn advance(&mut self, pages: u32) {
        self.page = self.page.saturating_add(pages);
    }

    pub fn next_page(&mut self) {
        self.advance(1);
    }

    /// Moves to the previous page, never going below page 1.
    pub fn previous_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::standard()
    }
}

/// Returns `url` with the `page` and `per` query parameters of `pagination` appended.
///
/// Existing query parameters are preserved.
pub fn paginate(url: &Url, pagination: Pagination) -> Url {
    let mut url = url.clone();
    url.query_pairs_mut()
        .append_pair("page", &pagination.page.to_string())
        .append_pair("per", &pagination.items_per_page.to_string());
    url
}
