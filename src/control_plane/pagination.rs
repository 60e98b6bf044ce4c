/// A listing is finished once the control plane stops handing back a marker.
pub fn is_final_marker(marker: Option<&str>) -> bool {
    marker.map_or(true, str::is_empty)
}

/// Raised when a listing keeps returning continuation markers past the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimitExceeded {
    pub pages: usize,
}

/// Walks a paginated listing one page at a time.
///
/// The cursor owns only the continuation state, so the same loop shape works
/// for any listing call:
///
/// ```ignore
/// let mut cursor = PageCursor::new(settings.max_pages);
/// while cursor.has_more() {
///     let page = client.list_groups(cursor.marker()).await?;
///     // ... consume page.items ...
///     cursor.advance(page.marker)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PageCursor {
    marker: Option<String>,
    pages: usize,
    max_pages: usize,
    exhausted: bool,
}

impl PageCursor {
    pub fn new(max_pages: usize) -> Self {
        Self {
            marker: None,
            pages: 0,
            max_pages: max_pages.max(1),
            exhausted: false,
        }
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    /// Marker to send with the next request; `None` for the first page.
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Record the marker returned with the page just fetched.
    pub fn advance(&mut self, next: Option<String>) -> Result<(), PageLimitExceeded> {
        self.pages += 1;
        if is_final_marker(next.as_deref()) {
            self.exhausted = true;
            self.marker = None;
            return Ok(());
        }
        if self.pages >= self.max_pages {
            self.exhausted = true;
            return Err(PageLimitExceeded { pages: self.pages });
        }
        self.marker = next;
        Ok(())
    }

    /// Start the listing over from the first page.
    pub fn restart(&mut self) {
        self.marker = None;
        self.pages = 0;
        self.exhausted = false;
    }
}
