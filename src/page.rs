/// One fetched (or cached) schedule page, as handed to the extraction core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based position in the portal's pagination.
    pub index: usize,
    pub html: String,
    /// `false` when the fetcher knows the body is truncated or otherwise bad.
    pub complete: bool,
}

impl Page {
    pub fn new(index: usize, html: String) -> Self {
        Self {
            index,
            html,
            complete: true,
        }
    }

    pub fn partial(index: usize, html: String) -> Self {
        Self {
            index,
            html,
            complete: false,
        }
    }
}

impl Page {
    /// A body cut off before the closing `</html>` is kept but marked partial.
    pub fn from_body(index: usize, html: String) -> Self {
        if html.to_lowercase().contains("</html>") {
            Self::new(index, html)
        } else {
            Self::partial(index, html)
        }
    }
}
