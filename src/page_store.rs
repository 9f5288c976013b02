use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use tokio::fs;

use crate::page::Page;

pub fn page_file_name(index: usize) -> String {
    format!("page_{index:03}.html")
}

/// Page index encoded in a `page_NNN.html` file name.
pub fn parse_page_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("page_")?
        .strip_suffix(".html")?
        .parse()
        .ok()
}

/// Writes every page into `dir`, creating it when missing.
pub async fn save_pages(dir: &Path, pages: &[Page]) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for page in pages {
        let path = dir.join(page_file_name(page.index));
        fs::write(&path, &page.html)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!("Saved {}", path.display());
    }
    info!("Saved {} page(s) to {}", pages.len(), dir.display());
    Ok(())
}

/// Loads `page_*.html` from `dir` in index order. Other files are ignored.
pub async fn load_pages(dir: &Path) -> anyhow::Result<Vec<Page>> {
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read {}", dir.display()))?;

    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(index) = file_name.to_str().and_then(parse_page_index) else {
            continue;
        };
        let path = entry.path();
        let html = fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        pages.push(Page::from_body(index, html));
    }
    pages.sort_by_key(|page| page.index);

    info!("Loaded {} page(s) from {}", pages.len(), dir.display());
    Ok(pages)
}
