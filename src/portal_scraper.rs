use std::collections::BTreeMap;

use anyhow::Context;
use log::{debug, info, warn};

use crate::{
    form_state::FormState,
    login::still_on_login_page,
    page::Page,
    row_extractor::extract_rows,
    scraping_context::ScrapingContext,
};

/// Postback target of the schedule grid's pager links.
pub const GRID_EVENT_TARGET: &str = "ctl00$ContentPlaceHolder1$gvData";
/// Hard stop for a pager that never runs out.
pub const MAX_PAGES: usize = 200;

/// Walks the portal's grid pager and returns every page in order.
///
/// The first page is fetched with a GET, then re-posted with the configured
/// search fields when there are any. Further pages are `Page$N` postbacks
/// carrying the previous page's form state. The walk stops when the pager
/// offers no next page, or when a page repeats the rows of the one before it.
pub async fn scrape_all_pages(context: &ScrapingContext) -> anyhow::Result<Vec<Page>> {
    let portal = &context.portal;
    let client = &context.request_client;

    info!("Fetching schedule page 1 from {}", portal.url);
    let first = client
        .get(&portal.url)
        .await
        .context("failed to fetch schedule page")?;
    if still_on_login_page(&first.final_url) {
        anyhow::bail!("redirected to {}, session expired", first.final_url);
    }
    let mut html = first.body;
    let mut state = FormState::from_html(&html)?;

    if !portal.form_data.is_empty() {
        debug!("Posting {} search field(s)", portal.form_data.len());
        let form = state.postback("", "", &portal.form_data);
        html = client
            .post_form(&portal.url, &form)
            .await
            .context("failed to post search form")?
            .body;
        state.merge(FormState::from_html(&html)?);
    }

    let mut previous_rows = extract_rows(&html);
    let mut pages = vec![Page::from_body(1, html)];
    let mut current = 1;

    loop {
        let Some(last) = pages.last() else { break };
        if !context.pager_detector.has_next_page(&last.html, current)? {
            break;
        }
        if current >= MAX_PAGES {
            warn!("Stopping after {MAX_PAGES} pages, pager still offers more");
            break;
        }

        let next_index = current + 1;
        info!("Fetching schedule page {next_index}");
        let form = state.postback(
            GRID_EVENT_TARGET,
            &format!("Page${next_index}"),
            &BTreeMap::new(),
        );
        let next = client
            .post_form(&portal.url, &form)
            .await
            .with_context(|| format!("failed to fetch schedule page {next_index}"))?
            .body;

        let rows = extract_rows(&next);
        if rows == previous_rows {
            info!("Page {next_index} repeats page {current}, stopping");
            break;
        }
        state.merge(FormState::from_html(&next)?);
        previous_rows = rows;
        pages.push(Page::from_body(next_index, next));
        current = next_index;
    }

    info!("Fetched {} schedule page(s)", pages.len());
    Ok(pages)
}
