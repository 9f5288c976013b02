use std::collections::BTreeMap;

use regex::Regex;
use scraper::Html;

use crate::text_manipulators::{extract_text, selector};

/// Hidden ASP.NET fields that must be posted back with every request.
pub const HIDDEN_FIELDS: [&str; 5] = [
    "__VIEWSTATE",
    "__EVENTVALIDATION",
    "__PageDataKey",
    "tvMain_ExpandState",
    "tvMain_SelectedNode",
];

const NEXT_PAGE_MARKERS: [&str; 5] = ["...", "›", "»", "Next", "הבא"];

/// Round-tripped WebForms state scraped from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: BTreeMap<String, String>,
}

impl FormState {
    /// Hidden fields plus the selected option of every named `<select>`.
    pub fn from_html(html: &str) -> anyhow::Result<Self> {
        let document = Html::parse_document(html);
        let input_selector = selector("input[name]")?;
        let select_selector = selector("select[name]")?;
        let selected_selector = selector("option[selected]")?;

        let mut fields = BTreeMap::new();
        for input in document.select(&input_selector) {
            let Some(name) = input.value().attr("name") else {
                continue;
            };
            if HIDDEN_FIELDS.contains(&name) {
                let value = input.value().attr("value").unwrap_or("");
                fields.insert(name.to_string(), value.to_string());
            }
        }
        for select in document.select(&select_selector) {
            let Some(name) = select.value().attr("name") else {
                continue;
            };
            if let Some(option) = select.select(&selected_selector).next() {
                let value = option.value().attr("value").unwrap_or("");
                fields.insert(name.to_string(), value.to_string());
            }
        }
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Newer values replace older ones; fields missing from `other` are kept.
    pub fn merge(&mut self, other: FormState) {
        self.fields.extend(other.fields);
    }

    /// Form body for a `__doPostBack(target, argument)` round trip.
    pub fn postback(
        &self,
        event_target: &str,
        event_argument: &str,
        extra: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut form = BTreeMap::from([
            ("__EVENTTARGET".to_string(), event_target.to_string()),
            ("__EVENTARGUMENT".to_string(), event_argument.to_string()),
            ("__LASTFOCUS".to_string(), String::new()),
        ]);
        form.extend(self.fields.clone());
        form.extend(extra.clone());
        form
    }
}

pub struct PagerDetector {
    // Captures the argument of a `Page$<N>` postback link.
    page_argument_regex: Regex,
}

impl PagerDetector {
    pub fn new() -> anyhow::Result<Self> {
        let page_argument_regex = Regex::new(r"Page\$(\w+)")?;
        Ok(Self {
            page_argument_regex,
        })
    }

    /// Whether the grid pager offers a page after `current_page`.
    pub fn has_next_page(&self, html: &str, current_page: usize) -> anyhow::Result<bool> {
        let document = Html::parse_document(html);
        let link_selector = selector("a[href]")?;
        let next = (current_page + 1).to_string();

        let pager_links: Vec<_> = document
            .select(&link_selector)
            .filter(|link| {
                link.value()
                    .attr("href")
                    .is_some_and(|href| href.contains("__doPostBack") && href.contains("Page$"))
            })
            .collect();

        for link in &pager_links {
            let href = link.value().attr("href").unwrap_or("");
            let target = self
                .page_argument_regex
                .captures(href)
                .map(|caps| caps[1].to_string());
            if target.as_deref() == Some(next.as_str()) || target.as_deref() == Some("Next") {
                return Ok(true);
            }
        }
        Ok(pager_links
            .iter()
            .any(|link| NEXT_PAGE_MARKERS.contains(&extract_text(*link).as_str())))
    }
}
