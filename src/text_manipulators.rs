use scraper::{ElementRef, Selector};

/// Parses a CSS selector, turning the parser's borrowed error into an owned one.
pub fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {css:?}: {e:?}"))
}

/// Visible text of a node, normalized with [`normalize_cell_text`].
pub fn extract_text(node: ElementRef) -> String {
    normalize_cell_text(&node.text().collect::<String>())
}

fn is_invisible_format_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}' | '\u{FEFF}'
    )
}

fn is_non_breaking_space(ch: char) -> bool {
    matches!(ch, '\u{a0}' | '\u{2007}' | '\u{202F}')
}

/// Collapses whitespace runs to a single space, turns non-breaking spaces into
/// plain ones and drops control and bidi/zero-width format characters.
///
/// Characters are only ever removed or replaced in place, never reordered, so
/// Hebrew text keeps its logical order.
pub fn normalize_cell_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = true;
    for ch in s.chars() {
        let ch = if is_non_breaking_space(ch) { ' ' } else { ch };
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else if ch.is_control() || is_invisible_format_char(ch) {
            continue;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// Trimmed text, `None` when nothing is left.
pub fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
