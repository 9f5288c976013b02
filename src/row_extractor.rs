use log::{debug, info, warn};
use scraper::{ElementRef, Html};

use crate::{page::Page, text_manipulators::extract_text};

/// Id ASP.NET gives the schedule GridView on the portal.
pub const GRID_ID: &str = "ContentPlaceHolder1_gvData";

const PAGER_SYMBOLS: [&str; 9] = ["...", "›", "»", "‹", "«", "<", ">", "|", "הבא"];

/// The columns of the schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Day,
    StartTime,
    EndTime,
    CourseName,
    Teacher,
    Room,
    Note,
}

impl Column {
    /// Order of the columns on the portal, used when a grid has no header row.
    pub const ALL: [Column; 8] = [
        Column::Date,
        Column::Day,
        Column::StartTime,
        Column::EndTime,
        Column::CourseName,
        Column::Teacher,
        Column::Room,
        Column::Note,
    ];

    /// Header text the portal uses for this column.
    pub fn label(self) -> &'static str {
        self.aliases()[0]
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Date => &["תאריך"],
            Column::Day => &["יום"],
            Column::StartTime => &["שעת התחלה", "משעה"],
            Column::EndTime => &["שעת סיום", "עד שעה"],
            Column::CourseName => &["שם", "שם הקורס", "קורס"],
            Column::Teacher => &["מרצים", "מרצה"],
            Column::Room => &["חדר", "כיתה"],
            Column::Note => &["הערה", "הערות"],
        }
    }

    pub fn from_label(label: &str) -> Option<Column> {
        let label = label.trim();
        Column::ALL
            .into_iter()
            .find(|column| column.aliases().contains(&label))
    }
}

/// One grid row: column label to cell text, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.cells.push((label.into(), value.into()));
    }

    /// Value of the first cell whose label is exactly `label`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first cell whose label is any alias of `column`.
    pub fn column(&self, column: Column) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| Column::from_label(l) == Some(column))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (label, value) in iter {
            row.push(label, value);
        }
        row
    }
}

fn tables(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "table")
        .collect()
}

/// Rows that belong to `table` itself, never rows of tables nested inside it.
fn direct_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = vec![];
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn direct_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

fn known_label_count(labels: &[String]) -> usize {
    labels
        .iter()
        .filter(|label| Column::from_label(label).is_some())
        .count()
}

fn is_header_row(row: ElementRef<'_>) -> bool {
    let cells = direct_cells(row);
    if cells.iter().any(|cell| cell.value().name() == "th") {
        return true;
    }
    let labels: Vec<String> = cells.into_iter().map(extract_text).collect();
    known_label_count(&labels) >= 3
}

fn header_score(table: ElementRef<'_>) -> usize {
    direct_rows(table)
        .into_iter()
        .next()
        .map(|row| {
            let labels: Vec<String> = direct_cells(row).into_iter().map(extract_text).collect();
            known_label_count(&labels)
        })
        .unwrap_or(0)
}

/// Finds the schedule grid among whatever else the portal page contains.
pub fn find_grid(document: &Html) -> Option<ElementRef<'_>> {
    let tables = tables(document);
    tables
        .iter()
        .find(|t| t.value().id() == Some(GRID_ID))
        .or_else(|| {
            tables
                .iter()
                .find(|t| t.value().id().is_some_and(|id| id.contains("gvData")))
        })
        .or_else(|| {
            tables
                .iter()
                .find(|t| t.value().classes().any(|c| c.contains("GridView")))
        })
        .or_else(|| tables.iter().find(|t| header_score(**t) >= 3))
        .copied()
}

fn is_pager_token(cell: &str) -> bool {
    PAGER_SYMBOLS.contains(&cell) || cell.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Most non-empty cells are page numbers or pager arrows.
fn looks_like_pagination(cells: &[String]) -> bool {
    let non_empty: Vec<&String> = cells.iter().filter(|c| !c.is_empty()).collect();
    if non_empty.is_empty() {
        return false;
    }
    let pager_cells = non_empty.iter().filter(|c| is_pager_token(c)).count();
    pager_cells * 2 > non_empty.len()
}

fn is_pager_row(row: ElementRef<'_>, cells: &[String]) -> bool {
    row.value().classes().any(|c| c.contains("Pager"))
        || row
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|el| el.value().name() == "table")
        || looks_like_pagination(cells)
}

/// Extracts the rows of the schedule grid in document order.
///
/// A page without a recognizable grid yields no rows.
pub fn extract_rows(html: &str) -> Vec<RawRow> {
    let document = Html::parse_document(html);
    let Some(grid) = find_grid(&document) else {
        warn!("No schedule grid found on page");
        return vec![];
    };

    let rows = direct_rows(grid);
    let header_pos = rows.iter().position(|row| is_header_row(*row));
    let (labels, data_rows): (Vec<String>, &[ElementRef]) = match header_pos {
        Some(pos) => (
            direct_cells(rows[pos]).into_iter().map(extract_text).collect(),
            &rows[pos + 1..],
        ),
        None => {
            debug!("Grid has no header row, using positional columns");
            (
                Column::ALL.iter().map(|c| c.label().to_string()).collect(),
                &rows[..],
            )
        }
    };

    let mut raw_rows = vec![];
    for row in data_rows {
        let cells: Vec<String> = direct_cells(*row).into_iter().map(extract_text).collect();
        if cells.iter().all(|c| c.is_empty()) || is_pager_row(*row, &cells) {
            continue;
        }
        // zip drops trailing cells that have no header label
        raw_rows.push(labels.iter().cloned().zip(cells).collect());
    }
    raw_rows
}

/// Extracts and concatenates the rows of every complete page, in page order.
pub fn extract_pages(pages: &[Page]) -> Vec<RawRow> {
    let mut ordered: Vec<&Page> = pages.iter().collect();
    ordered.sort_by_key(|page| page.index);

    let mut rows = vec![];
    for page in ordered {
        if !page.complete {
            warn!("Skipping page {}: marked incomplete by fetcher", page.index);
            continue;
        }
        let page_rows = extract_rows(&page.html);
        if page_rows.is_empty() {
            info!("Page {} produced no rows", page.index);
        } else {
            debug!("Page {}: {} rows", page.index, page_rows.len());
        }
        rows.extend(page_rows);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<tr class=\"GridHeader\"><th>תאריך</th><th>יום</th><th>שעת התחלה</th>\
        <th>שעת סיום</th><th>שם</th><th>מרצים</th><th>חדר</th><th>הערה</th></tr>";

    fn page(grid_attrs: &str, body: &str) -> String {
        format!(
            "<html><body>\
             <form><input type=\"hidden\" name=\"__VIEWSTATE\" value=\"abc\"/>\
             <table class=\"menu\"><tr><td>ראשי</td><td>יציאה</td></tr></table>\
             <table {grid_attrs}>{HEADER}{body}</table>\
             </form></body></html>"
        )
    }

    const ROW: &str = "<tr class=\"GridRow\"><td>20/10/2025</td><td>ב'</td><td>08:30</td>\
        <td>10:00</td><td>Math (ENG)</td><td>ד\"ר כהן</td><td>101</td><td>&nbsp;</td></tr>";

    #[test]
    fn finds_grid_by_id_and_maps_labels() {
        let html = page("id=\"ContentPlaceHolder1_gvData\"", ROW);
        let rows = extract_rows(&html);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.iter().count(), 8);
        assert_eq!(row.get("תאריך"), Some("20/10/2025"));
        assert_eq!(row.column(Column::Day), Some("ב'"));
        assert_eq!(row.column(Column::CourseName), Some("Math (ENG)"));
        assert_eq!(row.column(Column::Teacher), Some("ד\"ר כהן"));
        assert_eq!(row.column(Column::Note), Some(""));
    }

    #[test]
    fn labels_keep_column_order() {
        let html = page("id=\"ContentPlaceHolder1_gvData\"", ROW);
        let rows = extract_rows(&html);
        let labels: Vec<&str> = rows[0].iter().map(|(l, _)| l).collect();
        let expected: Vec<&str> = Column::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn finds_grid_by_class_and_by_header_labels() {
        let by_class = page("class=\"GridView mygrid\"", ROW);
        assert_eq!(extract_rows(&by_class).len(), 1);

        let by_header = page("class=\"plain\"", ROW);
        assert_eq!(extract_rows(&by_header).len(), 1);
    }

    #[test]
    fn page_without_grid_is_empty() {
        let html = "<html><body><table><tr><td>שלום</td></tr></table></body></html>";
        assert!(extract_rows(html).is_empty());
        assert!(extract_rows("").is_empty());
    }

    #[test]
    fn drops_unlabelled_trailing_cells() {
        let row = "<tr><td>20/10/2025</td><td>ג'</td><td>08:30</td><td>10:00</td>\
                   <td>Physics</td><td>לוי</td><td>5</td><td>זום</td><td>extra</td><td>more</td></tr>";
        let rows = extract_rows(&page("id=\"ContentPlaceHolder1_gvData\"", row));
        assert_eq!(rows[0].iter().count(), 8);
        assert_eq!(rows[0].column(Column::Note), Some("זום"));
    }

    #[test]
    fn short_rows_keep_what_they_have() {
        let row = "<tr><td>20/10/2025</td><td>ג'</td><td>08:30</td></tr>";
        let rows = extract_rows(&page("id=\"ContentPlaceHolder1_gvData\"", row));
        assert_eq!(rows[0].iter().count(), 3);
        assert_eq!(rows[0].column(Column::EndTime), None);
    }

    #[test]
    fn skips_pager_and_empty_rows() {
        let body = format!(
            "{ROW}<tr><td></td><td> </td></tr>\
             <tr class=\"GridPager\"><td colspan=\"8\"><table><tr>\
             <td><span>1</span></td><td><a href=\"javascript:__doPostBack('ctl00$ContentPlaceHolder1$gvData','Page$2')\">2</a></td>\
             </tr></table></td></tr>\
             <tr><td>1</td><td>2</td><td>3</td><td>...</td></tr>"
        );
        let rows = extract_rows(&page("id=\"ContentPlaceHolder1_gvData\"", &body));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn headerless_grid_uses_positional_columns() {
        let html = format!("<table id=\"{GRID_ID}\">{ROW}</table>");
        let rows = extract_rows(&html);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].column(Column::StartTime), Some("08:30"));
        assert_eq!(rows[0].column(Column::Room), Some("101"));
    }

    #[test]
    fn pages_concatenate_in_index_order_without_dedup() {
        let second = page(
            "id=\"ContentPlaceHolder1_gvData\"",
            &ROW.replace("Math (ENG)", "Chemistry"),
        );
        let first = page("id=\"ContentPlaceHolder1_gvData\"", ROW);
        let pages = vec![
            Page::new(2, second),
            Page::new(1, first.clone()),
            Page::new(3, first),
            Page::partial(4, "<table".to_string()),
        ];
        let rows = extract_pages(&pages);
        let names: Vec<_> = rows
            .iter()
            .map(|r| r.column(Column::CourseName).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Math (ENG)", "Chemistry", "Math (ENG)"]);
    }

    #[test]
    fn column_aliases() {
        assert_eq!(Column::from_label(" מרצה "), Some(Column::Teacher));
        assert_eq!(Column::from_label("הערות"), Some(Column::Note));
        assert_eq!(Column::from_label("something"), None);
    }
}
