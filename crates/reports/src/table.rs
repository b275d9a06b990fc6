use crate::{row_cells, COLUMNS};
use anyhow::{ensure, Result};
use attendance_core::schema::Submission;
use time::Date;
use time::macros::format_description;

pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

const WIDTHS: [usize; 7] = [10, 28, 28, 10, 16, 10, 40];
const PAGE_BREAK: char = '\u{c}';

/// Fixed-width table, header repeated on every page, `Page n of m` footers.
/// Pages are separated by form feeds.
pub fn render_table_document(
    submissions: &[Submission],
    rows_per_page: usize,
    generated: Date,
) -> Result<String> {
    let pages = table_pages(submissions, rows_per_page, generated)?;
    let mut out = String::new();
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            out.push(PAGE_BREAK);
        }
        for line in page {
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(out)
}

/// The lines of each page: title, generated date, header, rule, rows, footer.
/// An empty log still yields one page.
pub(crate) fn table_pages(
    submissions: &[Submission],
    rows_per_page: usize,
    generated: Date,
) -> Result<Vec<Vec<String>>> {
    ensure!(rows_per_page > 0, "rows per page must be positive");
    let generated = generated.format(format_description!("[year]-[month]-[day]"))?;

    let chunks: Vec<&[Submission]> = if submissions.is_empty() {
        vec![submissions]
    } else {
        submissions.chunks(rows_per_page).collect()
    };
    let total = chunks.len();

    let header = format_row(&COLUMNS.map(str::to_string));
    let rule = WIDTHS
        .iter()
        .map(|width| "-".repeat(*width))
        .collect::<Vec<_>>()
        .join("-+-");

    let pages = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut lines = vec![
                "Submission Records".to_string(),
                format!("Generated: {generated}"),
                String::new(),
                header.clone(),
                rule.clone(),
            ];
            if chunk.is_empty() {
                lines.push("No submissions.".to_string());
            }
            lines.extend(chunk.iter().map(|submission| format_row(&row_cells(submission))));
            lines.push(String::new());
            lines.push(format!("Page {} of {}", index + 1, total));
            lines
        })
        .collect();
    Ok(pages)
}

/// Widest line a page can hold, in characters.
pub(crate) fn line_width() -> usize {
    WIDTHS.iter().sum::<usize>() + 3 * (WIDTHS.len() - 1)
}

fn format_row(cells: &[String; 7]) -> String {
    cells
        .iter()
        .zip(WIDTHS)
        .map(|(cell, width)| format!("{:<width$}", fit(cell, width)))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn fit(value: &str, width: usize) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= width {
        return flat;
    }
    let kept: String = flat.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::submission;
    use time::macros::date;

    #[test]
    fn paginates_with_repeated_header() {
        let rows: Vec<Submission> = (0..5)
            .map(|i| submission(&format!("pid{i}"), "ok", None))
            .collect();
        let doc = render_table_document(&rows, 2, date!(2025 - 03 - 01)).unwrap();

        assert_eq!(doc.matches("Submission Records").count(), 3);
        assert!(doc.contains("Page 1 of 3"));
        assert!(doc.contains("Page 3 of 3"));
        assert_eq!(doc.matches(PAGE_BREAK).count(), 2);
        assert!(doc.contains("Generated: 2025-03-01"));
    }

    #[test]
    fn empty_log_still_renders_one_page() {
        let doc = render_table_document(&[], 10, date!(2025 - 03 - 01)).unwrap();
        assert!(doc.contains("No submissions."));
        assert!(doc.contains("Page 1 of 1"));
    }

    #[test]
    fn long_cells_are_truncated() {
        assert_eq!(fit("abcdefghij", 6), "abc...");
        assert_eq!(fit("line\nbreak", 20), "line break");
        assert_eq!(fit("short", 10), "short");
    }

    #[test]
    fn pages_end_with_their_footer() {
        let rows: Vec<Submission> = (0..3)
            .map(|i| submission(&format!("pid{i}"), "ok", None))
            .collect();
        let pages = table_pages(&rows, 2, date!(2025 - 03 - 01)).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].last().map(String::as_str), Some("Page 2 of 2"));
        assert!(pages.iter().flatten().all(|line| line.chars().count() <= line_width()));
    }

    #[test]
    fn zero_rows_per_page_is_rejected() {
        assert!(render_table_document(&[], 0, date!(2025 - 03 - 01)).is_err());
    }
}
