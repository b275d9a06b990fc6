use crate::table::{line_width, table_pages};
use anyhow::Result;
use attendance_core::schema::Submission;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use time::Date;

// A4 landscape, in points.
const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 36.0;
const LINE_HEIGHT: f32 = 11.0;
// Courier advances 0.6 em per glyph.
const GLYPH_ADVANCE: f32 = 0.6;

/// The paginated submissions table as a PDF, one table page per PDF page.
pub fn render_pdf_document(
    submissions: &[Submission],
    rows_per_page: usize,
    generated: Date,
) -> Result<Vec<u8>> {
    let pages = table_pages(submissions, rows_per_page, generated)?;
    let font_size = (PAGE_WIDTH - 2.0 * MARGIN) / (line_width() as f32 * GLYPH_ADVANCE);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), font_size.into()]),
            Operation::new("TL", vec![LINE_HEIGHT.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(latin1(line))]));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

// The standard Courier font only covers a single-byte encoding.
fn latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::submission;
    use time::macros::date;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn one_pdf_page_per_table_page() {
        let rows: Vec<Submission> = (0..5)
            .map(|i| submission(&format!("pid{i}"), "ok", None))
            .collect();
        let bytes = render_pdf_document(&rows, 2, date!(2025 - 03 - 01)).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
        assert!(contains(&bytes, "(Page 1 of 3)"));
        assert!(contains(&bytes, "(Page 3 of 3)"));
        assert!(contains(&bytes, "(Generated: 2025-03-01)"));
    }

    #[test]
    fn empty_log_is_a_single_page() {
        let bytes = render_pdf_document(&[], 25, date!(2025 - 03 - 01)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(contains(&bytes, "(No submissions.)"));
    }

    #[test]
    fn characters_outside_latin1_are_replaced() {
        assert_eq!(latin1("caf\u{e9} \u{2713}"), b"caf\xe9 ?".to_vec());
    }
}
