use crate::{row_cells, COLUMNS};
use anyhow::Result;
use attendance_core::schema::Submission;
use time::Date;
use time::macros::format_description;

/// HTML table wrapped in the Office namespaces so Word opens it as a document.
pub fn render_word_document(submissions: &[Submission], generated: Date) -> Result<String> {
    let generated = generated.format(format_description!("[year]-[month]-[day]"))?;

    let mut html = String::new();
    html.push_str(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:w=\"urn:schemas-microsoft-com:office:word\" \
         xmlns=\"http://www.w3.org/TR/REC-html40\">\n",
    );
    html.push_str("<head><meta charset=\"utf-8\"><title>Submission Records</title>\n");
    html.push_str(
        "<style>table{border-collapse:collapse}td,th{border:1px solid #000;padding:4px}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Submission Records</h1>\n");
    html.push_str(&format!("<p>Generated: {generated}</p>\n"));
    html.push_str("<table>\n<tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{}</th>", escape_html(column)));
    }
    html.push_str("</tr>\n");
    for submission in submissions {
        html.push_str("<tr>");
        for cell in row_cells(submission) {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}
