//! Print-styled HTML for a [`PrintableDocument`], fed to wkhtmltopdf.

use html_escape::encode_text;

use crate::backend::domain::models::document::{Block, PrintableDocument, TableBlock};

const STYLE: &str = r#"
  @page { size: A4; margin: 16mm 14mm; }
  body { font-family: "Liberation Sans", Arial, sans-serif; color: #111827; font-size: 11px; }
  h1 { font-size: 22px; margin: 0 0 2px 0; }
  h2 { font-size: 14px; margin: 16px 0 6px 0; color: #1f2937; }
  .muted { color: #6b7280; }
  .small { font-size: 10px; }
  .chips { margin-top: 6px; }
  .chip { display: inline-block; border: 1px solid #d1d5db; border-radius: 999px; padding: 2px 8px; margin: 0 8px 4px 0; }
  .badge { display: inline-block; color: #fff; font-weight: bold; border-radius: 6px; padding: 4px 10px; margin-top: 8px; }
  table { width: 100%; border-collapse: collapse; margin-top: 4px; }
  th, td { border: 1px solid #e5e7eb; padding: 4px 6px; text-align: left; vertical-align: top; }
  th { background: #f3f4f6; }
  tr:nth-child(even) td { background: #fafafa; }
  table.kv th { width: 30%; }
  .empty { text-align: center; color: #6b7280; font-style: italic; }
  .footer { margin-top: 24px; border-top: 1px solid #e5e7eb; padding-top: 6px; }
"#;

fn render_table(out: &mut String, table: &TableBlock) {
    out.push_str("<table><thead><tr>");
    for column in &table.columns {
        out.push_str(&format!("<th>{}</th>", encode_text(column)));
    }
    out.push_str("</tr></thead><tbody>");

    if table.rows.is_empty() {
        out.push_str(&format!(
            "<tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>",
            table.columns.len().max(1),
            encode_text(&table.empty_message)
        ));
    }
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", encode_text(cell)));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

pub fn render_html(document: &PrintableDocument) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    out.push_str(&format!("<title>{}</title>", encode_text(&document.title)));
    out.push_str("<style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body>");

    out.push_str(&format!("<h1>{}</h1>", encode_text(&document.title)));
    if let Some(subtitle) = &document.subtitle {
        out.push_str(&format!("<div class=\"muted\">{}</div>", encode_text(subtitle)));
    }

    for block in &document.blocks {
        match block {
            Block::Heading(text) => out.push_str(&format!("<h2>{}</h2>", encode_text(text))),
            Block::Paragraph(text) => out.push_str(&format!("<p>{}</p>", encode_text(text))),
            Block::Chips(chips) => {
                out.push_str("<div class=\"chips\">");
                for chip in chips {
                    out.push_str(&format!("<span class=\"chip\">{}</span>", encode_text(chip)));
                }
                out.push_str("</div>");
            }
            Block::Badge { label, color } => out.push_str(&format!(
                "<div class=\"badge\" style=\"background:{}\">{}</div>",
                encode_text(color),
                encode_text(label)
            )),
            Block::KeyValues(pairs) => {
                out.push_str("<table class=\"kv\">");
                for (key, value) in pairs {
                    out.push_str(&format!(
                        "<tr><th>{}</th><td>{}</td></tr>",
                        encode_text(key),
                        encode_text(value)
                    ));
                }
                out.push_str("</table>");
            }
            Block::Table(table) => render_table(&mut out, table),
            Block::Note(text) => out.push_str(&format!(
                "<div class=\"small muted\">{}</div>",
                encode_text(text)
            )),
        }
    }

    if !document.footer.is_empty() {
        out.push_str(&format!(
            "<div class=\"footer small muted\">{}</div>",
            encode_text(&document.footer)
        ));
    }
    out.push_str("</body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_renders_marker_row() {
        let mut document = PrintableDocument::new("Sponsors Report").subtitle("Generated: 2024-06-10");
        document.push(Block::Table(TableBlock {
            columns: vec!["ID".to_string(), "Name".to_string()],
            rows: Vec::new(),
            empty_message: "No records".to_string(),
        }));

        let html = render_html(&document);
        assert!(html.contains("colspan=\"2\">No records</td>"));
        assert!(html.contains("<h1>Sponsors Report</h1>"));
        assert!(html.contains("Generated: 2024-06-10"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut document = PrintableDocument::new("Tom & <Jerry>");
        document.push(Block::KeyValues(vec![("Notes".to_string(), "<script>".to_string())]));

        let html = render_html(&document);
        assert!(html.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_chips_render_as_inline_blocks() {
        let mut document = PrintableDocument::new("Luna");
        document.push(Block::Chips(vec!["Dog".to_string(), "Female".to_string()]));

        let html = render_html(&document);
        assert!(html.contains("<span class=\"chip\">Dog</span><span class=\"chip\">Female</span>"));
        assert!(html.contains(".chip { display: inline-block;"));
        assert!(!html.contains("display: flex"));
    }
}
