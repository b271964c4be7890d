//! PDF backends.
//!
//! The primary backend pipes print-styled HTML through an external
//! `wkhtmltopdf` binary. The fallback lays the same document out natively
//! with `genpdf`, which only needs a TTF font family on disk.

use anyhow::{anyhow, bail, Context, Result};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::{Color, Style};
use genpdf::{Document, Element as _, SimplePageDecorator};
use log::debug;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::backend::config::PdfConfig;
use crate::backend::domain::export_service::PdfPipeline;
use crate::backend::domain::models::document::{Block, PrintableDocument, TableBlock};
use crate::backend::domain::models::export::PdfBackend;
use crate::backend::io::render::html::render_html;

/// Converts HTML to PDF with the external `wkhtmltopdf` command
pub struct WkhtmltopdfBackend {
    command: String,
}

impl WkhtmltopdfBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

impl PdfBackend for WkhtmltopdfBackend {
    fn name(&self) -> &str {
        "wkhtmltopdf"
    }

    fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>> {
        let html = render_html(document);

        // HTML on stdin, PDF on stdout
        let mut child = Command::new(&self.command)
            .args(["--quiet", "--encoding", "utf-8", "--page-size", "A4", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start '{}'", self.command))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("wkhtmltopdf stdin unavailable"))?;
            stdin.write_all(html.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            bail!(
                "wkhtmltopdf exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if !output.stdout.starts_with(b"%PDF") {
            bail!("wkhtmltopdf produced no PDF output");
        }

        debug!("wkhtmltopdf produced {} bytes", output.stdout.len());
        Ok(output.stdout)
    }
}

/// Lays the document out natively with genpdf
pub struct GenpdfBackend {
    fonts_dir: PathBuf,
    font_family: String,
}

impl GenpdfBackend {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
        }
    }

    fn push_table(doc: &mut Document, table: &TableBlock) -> Result<()> {
        let columns = table.columns.len().max(1);
        let mut layout = TableLayout::new(vec![1; columns]);
        layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

        let mut header = layout.row();
        for column in &table.columns {
            header = header.element(Paragraph::new(column.as_str()).styled(Style::new().bold()).padded(1));
        }
        header.push().map_err(|e| anyhow!("Table header: {}", e))?;

        if table.rows.is_empty() {
            let mut row = layout.row();
            for i in 0..columns {
                let text = if i == 0 { table.empty_message.as_str() } else { "" };
                row = row.element(Paragraph::new(text).styled(Style::new().italic()).padded(1));
            }
            row.push().map_err(|e| anyhow!("Table row: {}", e))?;
        }

        for cells in &table.rows {
            let mut row = layout.row();
            for i in 0..columns {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                row = row.element(Paragraph::new(text).padded(1));
            }
            row.push().map_err(|e| anyhow!("Table row: {}", e))?;
        }

        doc.push(layout);
        Ok(())
    }
}

/// `#rrggbb` to a genpdf colour, grey when malformed
fn parse_hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| hex.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Rgb(100, 100, 100),
    }
}

impl PdfBackend for GenpdfBackend {
    fn name(&self) -> &str {
        "genpdf"
    }

    fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>> {
        let fonts = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None).map_err(|e| {
            anyhow!(
                "Failed to load font family '{}' from {}: {}",
                self.font_family,
                self.fonts_dir.display(),
                e
            )
        })?;

        let mut doc = Document::new(fonts);
        doc.set_title(document.title.clone());
        doc.set_font_size(10);
        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(12);
        doc.set_page_decorator(decorator);

        doc.push(Paragraph::new(document.title.as_str()).styled(Style::new().bold().with_font_size(18)));
        if let Some(subtitle) = &document.subtitle {
            doc.push(Paragraph::new(subtitle.as_str()).styled(Style::new().with_color(Color::Rgb(107, 114, 128))));
        }
        doc.push(Break::new(1));

        for block in &document.blocks {
            match block {
                Block::Heading(text) => {
                    doc.push(Break::new(1));
                    doc.push(Paragraph::new(text.as_str()).styled(Style::new().bold().with_font_size(13)));
                }
                Block::Paragraph(text) => doc.push(Paragraph::new(text.as_str())),
                Block::Chips(chips) => doc.push(Paragraph::new(chips.join("   |   "))),
                Block::Badge { label, color } => doc.push(
                    Paragraph::new(label.as_str())
                        .styled(Style::new().bold().with_font_size(12).with_color(parse_hex_color(color))),
                ),
                Block::KeyValues(pairs) => {
                    let mut layout = TableLayout::new(vec![1, 2]);
                    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));
                    for (key, value) in pairs {
                        layout
                            .row()
                            .element(Paragraph::new(key.as_str()).styled(Style::new().bold()).padded(1))
                            .element(Paragraph::new(value.as_str()).padded(1))
                            .push()
                            .map_err(|e| anyhow!("Key/value row: {}", e))?;
                    }
                    doc.push(layout);
                }
                Block::Table(table) => Self::push_table(&mut doc, table)?,
                Block::Note(text) => doc.push(
                    Paragraph::new(text.as_str())
                        .styled(Style::new().italic().with_font_size(8).with_color(Color::Rgb(107, 114, 128))),
                ),
            }
        }

        if !document.footer.is_empty() {
            doc.push(Break::new(2));
            doc.push(
                Paragraph::new(document.footer.as_str())
                    .styled(Style::new().with_font_size(8).with_color(Color::Rgb(107, 114, 128))),
            );
        }

        let mut out = Vec::new();
        doc.render(&mut out).map_err(|e| anyhow!("genpdf render failed: {}", e))?;
        debug!("genpdf produced {} bytes", out.len());
        Ok(out)
    }
}

/// wkhtmltopdf first, genpdf as the fallback
pub fn pdf_pipeline(config: &PdfConfig) -> PdfPipeline {
    PdfPipeline::new(vec![
        Arc::new(WkhtmltopdfBackend::new(config.wkhtmltopdf_path.clone())) as Arc<dyn PdfBackend>,
        Arc::new(GenpdfBackend::new(config.fonts_dir.clone(), config.font_family.clone())),
    ])
}
