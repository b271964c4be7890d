//! Backend-neutral description of a printable page.
//!
//! Reports and profile sheets are assembled into a [`PrintableDocument`] once;
//! every PDF backend renders the same document, so a fallback never changes
//! what gets printed.

/// Placeholder shown for blank values on printed sheets
pub const BLANK: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct PrintableDocument {
    pub title: String,
    /// Smaller line under the title, e.g. `Generated: 2024-05-01`
    pub subtitle: Option<String>,
    pub blocks: Vec<Block>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
    /// Small rounded labels, e.g. `Sex: F`
    Chips(Vec<String>),
    /// Coloured status label; `color` is a `#rrggbb` hex string
    Badge { label: String, color: String },
    /// Two-column label/value table
    KeyValues(Vec<(String, String)>),
    Table(TableBlock),
    /// Small muted footnote
    Note(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rendered in place of the rows when there are none
    pub empty_message: String,
}

impl PrintableDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            blocks: Vec::new(),
            footer: String::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// All tables in the document, in order
    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// `value`, or the blank placeholder when missing or empty
pub fn or_blank(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => BLANK.to_string(),
    }
}
