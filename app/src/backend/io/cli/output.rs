use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

use crate::backend::domain::models::ProgressReporter;
use shared::NO_RECORDS;

/// How command results are written to stdout
pub struct Output {
    json: bool,
    quiet: bool,
}

impl Output {
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// `value` as JSON, or the pre-rendered rows as a text table
    pub fn list<T: Serialize + ?Sized>(&self, value: &T, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.json {
            return self.print_json(value);
        }
        print!("{}", format_table(headers, &rows));
        Ok(())
    }

    /// Status line for mutating commands, suppressed in JSON mode
    pub fn done(&self, message: &str) {
        if !self.json {
            println!("✓ {}", message);
        }
    }

    pub fn spinner(&self) -> Spinner {
        Spinner::new(!self.quiet)
    }
}

/// Left-aligned columns separated by two spaces; the marker when empty
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return format!("{}\n", NO_RECORDS);
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let render_line = |cells: &[&str]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&render_line(headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_line(&cells));
        out.push('\n');
    }
    out
}

/// Cell text for an optional value
pub fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Ask a y/N question on stdin unless `assume_yes` is set
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Single-line spinner on stderr
pub struct Spinner {
    enabled: bool,
    message: String,
    frame: usize,
}

impl Spinner {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            message: String::new(),
            frame: 0,
        }
    }

    fn draw(&self) {
        if self.enabled {
            eprint!("\r{} {}", FRAMES[self.frame], self.message);
            let _ = io::stderr().flush();
        }
    }
}

impl ProgressReporter for Spinner {
    fn start(&mut self, message: &str) {
        self.message = message.to_string();
        self.frame = 0;
        self.draw();
    }

    fn tick(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
        self.draw();
    }

    fn finish(&mut self, _success: bool) {
        if self.enabled {
            eprint!("\r{}\r", " ".repeat(self.message.chars().count() + 2));
            let _ = io::stderr().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_prints_marker_only() {
        assert_eq!(format_table(&["ID", "Name"], &[]), "No records\n");
    }

    #[test]
    fn test_columns_are_padded_to_widest_cell() {
        let rows = vec![
            vec!["1".to_string(), "Luna".to_string(), "Dog".to_string()],
            vec!["12".to_string(), "Señor Bigotes".to_string(), "".to_string()],
        ];
        let table = format_table(&["ID", "Name", "Type"], &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "ID  Name           Type");
        assert_eq!(lines[1], "--  -------------  ----");
        assert_eq!(lines[2], "1   Luna           Dog");
        assert_eq!(lines[3], "12  Señor Bigotes");
    }

    #[test]
    fn test_cell_renders_missing_as_blank() {
        assert_eq!(cell(Some(14)), "14");
        assert_eq!(cell::<i64>(None), "");
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(confirm("Delete?", true).expect("confirm"));
    }

    #[test]
    fn test_spinner_cycles_frames() {
        let mut spinner = Spinner::new(false);
        spinner.start("Exporting");
        for _ in 0..5 {
            spinner.tick();
        }
        assert_eq!(spinner.frame, 1);
        spinner.finish(true);
    }
}
