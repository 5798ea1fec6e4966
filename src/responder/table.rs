//! Fixed-width table renderer for the `top` command.
//!
//! Produces the classic ascii-table look: bordered, centered headings,
//! per-column alignment. The chat layer wraps the output in a monospace
//! fence so columns line up.

/// A small fixed-width table builder.
#[derive(Debug, Default)]
pub struct AsciiTable {
    heading: Vec<String>,
    rows: Vec<Vec<String>>,
    right_aligned: Vec<usize>,
}

impl AsciiTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_heading(&mut self, cells: Vec<String>) {
        self.heading = cells;
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Right-aligns the given 0-based column (numeric columns).
    pub fn set_align_right(&mut self, column: usize) {
        if !self.right_aligned.contains(&column) {
            self.right_aligned.push(column);
        }
    }

    pub fn render(&self) -> String {
        let columns = self
            .heading
            .len()
            .max(self.rows.iter().map(Vec::len).max().unwrap_or(0));
        if columns == 0 {
            return String::new();
        }

        let mut widths = vec![0usize; columns];
        for (i, cell) in self.heading.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        // "| " + cell + " " per column, plus the closing "|".
        let line_width = widths.iter().map(|w| w + 3).sum::<usize>() + 1;

        let mut out = String::new();
        out.push('.');
        out.push_str(&"-".repeat(line_width.saturating_sub(2)));
        out.push_str(".\n");

        out.push_str(&self.render_row(&self.heading, &widths, true));

        out.push('|');
        for w in &widths {
            out.push_str(&"-".repeat(w + 2));
            out.push('|');
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&self.render_row(row, &widths, false));
        }

        out.push('\'');
        out.push_str(&"-".repeat(line_width.saturating_sub(2)));
        out.push('\'');
        out
    }

    fn render_row(&self, cells: &[String], widths: &[usize], heading: bool) -> String {
        let mut line = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padded = if heading {
                center(cell, *width)
            } else if self.right_aligned.contains(&i) {
                format!("{:>width$}", cell, width = width)
            } else {
                format!("{:<width$}", cell, width = width)
            };
            line.push(' ');
            line.push_str(&padded);
            line.push_str(" |");
        }
        line.push('\n');
        line
    }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_bordered_table() {
        let mut table = AsciiTable::new();
        table.set_heading(vec!["".to_string(), "coin".to_string(), "price".to_string()]);
        table.add_row(vec!["1".to_string(), "btc".to_string(), "$100.00".to_string()]);
        table.add_row(vec!["2".to_string(), "eth".to_string(), "$50.00".to_string()]);
        table.set_align_right(2);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with('.') && lines[0].ends_with('.'));
        assert!(lines.last().unwrap().starts_with('\''));
        // Every line is the same width.
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        // Price column is right-aligned.
        assert!(rendered.contains("|  $50.00 |"));
        assert!(rendered.contains("| $100.00 |"));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        assert_eq!(AsciiTable::new().render(), "");
    }
}
