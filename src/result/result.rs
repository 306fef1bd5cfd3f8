use crate::core::Value;
use std::fmt::Write as _;

/// Tabular rendering of a projected view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ViewResult {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as an aligned plain-text table with a row count footer.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "Empty result set\n".to_string();
        }

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(value.to_string().chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{:width$}", col, width = widths[i]))
            .collect();
        let _ = writeln!(out, "{}", header.join(" | ").trim_end());

        let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", separator.join("-+-"));

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .take(widths.len())
                .map(|(i, val)| format!("{:width$}", val.to_string(), width = widths[i]))
                .collect();
            let _ = writeln!(out, "{}", cells.join(" | ").trim_end());
        }

        let _ = writeln!(out, "\n{} row(s)", self.rows.len());
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let result = ViewResult::new(
            vec!["id".into(), "title".into()],
            vec![
                vec![Value::Integer(1), Value::from("Write docs")],
                vec![Value::Integer(22), Value::Null],
            ],
        );
        let text = result.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id | title");
        assert_eq!(lines[1], "---+-----------");
        assert_eq!(lines[2], "1  | Write docs");
        assert_eq!(lines[3], "22 |");
        assert!(text.ends_with("2 row(s)\n"));
    }

    #[test]
    fn test_empty_columns() {
        assert_eq!(ViewResult::empty().render(), "Empty result set\n");
        assert!(ViewResult::empty().is_empty());
    }
}
