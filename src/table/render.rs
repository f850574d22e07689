/// Table rendering for the terminal and for JSON consumers
use anyhow::Result;

use crate::table::Table;

/// Render a table as aligned plain text, one line per row, header first.
pub fn to_text(table: &Table) -> String {
    let rendered: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(String::len).collect();
    for row in &rendered {
        for (idx, value) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(value.len());
        }
    }

    let header: Vec<&str> = table.columns().iter().map(String::as_str).collect();
    let mut out = format_row(&header, &widths);
    out.push('\n');
    for row in &rendered {
        let fields: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_row(&fields, &widths));
        out.push('\n');
    }
    out
}

/// Render a table as a pretty-printed JSON array of row objects.
pub fn to_json(table: &Table) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

fn format_row(fields: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = fields
        .iter()
        .zip(widths.iter().copied())
        .map(|(field, width)| format!("{:<width$}", field, width = width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn sample() -> Table {
        Table::new(
            vec!["name".into(), "cpu".into(), "memory".into()],
            vec![
                vec![Cell::text("worker-a"), Cell::Int(250), Cell::Float(0.512)],
                vec![Cell::text("b"), Cell::Int(100), Cell::text("2Gi")],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_to_text_alignment() {
        let text = to_text(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name      cpu  memory");
        assert_eq!(lines[1], "worker-a  250  0.512");
        assert_eq!(lines[2], "b         100  2Gi");
    }

    #[test]
    fn test_to_text_header_only() {
        let table = Table::new(vec!["name".into(), "age".into()], vec![]).unwrap();
        assert_eq!(to_text(&table), "name  age\n");
    }

    #[test]
    fn test_to_json_rows() {
        let json = to_json(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["name"], "worker-a");
        assert_eq!(parsed[0]["cpu"], 250);
        assert_eq!(parsed[0]["memory"], 0.512);
        assert_eq!(parsed[1]["memory"], "2Gi");
    }
}
