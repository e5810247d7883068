//! Comprehensive in-transit cost report writing.
//!
//! The table is the classic four-period cost sheet: five identity columns,
//! then opening / inbound / outbound / closing groups of five measures
//! each, then the month. Rows arrive as JSON arrays straight from the
//! caller and are written positionally.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Flattened header row of the comprehensive cost table.
pub const COLUMNS: [&str; 26] = [
    "sku",
    "product_name",
    "transit_warehouse",
    "category_level1",
    "category_level2",
    "opening_quantity",
    "opening_unit_price",
    "opening_purchase_amount",
    "opening_freight_amount",
    "opening_duty_amount",
    "inbound_quantity",
    "inbound_unit_price",
    "inbound_purchase_amount",
    "inbound_freight_amount",
    "inbound_duty_amount",
    "outbound_quantity",
    "outbound_unit_price",
    "outbound_purchase_amount",
    "outbound_freight_amount",
    "outbound_duty_amount",
    "closing_quantity",
    "closing_unit_price",
    "closing_purchase_amount",
    "closing_freight_amount",
    "closing_duty_amount",
    "month",
];

/// File extension reports are written with.
pub const REPORT_EXTENSION: &str = "csv";

/// A report could not be written.
#[derive(Debug, Error)]
pub enum ReportError {
    /// File names come straight from the request; anything path-like is
    /// rejected before it reaches the filesystem.
    #[error("invalid report file name `{0}`")]
    InvalidFileName(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Final on-disk name for a report, or an error for path-like input.
pub fn report_file_name(file_name: &str) -> Result<String, ReportError> {
    let path_like = file_name.is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\'])
        || file_name.contains("..");
    if path_like {
        return Err(ReportError::InvalidFileName(file_name.to_owned()));
    }
    Ok(format!("{file_name}.{REPORT_EXTENSION}"))
}

/// Write the report into `dir`, replacing any previous file of the same
/// name. Returns the full path of the written file.
pub fn write_report(dir: &Path, file_name: &str, rows: &[Vec<Value>]) -> Result<PathBuf, ReportError> {
    let path = dir.join(report_file_name(file_name)?);
    let mut out = BufWriter::new(fs::File::create(&path)?);

    // BOM so spreadsheet apps detect UTF-8.
    out.write_all(b"\xEF\xBB\xBF")?;
    write_row(&mut out, COLUMNS.iter().map(|c| (*c).to_owned()))?;
    for row in rows {
        write_row(&mut out, row.iter().map(cell_text))?;
    }
    out.flush()?;

    Ok(path)
}

fn write_row<W: Write>(out: &mut W, cells: impl Iterator<Item = String>) -> io::Result<()> {
    let line = cells.map(|c| escape_cell(&c)).collect::<Vec<_>>().join(",");
    writeln!(out, "{line}")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn escape_cell(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_like_file_names_are_rejected() {
        for name in ["", "..", "a/b", "a\\b", ".hidden", "up/../../etc"] {
            assert!(report_file_name(name).is_err(), "accepted {name:?}");
        }
        assert_eq!(report_file_name("june_costs").unwrap(), "june_costs.csv");
    }

    #[test]
    fn written_report_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            vec![json!("SKU-1"), json!("widget, large"), json!(3), json!(1.5)],
            vec![json!("SKU-2"), Value::Null, json!("said \"ok\"")],
        ];

        let path = write_report(dir.path(), "june", &rows).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.trim_start_matches('\u{feff}').lines();

        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), COLUMNS.len());
        assert!(header.starts_with("sku,product_name"));

        assert_eq!(lines.next().unwrap(), "SKU-1,\"widget, large\",3,1.5");
        assert_eq!(lines.next().unwrap(), "SKU-2,,\"said \"\"ok\"\"\"");
        assert!(lines.next().is_none());
    }

    #[test]
    fn rewriting_replaces_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        write_report(dir.path(), "r", &[vec![json!("old")]]).unwrap();
        let path = write_report(dir.path(), "r", &[vec![json!("new")]]).unwrap();

        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("new"));
        assert!(!written.contains("old"));
    }
}
