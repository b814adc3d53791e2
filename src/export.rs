//! CSV and JSON output for tables

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::types::Table;

impl Table {
    /// Rows as JSON objects keyed by column label (`group/name` or `name`)
    pub fn records(&self) -> Vec<Map<String, Value>> {
        let keys: Vec<String> = self.columns().iter().map(ToString::to_string).collect();
        self.rows()
            .iter()
            .map(|row| {
                keys.iter()
                    .zip(row)
                    .map(|(key, cell)| {
                        let value = cell.clone().map(Value::String).unwrap_or(Value::Null);
                        (key.clone(), value)
                    })
                    .collect()
            })
            .collect()
    }

    /// Write CSV; grouped tables get a group header line above the names
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        if self.columns().iter().any(|c| !c.is_flat()) {
            csv.write_record(self.columns().iter().map(|c| c.group.as_str()))?;
        }
        csv.write_record(self.columns().iter().map(|c| c.name.as_str()))?;
        for row in self.rows() {
            csv.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        self.write_csv(file)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))
    }

    /// Write the rows as a JSON array of records, trailing newline
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let mut json = serde_json::to_string_pretty(&self.records())?;
        json.push('\n');
        fs::write(path, json)
            .with_context(|| format!("Failed to write JSON file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnLabel;

    fn sample() -> Table {
        Table::from_rows(
            vec![
                ColumnLabel::flat("player"),
                ColumnLabel::new("Performance", "Gls"),
                ColumnLabel::flat("player_id"),
            ],
            vec![
                vec![Some("Mbappé".to_string()), Some("27".to_string()), Some("42fd9c7f".to_string())],
                vec![Some("Squad Total".to_string()), Some("68".to_string()), None],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        sample().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            ",Performance,\nplayer,Gls,player_id\nMbappé,27,42fd9c7f\nSquad Total,68,\n"
        );
    }

    #[test]
    fn test_flat_csv_has_one_header_line() {
        let table = Table::from_rows(
            vec![ColumnLabel::flat("player")],
            vec![vec![Some("Neymar".to_string())]],
        )
        .unwrap();
        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "player\nNeymar\n");
    }

    #[test]
    fn test_records() {
        let records = sample().records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Performance/Gls"], Value::String("27".to_string()));
        assert_eq!(records[1]["player_id"], Value::Null);
    }

    #[test]
    fn test_write_json_file() {
        let path = std::env::temp_dir().join("fbref_tables_export_test.json");
        sample().write_json_file(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<Map<String, Value>> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, sample().records());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unwritable_directory_has_context() {
        let blocker = std::env::temp_dir().join("fbref_tables_export_blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = sample().write_csv_file(&blocker.join("sub/out.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to create directory"));
        let err = sample().write_json_file(&blocker.join("sub/out.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to create directory"));

        fs::remove_file(&blocker).unwrap();
    }
}
