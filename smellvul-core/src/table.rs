//! Loosely-keyed CSV tables
//!
//! Rows are name -> value maps, so columns produced by upstream tools stay
//! opaque. Output column order is always driven by an explicit header list.
//!
//! Global invariants enforced:
//! - Identical tables serialize to byte-for-byte identical output
//! - Cells absent from a row are written empty

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::path::Path;

/// One CSV row keyed by column name
pub type Row = HashMap<String, String>;

/// A header plus its rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Table { headers, rows }
    }

    /// Parse CSV with a header row
    ///
    /// Short rows leave trailing columns absent, extra trailing fields are
    /// dropped. A repeated header name keeps the value of its last column.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .context("failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("failed to read CSV row {}", index + 1))?;
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();
            rows.push(row);
        }

        Ok(Table { headers, rows })
    }

    /// Read a CSV file
    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open CSV file: {}", path.display()))?;
        Table::from_reader(file).with_context(|| format!("invalid CSV file: {}", path.display()))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Fail unless every named column is present
    pub fn require_columns(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !self.has_column(name))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("missing required column(s): {}", missing.join(", "));
        }
        Ok(())
    }

    /// Serialize to CSV bytes in header order
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers)
            .context("failed to write CSV header")?;
        for row in &self.rows {
            wtr.write_record(
                self.headers
                    .iter()
                    .map(|h| row.get(h).map(String::as_str).unwrap_or("")),
            )
            .context("failed to write CSV row")?;
        }
        wtr.into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush CSV output: {}", e.error()))
    }

    /// Write the table to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        atomic_write(path, &bytes)
            .with_context(|| format!("failed to write CSV file: {}", path.display()))
    }
}

/// Concatenate header lists, keeping only the first occurrence of each name
pub fn merge_headers(groups: &[&[String]]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for name in groups.iter().flat_map(|group| group.iter()) {
        if seen.insert(name.clone()) {
            merged.push(name.clone());
        }
    }
    merged
}

/// Replace `path` with `contents` via a staged sibling file and a rename
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let staged = path.with_extension("csv.partial");
    let mut file = std::fs::File::create(&staged)
        .with_context(|| format!("failed to stage output: {}", staged.display()))?;
    file.write_all(contents)
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to stage output: {}", staged.display()))?;
    drop(file);

    std::fs::rename(&staged, path)
        .with_context(|| format!("failed to move output into place: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_reader_maps_by_header() {
        let csv = "Name,LOC\nA,10\nB,20\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, names(&["Name", "LOC"]));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1]["Name"], "B");
        assert_eq!(table.rows[1]["LOC"], "20");
    }

    #[test]
    fn test_short_row_leaves_columns_absent() {
        let csv = "Name,LOC,CC\nA,10\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].get("CC"), None);
        assert_eq!(table.rows[0]["LOC"], "10");
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "Name,Note\n\"a.B\",\"x, y\"\n";
        let table = Table::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0]["Note"], "x, y");
    }

    #[test]
    fn test_write_absent_cells_empty() {
        let mut row = Row::new();
        row.insert("Name".to_string(), "A".to_string());
        let table = Table::new(names(&["Name", "Vulnerability"]), vec![row]);
        let out = String::from_utf8(table.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(out, "Name,Vulnerability\nA,\n");
    }

    #[test]
    fn test_require_columns() {
        let table = Table::new(names(&["Name", "Version"]), vec![]);
        assert!(table.require_columns(&["Name", "Version"]).is_ok());
        let err = table.require_columns(&["Name", "class"]).unwrap_err();
        assert!(err.to_string().contains("class"));
    }

    #[test]
    fn test_merge_headers_first_occurrence_wins() {
        let vul = names(&["Name", "Version", "CVE", "Severity"]);
        let smell = names(&["Name", "LOC", "Version", "Severity", "WMC"]);
        let merged = merge_headers(&[&vul, &smell]);
        assert_eq!(
            merged,
            names(&["Name", "Version", "CVE", "Severity", "LOC", "WMC"])
        );
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let table = Table::new(names(&["Name"]), vec![]);
        table.write(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Name\n");
        assert!(!path.with_extension("csv.partial").exists());
    }
}
