// Manifest tables
// Row-oriented CSV tables with a header row. Values are kept as text so every
// input column survives into the sampled output unchanged.

pub mod record;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, SamplerError};

pub use record::{parse_records, ClipRecord, ParsedManifest};

/// An in-memory CSV table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Read a CSV file from disk
    pub fn read_csv(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SamplerError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        log::debug!("Read {} rows x {} columns from {}", table.len(), table.headers.len(), path.display());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect::<Vec<_>>();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Write the table to disk as CSV, creating parent directories as needed
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.to_writer(file)?;
        log::debug!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First column matching any of the given names
    pub fn find_column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|n| self.column_index(n))
    }

    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }

    /// Iterate the values of one column
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r.get(column).map(String::as_str).unwrap_or(""))
    }

    /// Overwrite a column in place, or append it when absent
    pub fn set_column(&mut self, name: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// New table holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let csv = "id, video path ,weight\nclip_a,\"group_0001/a, b.mp4\",1.5\nclip_b,group_0002/b.mp4,\n";
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_headers_and_quoted_fields() {
        let table = sample_table();
        assert_eq!(table.headers, vec!["id", "video path", "weight"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, 1), "group_0001/a, b.mp4");
        assert_eq!(table.value(1, 2), "");
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let csv = "id,weight\na,1\nb\n";
        assert!(matches!(Table::from_reader(csv.as_bytes()), Err(SamplerError::Csv(_))));
    }

    #[test]
    fn test_set_column_overwrites_or_appends() {
        let mut table = sample_table();
        table.set_column("weight", vec!["2".to_string(), "3".to_string()]);
        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.value(1, 2), "3");

        table.set_column("move_bin", vec!["S".to_string(), "XL".to_string()]);
        assert_eq!(table.headers.last().unwrap(), "move_bin");
        assert_eq!(table.value(0, 3), "S");
    }

    #[test]
    fn test_select_rows_keeps_order() {
        let table = sample_table();
        let picked = table.select_rows(&[1, 0]);
        assert_eq!(picked.value(0, 0), "clip_b");
        assert_eq!(picked.value(1, 0), "clip_a");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let table = sample_table();
        table.write_csv(&path).unwrap();
        assert_eq!(Table::read_csv(&path).unwrap(), table);
    }

    #[test]
    fn test_missing_file() {
        let result = Table::read_csv(Path::new("/nonexistent/manifest.csv"));
        assert!(matches!(result, Err(SamplerError::FileNotFound(_))));
    }
}
