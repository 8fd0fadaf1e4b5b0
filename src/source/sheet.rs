//! Exported spreadsheet reader
//!
//! A sheet is a header row plus records of optional cells. It is read from
//! CSV (header row first) or from a JSON array of objects. Empty and null
//! cells read as missing.

use indexmap::IndexSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{LoaderError, LoaderResult};
use crate::normalize::decode_utf8_ignore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Json,
}

impl SheetFormat {
    /// `.json` reads as JSON, anything else as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SheetFormat::Json,
            _ => SheetFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    headers: Vec<String>,
    records: Vec<Vec<Option<String>>>,
}

impl Sheet {
    pub fn from_path(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        let format = SheetFormat::from_path(path);
        info!("Reading sheet {:?} as {:?}", path, format);
        let reader = BufReader::new(File::open(path)?);
        let sheet = match format {
            SheetFormat::Csv => Self::read_csv(reader)?,
            SheetFormat::Json => Self::read_json(reader)?,
        };
        info!("Read {} records from {:?}", sheet.len(), path);
        Ok(sheet)
    }

    /// Read CSV. Cells that are not valid UTF-8 lose the offending bytes.
    pub fn read_csv<R: Read>(reader: R) -> LoaderResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .byte_headers()?
            .iter()
            .map(|h| decode_utf8_ignore(h).trim().trim_start_matches('\u{feff}').to_string())
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        for record in csv_reader.byte_records() {
            let record = record?;
            let row = record
                .iter()
                .map(|cell| {
                    let text = decode_utf8_ignore(cell);
                    if text.trim().is_empty() {
                        None
                    } else {
                        Some(text)
                    }
                })
                .collect();
            records.push(row);
        }
        debug!("CSV headers: {:?}", headers);
        Ok(Self { headers, records })
    }

    /// Read a JSON array of objects. Headers are the union of all keys;
    /// numbers and booleans are stringified.
    pub fn read_json<R: Read>(reader: R) -> LoaderResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        let rows = match value {
            serde_json::Value::Array(rows) => rows,
            other => {
                return Err(LoaderError::Source(format!(
                    "expected a JSON array of records, found {}",
                    json_kind(&other)
                )))
            }
        };

        let mut headers: IndexSet<String> = IndexSet::new();
        let mut objects = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            match row {
                serde_json::Value::Object(map) => {
                    headers.extend(map.keys().cloned());
                    objects.push(map);
                }
                other => {
                    return Err(LoaderError::Source(format!(
                        "record {} is {}, expected an object",
                        idx,
                        json_kind(&other)
                    )))
                }
            }
        }

        let records = objects
            .iter()
            .map(|map| {
                headers
                    .iter()
                    .map(|h| map.get(h).and_then(cell_text))
                    .collect()
            })
            .collect();
        Ok(Self {
            headers: headers.into_iter().collect(),
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of column `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> LoaderResult<usize> {
        self.column(name)
            .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))
    }

    /// Cell `column` of record `row`; `None` for a missing column or cell.
    pub fn cell(&self, row: usize, column: Option<usize>) -> Option<&str> {
        let idx = column?;
        self.records.get(row)?.get(idx)?.as_deref()
    }
}

fn cell_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv() {
        let data = "\u{feff}论文标题,下载量\nA,12\nB,\n";
        let sheet = Sheet::read_csv(data.as_bytes()).unwrap();
        assert_eq!(sheet.headers(), &["论文标题".to_string(), "下载量".to_string()]);
        assert_eq!(sheet.len(), 2);
        let downloads = sheet.column("下载量");
        assert_eq!(sheet.cell(0, downloads), Some("12"));
        assert_eq!(sheet.cell(1, downloads), None);
        assert_eq!(sheet.cell(0, sheet.column("页数")), None);
    }

    #[test]
    fn test_read_csv_drops_invalid_utf8() {
        let mut data = b"title\nbad".to_vec();
        data.push(0xff);
        data.extend_from_slice(b"cell\n");
        let sheet = Sheet::read_csv(data.as_slice()).unwrap();
        assert_eq!(sheet.cell(0, Some(0)), Some("badcell"));
    }

    #[test]
    fn test_read_json() {
        let data =
            r#"[{"title": "A", "downloads": 12}, {"title": "B", "pages": null, "extra": true}]"#;
        let sheet = Sheet::read_json(data.as_bytes()).unwrap();
        assert_eq!(sheet.headers().len(), 4);
        assert_eq!(sheet.cell(0, sheet.column("downloads")), Some("12"));
        assert_eq!(sheet.cell(1, sheet.column("downloads")), None);
        assert_eq!(sheet.cell(1, sheet.column("pages")), None);
        assert_eq!(sheet.cell(1, sheet.column("extra")), Some("true"));
    }

    #[test]
    fn test_read_json_rejects_non_array() {
        let err = Sheet::read_json(r#"{"title": "A"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, LoaderError::Source(_)));
    }

    #[test]
    fn test_require_column() {
        let sheet = Sheet::read_csv("a,b\n1,2\n".as_bytes()).unwrap();
        assert_eq!(sheet.require_column("b").unwrap(), 1);
        assert!(matches!(
            sheet.require_column("c").unwrap_err(),
            LoaderError::MissingColumn(name) if name == "c"
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SheetFormat::from_path(Path::new("papers.JSON")), SheetFormat::Json);
        assert_eq!(SheetFormat::from_path(Path::new("papers.csv")), SheetFormat::Csv);
        assert_eq!(SheetFormat::from_path(Path::new("papers")), SheetFormat::Csv);
    }
}
