//! Spreadsheet ingestion: turn the first sheet of a workbook (or a CSV file)
//! into an ordered list of flat JSON records.
//!
//! Only the first sheet is read. Later sheets are ignored on purpose.

use crate::error::{PipelineError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// One sheet row: column header -> cell value. Empty cells are absent.
pub type TabularRecord = Map<String, Value>;

const EMPTY_HEADER: &str = "__EMPTY";

/// Input formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// xlsx, xlsm, xlsb, xls or ods; the concrete format is sniffed from content
    Spreadsheet,
    Csv,
}

impl WorkbookFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(WorkbookFormat::Spreadsheet),
            "csv" => Ok(WorkbookFormat::Csv),
            _ => Err(PipelineError::UnsupportedFileFormat(format!(
                "{} is not a spreadsheet",
                path.display()
            ))),
        }
    }
}

/// Read a spreadsheet or CSV file and ingest its first sheet.
pub async fn ingest_file(path: &Path) -> Result<Vec<TabularRecord>> {
    let format = WorkbookFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await?;

    info!("Ingesting {} ({} bytes)", path.display(), bytes.len());

    let records = match format {
        WorkbookFormat::Spreadsheet => ingest_workbook(bytes)?,
        WorkbookFormat::Csv => ingest_csv(&bytes)?,
    };

    info!("Ingested {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Ingest the first sheet of an in-memory workbook.
pub fn ingest_workbook(bytes: Vec<u8>) -> Result<Vec<TabularRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PipelineError::UnsupportedFileFormat(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| PipelineError::UnsupportedFileFormat(e.to_string()))?,
        None => {
            return Err(PipelineError::MalformedInput(
                "workbook contains no sheets".to_string(),
            ))
        }
    };

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_names(header_row.iter().map(header_text)),
        None => return Ok(Vec::new()),
    };

    debug!("Sheet headers: {:?}", headers);

    Ok(rows
        .map(|row| build_record(&headers, row.iter().map(cell_value)))
        .filter(|record| !record.is_empty())
        .collect())
}

/// Ingest CSV text with a header row.
///
/// Rows may be ragged. Fields past the header row's width get blank-header
/// names (`__EMPTY`, `__EMPTY_1`, ...), the same as a spreadsheet whose used
/// range extends past its last header cell.
pub fn ingest_csv(bytes: &[u8]) -> Result<Vec<TabularRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::UnsupportedFileFormat(format!("invalid CSV: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::MalformedInput(format!("invalid CSV row: {}", e)))?;

    let width = rows
        .iter()
        .map(|row| row.len())
        .max()
        .unwrap_or(0)
        .max(raw_headers.len());
    let padding = width - raw_headers.len();
    if padding > 0 {
        debug!("{} CSV columns have no header", padding);
    }
    let headers = header_names(
        raw_headers
            .into_iter()
            .chain(std::iter::repeat(String::new()).take(padding)),
    );

    Ok(rows
        .iter()
        .map(|row| build_record(&headers, row.iter().map(csv_value)))
        .filter(|record| !record.is_empty())
        .collect())
}

/// Serialize records as a JSON array, the shape `codec::compress` expects.
pub fn records_to_json(records: &[TabularRecord]) -> String {
    Value::Array(records.iter().cloned().map(Value::Object).collect()).to_string()
}

/// Load a translation source: `.json` files verbatim, anything else through
/// spreadsheet ingestion.
pub async fn load_source(path: &Path) -> Result<String> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(tokio::fs::read_to_string(path).await?)
    } else {
        let records = ingest_file(path).await?;
        Ok(records_to_json(&records))
    }
}

/// Name columns from their header cells.
///
/// Blank headers become `__EMPTY`. A repeated name gets the next free `_n`
/// suffix, skipping any name already taken by another column, so every
/// column keeps its own key (`a, a, a_1` becomes `a, a_1, a_1_1`).
fn header_names(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    raw.map(|name| {
        let base = if name.is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            name
        };

        let mut next = counts.get(&base).copied().unwrap_or(0);
        if next == 0 {
            counts.insert(base.clone(), 1);
            return base;
        }

        let unique = loop {
            let candidate = format!("{}_{}", base, next);
            next += 1;
            if !counts.contains_key(&candidate) {
                break candidate;
            }
        };
        counts.insert(base, next);
        counts.insert(unique.clone(), 1);
        unique
    })
    .collect()
}

fn build_record(headers: &[String], cells: impl Iterator<Item = Option<Value>>) -> TabularRecord {
    headers
        .iter()
        .zip(cells)
        .filter_map(|(header, cell)| cell.map(|value| (header.clone(), value)))
        .collect()
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Convert a sheet cell; `None` for empty cells.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(Value::String(text.clone())),
        Data::Int(n) => Some(Value::from(*n)),
        Data::Float(f) => Some(float_value(*f)),
        Data::Bool(b) => Some(Value::Bool(*b)),
        other => Some(Value::String(other.to_string())),
    }
}

/// Convert a CSV field, inferring numbers and booleans.
fn csv_value(field: &str) -> Option<Value> {
    if field.is_empty() {
        return None;
    }

    if let Ok(n) = field.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(f) = field.parse::<f64>() {
        if f.is_finite() {
            return Some(float_value(f));
        }
    }

    match field {
        "TRUE" => Some(Value::Bool(true)),
        "FALSE" => Some(Value::Bool(false)),
        _ => Some(Value::String(field.to_string())),
    }
}

/// Integral floats become JSON integers (30.0 -> 30).
fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Value::from(f as i64)
    } else {
        Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use serde_json::json;
    use tempfile::TempDir;

    /// Build an xlsx workbook whose first sheet holds name/age rows
    fn people_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "name").unwrap();
        sheet.write_string(0, 1, "age").unwrap();
        sheet.write_string(1, 0, "Alice").unwrap();
        sheet.write_number(1, 1, 30).unwrap();
        sheet.write_string(2, 0, "Bob").unwrap();
        sheet.write_string(2, 1, "").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    // ==================== ingest_workbook Tests ====================

    #[test]
    fn test_ingest_workbook_omits_empty_cells() {
        let records = ingest_workbook(people_workbook()).expect("Should ingest");
        let json = Value::Array(records.into_iter().map(Value::Object).collect());

        assert_eq!(
            json,
            json!([{"name": "Alice", "age": 30}, {"name": "Bob"}])
        );
    }

    #[test]
    fn test_ingest_workbook_reads_first_sheet_only() {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.write_string(0, 0, "key").unwrap();
        first.write_string(1, 0, "first").unwrap();
        let second = workbook.add_worksheet();
        second.write_string(0, 0, "key").unwrap();
        second.write_string(1, 0, "second").unwrap();
        second.write_string(2, 0, "more").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let records = ingest_workbook(bytes).expect("Should ingest");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["key"], "first");
    }

    #[test]
    fn test_ingest_workbook_keeps_column_order() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "zh").unwrap();
        sheet.write_string(0, 1, "en").unwrap();
        sheet.write_string(1, 0, "你好").unwrap();
        sheet.write_string(1, 1, "Hello").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let records = ingest_workbook(bytes).expect("Should ingest");
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["zh", "en"]);
    }

    #[test]
    fn test_ingest_workbook_values() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "ratio").unwrap();
        sheet.write_string(0, 1, "active").unwrap();
        sheet.write_number(1, 0, 0.5).unwrap();
        sheet.write_boolean(1, 1, true).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let records = ingest_workbook(bytes).expect("Should ingest");
        assert_eq!(records[0]["ratio"], json!(0.5));
        assert_eq!(records[0]["active"], json!(true));
    }

    #[test]
    fn test_ingest_workbook_header_only() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "name").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        assert!(ingest_workbook(bytes).expect("Should ingest").is_empty());
    }

    #[test]
    fn test_ingest_workbook_plain_text_is_unsupported() {
        let bytes = b"this is just some text, not a workbook\n".to_vec();
        let result = ingest_workbook(bytes);
        assert!(matches!(result, Err(PipelineError::UnsupportedFileFormat(_))));
    }

    // ==================== ingest_csv Tests ====================

    #[test]
    fn test_ingest_csv() {
        let csv = "name,age\nAlice,30\nBob,\n";
        let records = ingest_csv(csv.as_bytes()).expect("Should ingest");
        let json = Value::Array(records.into_iter().map(Value::Object).collect());

        assert_eq!(json, json!([{"name": "Alice", "age": 30}, {"name": "Bob"}]));
    }

    #[test]
    fn test_ingest_csv_value_inference() {
        let csv = "a,b,c,d\n1.25,TRUE,hello,007x\n";
        let records = ingest_csv(csv.as_bytes()).expect("Should ingest");

        assert_eq!(records[0]["a"], json!(1.25));
        assert_eq!(records[0]["b"], json!(true));
        assert_eq!(records[0]["c"], json!("hello"));
        assert_eq!(records[0]["d"], json!("007x"));
    }

    #[test]
    fn test_ingest_csv_skips_blank_rows() {
        let csv = "key,text\n,\nwelcome,Welcome\n";
        let records = ingest_csv(csv.as_bytes()).expect("Should ingest");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["key"], "welcome");
    }

    #[test]
    fn test_ingest_csv_short_rows() {
        let csv = "key,en,fr\ngreeting,Hello\n";
        let records = ingest_csv(csv.as_bytes()).expect("Should ingest");
        assert_eq!(records[0].len(), 2);
        assert!(!records[0].contains_key("fr"));
    }

    #[test]
    fn test_ingest_csv_names_overflow_columns() {
        let csv = "key,en\ngreet,Hello,Bonjour\nbye,Bye\n";
        let records = ingest_csv(csv.as_bytes()).expect("Should ingest");
        let json = Value::Array(records.into_iter().map(Value::Object).collect());

        assert_eq!(
            json,
            json!([
                {"key": "greet", "en": "Hello", "__EMPTY": "Bonjour"},
                {"key": "bye", "en": "Bye"}
            ])
        );
    }

    #[test]
    fn test_ingest_csv_overflow_after_blank_header() {
        let csv = "key,\nk,v,w\n";
        let records = ingest_csv(csv.as_bytes()).expect("Should ingest");
        let keys: Vec<_> = records[0].keys().cloned().collect();
        assert_eq!(keys, vec!["key", "__EMPTY", "__EMPTY_1"]);
    }

    #[test]
    fn test_ingest_csv_keeps_every_duplicate_column() {
        let records = ingest_csv(b"a,a,a_1\n1,2,3\n").expect("Should ingest");
        assert_eq!(records[0].len(), 3);
        assert_eq!(
            Value::Object(records[0].clone()),
            json!({"a": 1, "a_1": 2, "a_1_1": 3})
        );
    }

    // ==================== Header Naming Tests ====================

    #[test]
    fn test_header_names_blank_and_duplicates() {
        let raw = vec!["name", "", "name", "", "age", "name"]
            .into_iter()
            .map(String::from);

        assert_eq!(
            header_names(raw),
            vec!["name", "__EMPTY", "name_1", "__EMPTY_1", "age", "name_2"]
        );
    }

    #[test]
    fn test_header_names_skip_taken_suffixes() {
        let raw = vec!["a", "a", "a_1"].into_iter().map(String::from);
        assert_eq!(header_names(raw), vec!["a", "a_1", "a_1_1"]);

        let raw = vec!["a_1", "a", "a"].into_iter().map(String::from);
        assert_eq!(header_names(raw), vec!["a_1", "a", "a_2"]);

        let raw = vec!["__EMPTY", ""].into_iter().map(String::from);
        assert_eq!(header_names(raw), vec!["__EMPTY", "__EMPTY_1"]);
    }

    #[test]
    fn test_float_value_integral() {
        assert_eq!(float_value(30.0), json!(30));
        assert_eq!(float_value(-2.0), json!(-2));
        assert_eq!(float_value(2.5), json!(2.5));
    }

    // ==================== File Tests ====================

    #[test]
    fn test_workbook_format_from_path() {
        assert_eq!(
            WorkbookFormat::from_path(Path::new("a/b.XLSX")).unwrap(),
            WorkbookFormat::Spreadsheet
        );
        assert_eq!(
            WorkbookFormat::from_path(Path::new("data.csv")).unwrap(),
            WorkbookFormat::Csv
        );
        assert!(matches!(
            WorkbookFormat::from_path(Path::new("notes.txt")),
            Err(PipelineError::UnsupportedFileFormat(_))
        ));
        assert!(WorkbookFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[tokio::test]
    async fn test_ingest_file_xlsx() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("people.xlsx");
        std::fs::write(&path, people_workbook()).unwrap();

        let records = ingest_file(&path).await.expect("Should ingest");
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_file_renamed_text_is_unsupported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("fake.xlsx");
        std::fs::write(&path, "name,age\nAlice,30\n").unwrap();

        let result = ingest_file(&path).await;
        assert!(matches!(result, Err(PipelineError::UnsupportedFileFormat(_))));
    }

    #[tokio::test]
    async fn test_ingest_file_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = ingest_file(&temp_dir.path().join("missing.csv")).await;
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_source_json_verbatim() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("en.json");
        std::fs::write(&path, "{\n  \"title\": \"Hi\"\n}").unwrap();

        let source = load_source(&path).await.expect("Should load");
        assert_eq!(source, "{\n  \"title\": \"Hi\"\n}");
    }

    #[tokio::test]
    async fn test_load_source_csv_as_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("strings.csv");
        std::fs::write(&path, "key,text\nok,OK\n").unwrap();

        let source = load_source(&path).await.expect("Should load");
        assert_eq!(source, r#"[{"key":"ok","text":"OK"}]"#);
    }

    #[test]
    fn test_records_to_json() {
        let records = ingest_csv(b"name,age\nAlice,30\n").unwrap();
        assert_eq!(records_to_json(&records), r#"[{"name":"Alice","age":30}]"#);
    }
}
