use crate::cell::CellValue;
use crate::dates::excel_serial_to_date;
use crate::error::{PapError, Result};
use crate::record::DNI;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::io::Cursor;

/// Format of an uploaded file, decided from its name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// `;`-separated text in Latin-1
    Csv,
    /// Workbook; only the first sheet is read
    Spreadsheet,
}

impl FileKind {
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_lowercase();
        if lower.ends_with("csv") {
            return Ok(FileKind::Csv);
        }
        match lower.rsplit_once('.').map(|(_, ext)| ext) {
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
                Ok(FileKind::Spreadsheet)
            }
            Some(ext) => Err(PapError::Parse(format!("Unsupported file extension: {}", ext))),
            None => Err(PapError::Parse("File has no extension".to_string())),
        }
    }
}

/// An uploaded file as received from the browser
#[derive(Clone, Debug)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Header plus rows, before any column is given a meaning
///
/// Every row has exactly `columns.len()` cells.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }
}

/// Load an uploaded file into a raw table
///
/// Picks the CSV or spreadsheet reader from the file name, then trims the
/// column names and forces `DNI` to text. Every failure is reported as a
/// [`PapError::Parse`]; no partial table is ever returned.
///
/// # Examples
/// ```
/// use pap_tracker::loader::{load_upload, Upload};
///
/// let upload = Upload::new("muestras.csv", b"DNI;Micro_Red\n00123;Norte\n".to_vec());
/// let table = load_upload(&upload).unwrap();
/// assert_eq!(table.columns, vec!["DNI", "Micro_Red"]);
/// ```
pub fn load_upload(upload: &Upload) -> Result<RawTable> {
    let kind = FileKind::from_name(&upload.name)?;
    let mut table = match kind {
        FileKind::Csv => from_csv_bytes(&upload.bytes),
        FileKind::Spreadsheet => from_excel_bytes(&upload.bytes),
    }
    .map_err(PapError::parse)?;

    table.columns = normalize_headers(table.columns);
    coerce_dni_to_text(&mut table);

    info!(
        "loaded {} rows x {} columns from {} ({:?})",
        table.rows.len(),
        table.columns.len(),
        upload.name,
        kind
    );
    Ok(table)
}

/// Read a `;`-separated Latin-1 CSV
///
/// Short rows are padded with empty cells, long rows are cut to the header
/// width and blank lines are skipped.
pub fn from_csv_bytes(bytes: &[u8]) -> std::result::Result<RawTable, Box<dyn Error>> {
    let text = decode_latin1(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        return Err("No columns to parse from file".into());
    }

    let width = columns.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let mut row: Vec<CellValue> = record.iter().take(width).map(CellValue::from_text).collect();
        row.resize(width, CellValue::Empty);
        rows.push(row);
    }

    debug!("csv reader produced {} data rows", rows.len());
    Ok(RawTable { columns, rows })
}

/// Read the first sheet of a workbook; its first row is the header
pub fn from_excel_bytes(bytes: &[u8]) -> std::result::Result<RawTable, Box<dyn Error>> {
    use calamine::{Reader, open_workbook_auto_from_rs};

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    // Get the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or("No sheets found in spreadsheet")?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut sheet_rows = range.rows();
    let header = sheet_rows.next().ok_or("Spreadsheet sheet is empty")?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            convert_excel_cell(cell)
                .as_text()
                .unwrap_or_else(|| format!("Unnamed: {}", i))
        })
        .collect();

    let width = columns.len();
    let rows = sheet_rows
        .map(|row| {
            let mut out: Vec<CellValue> = row.iter().take(width).map(convert_excel_cell).collect();
            out.resize(width, CellValue::Empty);
            out
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn convert_excel_cell(cell: &calamine::Data) -> CellValue {
    use calamine::Data;

    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(_) => CellValue::Empty,
    }
}

/// ISO-8859-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Trim column names and make them unique (`Col`, `Col.1`, `Col.2`, ...)
fn normalize_headers(columns: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    columns
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = match name.trim() {
                "" => format!("Unnamed: {}", i),
                trimmed => trimmed.to_string(),
            };
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

fn coerce_dni_to_text(table: &mut RawTable) {
    let Some(idx) = table.column_index(DNI) else {
        return;
    };
    for row in &mut table.rows {
        if let Some(text) = row[idx].as_text() {
            row[idx] = CellValue::Text(text);
        }
    }
}
