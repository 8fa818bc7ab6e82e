use crate::cell::CellValue;
use crate::dates::cell_to_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Source column names
pub const DNI: &str = "DNI";
pub const FECHA_TOMA_PAP: &str = "Fecha_Toma_PAP";
pub const FECHA_ENTREGA_PAP: &str = "Fecha_Entrega_PAP";
pub const MICRO_RED: &str = "Micro_Red";

// Columns added by the pipeline
pub const DIAS_RESTANTES: &str = "Días Restantes";
pub const NOTIFICADO: &str = "Notificado";
pub const COMENTARIOS: &str = "Comentarios";

/// Columns every run appends after the source columns, in display order.
pub const DERIVED_COLUMNS: [&str; 3] = [DIAS_RESTANTES, NOTIFICADO, COMENTARIOS];

/// One sample of the uploaded table
///
/// The recognised columns are typed fields; anything else the file carries
/// is kept untouched in `extra`, keyed by column name.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Record {
    pub dni: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub micro_red: Option<String>,
    /// Derived; `None` once the sample has been delivered
    pub days_remaining: Option<i64>,
    pub notified: bool,
    pub comments: String,
    pub extra: BTreeMap<String, CellValue>,
}

impl Record {
    /// Reads the value shown in the grid for `column`.
    pub fn cell(&self, column: &str) -> CellValue {
        match column {
            DNI => text_cell(&self.dni),
            FECHA_TOMA_PAP => self.collection_date.map(CellValue::Date).unwrap_or_default(),
            FECHA_ENTREGA_PAP => self.delivery_date.map(CellValue::Date).unwrap_or_default(),
            MICRO_RED => text_cell(&self.micro_red),
            DIAS_RESTANTES => self
                .days_remaining
                .map(|d| CellValue::Number(d as f64))
                .unwrap_or_default(),
            NOTIFICADO => CellValue::Bool(self.notified),
            COMENTARIOS => CellValue::from_text(&self.comments),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }

    /// Writes a grid edit into `column`
    ///
    /// Dates go through the same day-first parser as the upload, so text
    /// that is not a date clears the cell. Returns a user-facing reason when
    /// the value does not fit the column.
    pub fn set_cell(&mut self, column: &str, raw: &str) -> Result<(), String> {
        match column {
            DNI => self.dni = CellValue::from_text(raw).as_text(),
            FECHA_TOMA_PAP => self.collection_date = cell_to_date(&CellValue::from_text(raw)),
            FECHA_ENTREGA_PAP => self.delivery_date = cell_to_date(&CellValue::from_text(raw)),
            MICRO_RED => self.micro_red = CellValue::from_text(raw).as_text(),
            DIAS_RESTANTES => {
                let trimmed = raw.trim();
                self.days_remaining = if trimmed.is_empty() {
                    None
                } else {
                    Some(
                        trimmed
                            .parse::<i64>()
                            .map_err(|_| format!("'{}' no es un número entero", raw))?,
                    )
                };
            }
            NOTIFICADO => self.notified = parse_flag(raw)?,
            COMENTARIOS => self.comments = raw.to_string(),
            other => {
                self.extra.insert(other.to_string(), CellValue::from_text(raw));
            }
        }
        Ok(())
    }
}

fn text_cell(value: &Option<String>) -> CellValue {
    value
        .as_deref()
        .map(CellValue::from_text)
        .unwrap_or_default()
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "si" | "sí" => Ok(true),
        _ => Err(format!("'{}' no es un valor de Notificado válido", raw)),
    }
}

/// The working table of one run
///
/// `columns` lists the source columns in file order; the derived columns
/// always follow them (see [`Dataset::column_names`]).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Source columns followed by the derived ones, skipping a source column
    /// that already uses a derived name.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.columns.clone();
        for derived in DERIVED_COLUMNS {
            if !self.has_column(derived) {
                names.push(derived.to_string());
            }
        }
        names
    }

    pub fn is_editable_column(&self, name: &str) -> bool {
        self.has_column(name) || DERIVED_COLUMNS.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
