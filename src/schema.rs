use crate::cell::CellValue;
use crate::dates::cell_to_date;
use crate::error::{PapError, Result};
use crate::loader::RawTable;
use crate::record::{
    COMENTARIOS, DIAS_RESTANTES, DNI, Dataset, FECHA_ENTREGA_PAP, FECHA_TOMA_PAP, MICRO_RED,
    NOTIFICADO, Record,
};
use log::{debug, warn};

/// Columns without which no deadline can be computed, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 2] = [FECHA_TOMA_PAP, FECHA_ENTREGA_PAP];

/// Names of the required columns absent from `columns`, in reporting order.
pub fn missing_columns(columns: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.as_str() == **required))
        .map(|s| s.to_string())
        .collect()
}

/// Check the required columns and turn the raw rows into records
///
/// Both date columns are parsed day-first; a cell that is not a date
/// becomes `None` rather than failing the run. The derived fields start
/// out empty: no countdown, not notified, no comments.
pub fn validate(table: RawTable) -> Result<Dataset> {
    let missing = missing_columns(&table.columns);
    if !missing.is_empty() {
        warn!("upload rejected, missing columns: {}", missing.join(", "));
        return Err(PapError::Schema { missing });
    }

    let records: Vec<Record> = table
        .rows
        .iter()
        .map(|row| build_record(&table.columns, row))
        .collect();

    let toma_idx = table.column_index(FECHA_TOMA_PAP);
    let unparsed = records
        .iter()
        .zip(&table.rows)
        .filter(|(record, row)| {
            record.collection_date.is_none() && toma_idx.is_some_and(|i| !row[i].is_empty())
        })
        .count();
    if unparsed > 0 {
        debug!("{} collection dates could not be parsed and were left empty", unparsed);
    }

    Ok(Dataset {
        columns: table.columns,
        records,
    })
}

fn build_record(columns: &[String], row: &[CellValue]) -> Record {
    let mut record = Record::default();
    for (name, cell) in columns.iter().zip(row) {
        match name.as_str() {
            DNI => record.dni = cell.as_text(),
            FECHA_TOMA_PAP => record.collection_date = cell_to_date(cell),
            FECHA_ENTREGA_PAP => record.delivery_date = cell_to_date(cell),
            MICRO_RED => record.micro_red = cell.as_text(),
            // overwritten by the pipeline, like a fresh column
            DIAS_RESTANTES | NOTIFICADO | COMENTARIOS => {}
            other => {
                record.extra.insert(other.to_string(), cell.clone());
            }
        }
    }
    record
}
