use crate::record::Dataset;
use std::error::Error;

/// Convert the edited table to CSV
///
/// Uses the same layout the loader expects: `;` separators, a header row
/// with the column names and Latin-1 bytes. Characters that Latin-1 cannot
/// hold are written as `?`.
///
/// # Arguments
/// * `dataset` - The table to export, usually the edited snapshot
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - CSV bytes or an error
pub fn to_csv(dataset: &Dataset) -> Result<Vec<u8>, Box<dyn Error>> {
    let columns = dataset.column_names();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(&columns)?;
    for record in &dataset.records {
        writer.write_record(columns.iter().map(|c| record.cell(c).to_string()))?;
    }

    let utf8 = writer.into_inner().map_err(|e| e.to_string())?;
    Ok(encode_latin1(&String::from_utf8(utf8)?))
}

/// Convert the edited table to XLSX format
///
/// Numbers and booleans keep their type; dates are written as `dd/mm/yyyy`
/// text so that they read back through the day-first parser.
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx(dataset: &Dataset) -> Result<Vec<u8>, Box<dyn Error>> {
    use crate::cell::CellValue;
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    let columns = dataset.column_names();
    for (c, name) in columns.iter().enumerate() {
        worksheet.write_string(0, c as u16, name.as_str())?;
    }

    for (r, record) in dataset.records.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, name) in columns.iter().enumerate() {
            let col = c as u16;
            match record.cell(name) {
                CellValue::Empty => {}
                CellValue::Number(n) => {
                    worksheet.write_number(row, col, n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row, col, b)?;
                }
                other => {
                    worksheet.write_string(row, col, other.to_string().as_str())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;
    use crate::loader::{Upload, load_upload};
    use crate::record::{FECHA_ENTREGA_PAP, FECHA_TOMA_PAP, MICRO_RED, Record};
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        Dataset {
            columns: vec![
                FECHA_TOMA_PAP.into(),
                FECHA_ENTREGA_PAP.into(),
                MICRO_RED.into(),
            ],
            records: vec![Record {
                collection_date: NaiveDate::from_ymd_opt(2024, 1, 5),
                micro_red: Some("Peñas".into()),
                days_remaining: Some(3),
                comments: "llamar; urgente ✓".into(),
                ..Record::default()
            }],
        }
    }

    #[test]
    fn csv_export_reads_back_through_the_loader() {
        let bytes = to_csv(&dataset()).unwrap();
        // ñ is one Latin-1 byte, the check mark is not representable
        assert!(bytes.contains(&0xF1));
        assert!(bytes.contains(&b'?'));

        let table = load_upload(&Upload::new("export.csv", bytes)).unwrap();
        assert_eq!(
            table.columns,
            vec![
                "Fecha_Toma_PAP",
                "Fecha_Entrega_PAP",
                "Micro_Red",
                "Días Restantes",
                "Notificado",
                "Comentarios"
            ]
        );
        assert_eq!(table.rows[0][0], CellValue::Text("05/01/2024".into()));
        assert_eq!(table.rows[0][2], CellValue::Text("Peñas".into()));
        assert_eq!(table.rows[0][3], CellValue::Text("3".into()));
        assert_eq!(table.rows[0][5], CellValue::Text("llamar; urgente ?".into()));
    }

    #[cfg(feature = "web")]
    #[test]
    fn xlsx_export_reads_back_through_the_loader() {
        let bytes = to_xlsx(&dataset()).unwrap();
        let table = load_upload(&Upload::new("export.xlsx", bytes)).unwrap();
        assert_eq!(table.columns.len(), 6);
        assert_eq!(table.rows[0][0], CellValue::Text("05/01/2024".into()));
        assert_eq!(table.rows[0][3], CellValue::Number(3.0));
        assert_eq!(table.rows[0][4], CellValue::Bool(false));
    }
}
