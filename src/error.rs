use thiserror::Error;

/// Errors of the pipeline
///
/// The `Display` text is what the user sees, so the messages follow the
/// wording of the upload page.
#[derive(Debug, Error)]
pub enum PapError {
    /// The uploaded file could not be read as a table
    #[error("Error al leer el archivo: {0}")]
    Parse(String),

    /// One or both required date columns are missing
    #[error("El archivo no contiene las siguientes columnas necesarias: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A manual edit referenced a row or column that does not exist, or
    /// carried a value the column cannot hold. The run skips it and carries on.
    #[error("No se pudo aplicar la edición #{index}: {reason}")]
    Edit { index: usize, reason: String },

    /// Writing the edited table to a download format failed
    #[error("Error al exportar los datos: {0}")]
    Export(String),
}

impl PapError {
    pub fn parse(err: impl std::fmt::Display) -> Self {
        PapError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_joins_missing_columns() {
        let err = PapError::Schema {
            missing: vec!["Fecha_Toma_PAP".into(), "Fecha_Entrega_PAP".into()],
        };
        assert_eq!(
            err.to_string(),
            "El archivo no contiene las siguientes columnas necesarias: Fecha_Toma_PAP, Fecha_Entrega_PAP"
        );
    }

    #[test]
    fn parse_error_prefixes_detail() {
        let err = PapError::parse("CSV file is empty");
        assert_eq!(err.to_string(), "Error al leer el archivo: CSV file is empty");
    }
}
