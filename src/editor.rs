use crate::error::{PapError, Result};
use crate::record::{Dataset, Record};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One manual change made in the editable grid
///
/// Row indices point into the snapshot as it stands when the edit is
/// applied, so a deletion shifts the rows after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    /// Overwrite one cell with the text typed by the user
    Set {
        row: usize,
        column: String,
        value: String,
    },
    /// Add an empty row at the bottom
    Append,
    /// Remove a row
    Delete { row: usize },
}

/// Result of replaying the grid edits
#[derive(Debug)]
pub struct EditOutcome {
    pub snapshot: Dataset,
    /// Edits that could not be applied, with their position in the list
    pub rejected: Vec<PapError>,
}

impl EditOutcome {
    /// Positions of the rejected edits in the submitted list
    pub fn rejected_indices(&self) -> Vec<usize> {
        self.rejected
            .iter()
            .filter_map(|e| match e {
                PapError::Edit { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }
}

/// Apply the grid edits to a copy of `filtered`
///
/// The input is left untouched; the returned snapshot is what the chart and
/// the downloads see. `Días Restantes` is not recomputed after an edit.
/// An edit that cannot be applied leaves the snapshot as it was and is
/// reported in `rejected`; the edits after it still apply.
pub fn apply_edits(filtered: &Dataset, edits: &[Edit]) -> EditOutcome {
    let mut snapshot = filtered.clone();
    let mut rejected = Vec::new();

    for (index, edit) in edits.iter().enumerate() {
        if let Err(e) = apply_edit(&mut snapshot, index, edit) {
            warn!("{}", e);
            rejected.push(e);
        }
    }

    debug!(
        "applied {} of {} edits, snapshot has {} rows",
        edits.len() - rejected.len(),
        edits.len(),
        snapshot.len()
    );
    EditOutcome { snapshot, rejected }
}

fn apply_edit(snapshot: &mut Dataset, index: usize, edit: &Edit) -> Result<()> {
    match edit {
        Edit::Set { row, column, value } => {
            if !snapshot.is_editable_column(column) {
                return Err(PapError::Edit {
                    index,
                    reason: format!("la columna '{}' no existe", column),
                });
            }
            let record = snapshot
                .records
                .get_mut(*row)
                .ok_or_else(|| out_of_range(index, *row))?;
            record
                .set_cell(column, value)
                .map_err(|reason| PapError::Edit { index, reason })?;
        }
        Edit::Append => snapshot.records.push(Record::default()),
        Edit::Delete { row } => {
            if *row >= snapshot.records.len() {
                return Err(out_of_range(index, *row));
            }
            snapshot.records.remove(*row);
        }
    }
    Ok(())
}

fn out_of_range(index: usize, row: usize) -> PapError {
    PapError::Edit {
        index,
        reason: format!("la fila {} no existe", row),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        COMENTARIOS, DIAS_RESTANTES, FECHA_ENTREGA_PAP, FECHA_TOMA_PAP, MICRO_RED, NOTIFICADO,
    };
    use chrono::NaiveDate;

    fn base() -> Dataset {
        Dataset {
            columns: vec![
                FECHA_TOMA_PAP.into(),
                FECHA_ENTREGA_PAP.into(),
                MICRO_RED.into(),
            ],
            records: vec![
                Record {
                    micro_red: Some("Norte".into()),
                    days_remaining: Some(4),
                    ..Record::default()
                },
                Record {
                    micro_red: Some("Sur".into()),
                    ..Record::default()
                },
            ],
        }
    }

    #[test]
    fn no_edits_is_an_identical_copy() {
        let data = base();
        let outcome = apply_edits(&data, &[]);
        assert_eq!(outcome.snapshot, data);
        assert!(outcome.rejected.is_empty());
    }

    #[test]
    fn set_append_delete_in_sequence() {
        let data = base();
        let edits = vec![
            Edit::Set {
                row: 0,
                column: FECHA_ENTREGA_PAP.into(),
                value: "02/02/2024".into(),
            },
            Edit::Append,
            Edit::Set {
                row: 2,
                column: MICRO_RED.into(),
                value: "Este".into(),
            },
            Edit::Delete { row: 1 },
        ];

        let outcome = apply_edits(&data, &edits);
        assert!(outcome.rejected.is_empty());
        let snapshot = outcome.snapshot;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.records[0].delivery_date,
            NaiveDate::from_ymd_opt(2024, 2, 2)
        );
        // the countdown stays as computed at load time
        assert_eq!(snapshot.records[0].days_remaining, Some(4));
        assert_eq!(snapshot.records[1].micro_red.as_deref(), Some("Este"));
        assert!(!snapshot.records[1].notified);

        // the filtered input is not written back
        assert_eq!(data.records[0].delivery_date, None);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn bad_row_or_column_is_rejected() {
        let data = base();
        let outcome = apply_edits(&data, &[Edit::Delete { row: 5 }]);
        assert!(matches!(outcome.rejected[..], [PapError::Edit { index: 0, .. }]));
        assert_eq!(outcome.snapshot, data);

        let outcome = apply_edits(
            &data,
            &[
                Edit::Append,
                Edit::Set {
                    row: 0,
                    column: "Inventada".into(),
                    value: "x".into(),
                },
            ],
        );
        assert_eq!(outcome.rejected_indices(), vec![1]);
        assert_eq!(outcome.snapshot.len(), 3);
    }

    #[test]
    fn rejected_edit_does_not_block_the_ones_after_it() {
        let data = base();
        let edits = vec![
            Edit::Set {
                row: 0,
                column: DIAS_RESTANTES.into(),
                value: "pronto".into(),
            },
            Edit::Set {
                row: 1,
                column: NOTIFICADO.into(),
                value: "quizás".into(),
            },
            Edit::Append,
            Edit::Set {
                row: 1,
                column: COMENTARIOS.into(),
                value: "llamar".into(),
            },
        ];

        let outcome = apply_edits(&data, &edits);
        assert_eq!(outcome.rejected_indices(), vec![0, 1]);
        assert_eq!(outcome.snapshot.len(), 3);
        assert_eq!(outcome.snapshot.records[0].days_remaining, Some(4));
        assert!(!outcome.snapshot.records[1].notified);
        assert_eq!(outcome.snapshot.records[1].comments, "llamar");
    }

    #[test]
    fn edits_deserialize_from_the_page_format() {
        let json = r#"[
            {"op": "set", "row": 0, "column": "Comentarios", "value": "llamar"},
            {"op": "append"},
            {"op": "delete", "row": 1}
        ]"#;
        let edits: Vec<Edit> = serde_json::from_str(json).unwrap();
        assert_eq!(edits.len(), 3);
        assert_eq!(edits[1], Edit::Append);
    }
}
