use crate::deadline::DeadlinePolicy;
use crate::record::{DIAS_RESTANTES, Dataset};
use serde::{Deserialize, Serialize};

/// Urgency bucket of a pending sample
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyTier {
    Critical,
    Warning,
    Ok,
}

impl UrgencyTier {
    /// Background colour used for the `Días Restantes` cell.
    pub fn color(self) -> &'static str {
        match self {
            UrgencyTier::Critical => "red",
            UrgencyTier::Warning => "yellow",
            UrgencyTier::Ok => "green",
        }
    }
}

/// Maps a remaining-day count to its tier; no count means no tier.
pub fn classify(days_remaining: Option<i64>, policy: &DeadlinePolicy) -> Option<UrgencyTier> {
    let days = days_remaining?;
    Some(if days <= policy.critical_max {
        UrgencyTier::Critical
    } else if days <= policy.warning_max {
        UrgencyTier::Warning
    } else {
        UrgencyTier::Ok
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyledRow {
    pub cells: Vec<String>,
    pub tier: Option<UrgencyTier>,
    pub color: Option<String>,
}

/// A table ready for display
///
/// Cells are display strings aligned with `columns`. `highlight_column` is
/// the index of the cell the tier colour applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyledTable {
    pub columns: Vec<String>,
    pub highlight_column: Option<usize>,
    pub rows: Vec<StyledRow>,
}

/// Render a dataset row by row without touching its order or values.
pub fn present(dataset: &Dataset, policy: &DeadlinePolicy) -> StyledTable {
    let columns = dataset.column_names();
    let highlight_column = columns.iter().position(|c| c == DIAS_RESTANTES);

    let rows = dataset
        .records
        .iter()
        .map(|record| {
            let tier = classify(record.days_remaining, policy);
            StyledRow {
                cells: columns.iter().map(|c| record.cell(c).to_string()).collect(),
                tier,
                color: tier.map(|t| t.color().to_string()),
            }
        })
        .collect();

    StyledTable {
        columns,
        highlight_column,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FECHA_ENTREGA_PAP, FECHA_TOMA_PAP, Record};
    use chrono::NaiveDate;

    #[test]
    fn thresholds_are_inclusive_at_the_top() {
        let policy = DeadlinePolicy::default();
        assert_eq!(classify(Some(-30), &policy), Some(UrgencyTier::Critical));
        assert_eq!(classify(Some(5), &policy), Some(UrgencyTier::Critical));
        assert_eq!(classify(Some(6), &policy), Some(UrgencyTier::Warning));
        assert_eq!(classify(Some(15), &policy), Some(UrgencyTier::Warning));
        assert_eq!(classify(Some(16), &policy), Some(UrgencyTier::Ok));
        assert_eq!(classify(None, &policy), None);
    }

    #[test]
    fn every_value_gets_exactly_one_tier() {
        let policy = DeadlinePolicy::default();
        for days in -60..=60 {
            let tier = classify(Some(days), &policy).unwrap();
            let expected = if days <= 5 {
                UrgencyTier::Critical
            } else if days <= 15 {
                UrgencyTier::Warning
            } else {
                UrgencyTier::Ok
            };
            assert_eq!(tier, expected, "days = {}", days);
        }
    }

    #[test]
    fn presented_rows_keep_order_and_colour_the_countdown() {
        let dataset = Dataset {
            columns: vec![FECHA_TOMA_PAP.into(), FECHA_ENTREGA_PAP.into()],
            records: vec![
                Record {
                    collection_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                    days_remaining: Some(-1),
                    ..Record::default()
                },
                Record {
                    collection_date: NaiveDate::from_ymd_opt(2024, 1, 20),
                    delivery_date: NaiveDate::from_ymd_opt(2024, 1, 25),
                    ..Record::default()
                },
            ],
        };

        let table = present(&dataset, &DeadlinePolicy::default());
        assert_eq!(table.highlight_column, Some(2));
        assert_eq!(table.rows[0].cells[0], "01/01/2024");
        assert_eq!(table.rows[0].cells[2], "-1");
        assert_eq!(table.rows[0].color.as_deref(), Some("red"));
        assert_eq!(table.rows[1].cells[1], "25/01/2024");
        assert_eq!(table.rows[1].cells[2], "");
        assert_eq!(table.rows[1].tier, None);
        assert_eq!(table.rows[1].cells[3], "false");
    }
}
