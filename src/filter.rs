use crate::record::{Dataset, MICRO_RED};
use std::collections::HashSet;

/// Message shown when the grouping column is absent
pub const MISSING_MICRO_RED: &str = "La columna 'Micro_Red' no se encuentra en los datos.";

/// Distinct `Micro_Red` values in the order they first appear.
pub fn micro_red_options(dataset: &Dataset) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    dataset
        .records
        .iter()
        .filter_map(|r| r.micro_red.as_ref())
        .filter(|unit| seen.insert(*unit))
        .cloned()
        .collect()
}

/// Keep the records whose `Micro_Red` is in `selection`
///
/// An empty selection means no filter and returns a copy of everything. So
/// does a dataset without a `Micro_Red` column; callers report that case
/// with [`MISSING_MICRO_RED`].
pub fn filter_by_micro_red(dataset: &Dataset, selection: &[String]) -> Dataset {
    if selection.is_empty() || !dataset.has_column(MICRO_RED) {
        return dataset.clone();
    }

    let wanted: HashSet<&str> = selection.iter().map(String::as_str).collect();
    Dataset {
        columns: dataset.columns.clone(),
        records: dataset
            .records
            .iter()
            .filter(|r| r.micro_red.as_deref().is_some_and(|u| wanted.contains(u)))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn dataset(units: &[Option<&str>]) -> Dataset {
        Dataset {
            columns: vec![MICRO_RED.to_string()],
            records: units
                .iter()
                .enumerate()
                .map(|(i, u)| Record {
                    micro_red: u.map(str::to_string),
                    comments: i.to_string(),
                    ..Record::default()
                })
                .collect(),
        }
    }

    #[test]
    fn options_are_distinct_in_discovery_order() {
        let data = dataset(&[Some("Sur"), None, Some("Norte"), Some("Sur"), Some("Este")]);
        assert_eq!(micro_red_options(&data), vec!["Sur", "Norte", "Este"]);
    }

    #[test]
    fn empty_selection_returns_everything() {
        let data = dataset(&[Some("Sur"), None, Some("Norte")]);
        assert_eq!(filter_by_micro_red(&data, &[]), data);
    }

    #[test]
    fn selection_keeps_only_matching_rows() {
        let data = dataset(&[Some("Sur"), None, Some("Norte"), Some("Sur")]);
        let filtered = filter_by_micro_red(&data, &["Sur".to_string()]);
        let kept: Vec<&str> = filtered.records.iter().map(|r| r.comments.as_str()).collect();
        assert_eq!(kept, vec!["0", "3"]);
    }

    #[test]
    fn without_the_column_nothing_is_filtered() {
        let mut data = dataset(&[Some("Sur"), Some("Norte")]);
        data.columns.clear();
        let filtered = filter_by_micro_red(&data, &["Sur".to_string()]);
        assert_eq!(filtered.len(), 2);
    }
}
