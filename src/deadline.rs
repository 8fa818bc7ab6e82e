use crate::record::{Dataset, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Deadline and colour thresholds applied to every run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePolicy {
    /// Days a collected sample may wait for its result
    pub deadline_days: i64,
    /// Highest remaining-day count still shown as critical
    pub critical_max: i64,
    /// Highest remaining-day count still shown as a warning
    pub warning_max: i64,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            deadline_days: 28,
            critical_max: 5,
            warning_max: 15,
        }
    }
}

/// Days left before the deadline for one record
///
/// Delivered samples have no countdown. A pending sample without a
/// collection date has too little data and also yields `None`. The value
/// goes negative once the deadline has passed.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use pap_tracker::deadline::{days_remaining, DeadlinePolicy};
/// use pap_tracker::record::Record;
///
/// let record = Record {
///     collection_date: NaiveDate::from_ymd_opt(2024, 1, 25),
///     ..Record::default()
/// };
/// let today = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
/// assert_eq!(days_remaining(&record, today, &DeadlinePolicy::default()), Some(23));
/// ```
pub fn days_remaining(record: &Record, today: NaiveDate, policy: &DeadlinePolicy) -> Option<i64> {
    if record.delivery_date.is_some() {
        return None;
    }
    let collected = record.collection_date?;
    let elapsed = (today - collected).num_days();
    Some(policy.deadline_days - elapsed)
}

/// Fill in `days_remaining` for every record against the same `today`.
pub fn apply_deadlines(dataset: &mut Dataset, today: NaiveDate, policy: &DeadlinePolicy) {
    for record in &mut dataset.records {
        record.days_remaining = days_remaining(record, today, policy);
    }
}

/// Most urgent first; records without a countdown go last
///
/// The sort is stable, so ties keep their file order.
pub fn sort_by_urgency(dataset: &mut Dataset) {
    dataset
        .records
        .sort_by(|a, b| compare_remaining(a.days_remaining, b.days_remaining));
}

fn compare_remaining(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
