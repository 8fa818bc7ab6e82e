use crate::record::{Dataset, MICRO_RED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CHART_TITLE: &str = "Comparación de PAP: Entregados vs Pendientes";
/// Width given to each cluster of two bars
pub const BAR_GROUP_WIDTH: u32 = 100;
pub const CHART_HEIGHT: u32 = 400;

/// Delivered vs. pending counts of one `Micro_Red`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub micro_red: String,
    /// Records with a collection date
    pub taken: i64,
    /// Records with a delivery date
    pub delivered: i64,
    /// `taken - delivered`; negative when results arrived without a
    /// recorded collection date
    pub pending: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PapStatus {
    Delivered,
    Pending,
}

impl PapStatus {
    pub fn label(self) -> &'static str {
        match self {
            PapStatus::Delivered => "PAP Entregados",
            PapStatus::Pending => "PAP Pendientes",
        }
    }
}

/// One bar of the chart: a (unit, status, count) triple
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartBar {
    pub micro_red: String,
    pub status: PapStatus,
    pub label: String,
    pub count: i64,
    pub tooltip: String,
}

/// Everything needed to draw the grouped bar chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub groups: Vec<GroupCounts>,
    pub bars: Vec<ChartBar>,
}

/// Count taken, delivered and pending samples per `Micro_Red`
///
/// Rows without a unit are left out and groups come back sorted by name.
/// Returns `None` when the dataset has no `Micro_Red` column at all.
pub fn aggregate(dataset: &Dataset) -> Option<Vec<GroupCounts>> {
    if !dataset.has_column(MICRO_RED) {
        return None;
    }

    let mut groups: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for record in &dataset.records {
        let Some(unit) = record.micro_red.as_deref() else {
            continue;
        };
        let entry = groups.entry(unit).or_insert((0, 0));
        if record.collection_date.is_some() {
            entry.0 += 1;
        }
        if record.delivery_date.is_some() {
            entry.1 += 1;
        }
    }

    Some(
        groups
            .into_iter()
            .map(|(unit, (taken, delivered))| GroupCounts {
                micro_red: unit.to_string(),
                taken,
                delivered,
                pending: taken - delivered,
            })
            .collect(),
    )
}

/// Reshape the counts into one bar per unit and status
///
/// All delivered bars come first, then all pending ones.
pub fn melt(groups: &[GroupCounts]) -> Vec<ChartBar> {
    [PapStatus::Delivered, PapStatus::Pending]
        .into_iter()
        .flat_map(|status| {
            groups.iter().map(move |g| {
                let count = match status {
                    PapStatus::Delivered => g.delivered,
                    PapStatus::Pending => g.pending,
                };
                ChartBar {
                    micro_red: g.micro_red.clone(),
                    status,
                    label: status.label().to_string(),
                    count,
                    tooltip: format!(
                        "Micro_Red: {}, Estado: {}, Cantidad: {}",
                        g.micro_red,
                        status.label(),
                        count
                    ),
                }
            })
        })
        .collect()
}

/// Build the chart for the edited snapshot, or `None` without `Micro_Red`.
pub fn chart_data(dataset: &Dataset) -> Option<ChartData> {
    let groups = aggregate(dataset)?;
    let bars = melt(&groups);
    Some(ChartData {
        title: CHART_TITLE.to_string(),
        width: BAR_GROUP_WIDTH * groups.len().max(1) as u32,
        height: CHART_HEIGHT,
        groups,
        bars,
    })
}
