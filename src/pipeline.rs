use crate::aggregate::{ChartData, chart_data};
use crate::deadline::{DeadlinePolicy, apply_deadlines, sort_by_urgency};
use crate::editor::{Edit, apply_edits};
use crate::error::Result;
use crate::filter::{MISSING_MICRO_RED, filter_by_micro_red, micro_red_options};
use crate::loader::{Upload, load_upload};
use crate::presenter::{StyledTable, present};
use crate::record::{Dataset, MICRO_RED};
use crate::schema::validate;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

/// Everything a single interaction needs
///
/// The host keeps this between interactions and sends it again in full;
/// nothing survives inside the pipeline from one run to the next.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub upload: Upload,
    /// Calendar day the countdown is measured against
    pub today: NaiveDate,
    /// Chosen `Micro_Red` values; empty means all
    pub selection: Vec<String>,
    pub edits: Vec<Edit>,
    /// Set when the user asked for the chart
    pub chart: bool,
    pub policy: DeadlinePolicy,
}

impl RunRequest {
    pub fn new(upload: Upload, today: NaiveDate) -> Self {
        Self {
            upload,
            today,
            selection: Vec::new(),
            edits: Vec::new(),
            chart: false,
            policy: DeadlinePolicy::default(),
        }
    }
}

/// What one run hands back to the page
#[derive(Clone, Debug, Serialize)]
pub struct RunOutcome {
    pub today: NaiveDate,
    /// Whole file, sorted by urgency and coloured
    pub table: StyledTable,
    pub filter_options: Vec<String>,
    pub selection: Vec<String>,
    /// Filtered rows with the grid edits applied
    pub editor: StyledTable,
    pub chart: Option<ChartData>,
    pub warnings: Vec<String>,
    /// Positions in `edits` that could not be applied and were skipped
    pub rejected_edits: Vec<usize>,
    #[serde(skip)]
    pub edited: Dataset,
}

/// Today's date on the host clock, with the time of day dropped.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Run the whole pipeline once
///
/// Load, validate, compute the countdown, sort, filter, apply the edits and,
/// when asked, aggregate for the chart. A parse or schema failure stops the
/// run and nothing partial is returned. A missing `Micro_Red` column or an
/// edit that cannot be applied only adds a warning.
pub fn process(request: &RunRequest) -> Result<RunOutcome> {
    let raw = load_upload(&request.upload)?;
    let mut dataset = validate(raw)?;

    apply_deadlines(&mut dataset, request.today, &request.policy);
    sort_by_urgency(&mut dataset);
    let table = present(&dataset, &request.policy);

    let mut warnings = Vec::new();
    let filter_options = if dataset.has_column(MICRO_RED) {
        micro_red_options(&dataset)
    } else {
        warn!("no {} column, filtering and chart disabled", MICRO_RED);
        warnings.push(MISSING_MICRO_RED.to_string());
        Vec::new()
    };

    let filtered = filter_by_micro_red(&dataset, &request.selection);
    let edit_outcome = apply_edits(&filtered, &request.edits);
    let rejected_edits = edit_outcome.rejected_indices();
    warnings.extend(edit_outcome.rejected.iter().map(ToString::to_string));
    let edited = edit_outcome.snapshot;
    let editor = present(&edited, &request.policy);

    let chart = if request.chart {
        let chart = chart_data(&edited);
        if chart.is_none() && !warnings.iter().any(|w| w == MISSING_MICRO_RED) {
            warnings.push(MISSING_MICRO_RED.to_string());
        }
        chart
    } else {
        None
    };

    info!(
        "run for {}: {} rows, {} after filter, {} after edits, chart: {}",
        request.today,
        dataset.len(),
        filtered.len(),
        edited.len(),
        chart.is_some()
    );

    Ok(RunOutcome {
        today: request.today,
        table,
        filter_options,
        selection: request.selection.clone(),
        editor,
        chart,
        warnings,
        rejected_edits,
        edited,
    })
}
