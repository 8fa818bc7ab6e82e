#![cfg(feature = "web")]

use crate::aggregate::{ChartData, PapStatus};
use plotters::prelude::*;

/// Bar colour per status, matching the two-colour legend on the page
pub const DELIVERED_COLOR: RGBColor = RGBColor(76, 120, 168);
pub const PENDING_COLOR: RGBColor = RGBColor(245, 133, 24);

// Room for the axes and legend around the bar groups
const AXIS_AREA_WIDTH: u32 = 120;
const MIN_CANVAS_WIDTH: u32 = 480;

pub fn status_color(status: PapStatus) -> RGBColor {
    match status {
        PapStatus::Delivered => DELIVERED_COLOR,
        PapStatus::Pending => PENDING_COLOR,
    }
}

/// Renders the grouped bar chart as an SVG document
///
/// Each `Micro_Red` gets one segment of the x axis: the delivered bar fills
/// its left half and the pending bar its right half. The y axis starts at
/// zero unless a group has a negative pending count.
///
/// # Arguments
/// * `chart` - Counts and fixed view settings from [`crate::aggregate::chart_data`]
///
/// # Returns
/// * A Result containing the SVG text or a drawing error
pub fn render_svg(chart: &ChartData) -> Result<String, Box<dyn std::error::Error>> {
    let units: Vec<&str> = chart.groups.iter().map(|g| g.micro_red.as_str()).collect();
    let slots = (units.len() as i32).max(1);

    let max_y = chart
        .groups
        .iter()
        .flat_map(|g| [g.delivered, g.pending])
        .max()
        .unwrap_or(0)
        .max(1);
    let min_y = chart
        .groups
        .iter()
        .map(|g| g.pending)
        .min()
        .unwrap_or(0)
        .min(0);

    let width = (chart.width + AXIS_AREA_WIDTH).max(MIN_CANVAS_WIDTH);
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, chart.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 18).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d((0..slots).into_segmented(), min_y..max_y + 1)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc("Micro_Red")
            .y_desc("Cantidad")
            .x_label_formatter(&|v: &SegmentValue<i32>| match v {
                SegmentValue::CenterOf(i) => units
                    .get(*i as usize)
                    .map(|u| u.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        ctx.draw_series(chart.groups.iter().enumerate().map(|(i, g)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0), (SegmentValue::CenterOf(i), g.delivered)],
                DELIVERED_COLOR.filled(),
            );
            bar.set_margin(0, 0, 6, 1);
            bar
        }))?
        .label(PapStatus::Delivered.label())
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], DELIVERED_COLOR.filled()));

        ctx.draw_series(chart.groups.iter().enumerate().map(|(i, g)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::CenterOf(i), 0), (SegmentValue::Exact(i + 1), g.pending)],
                PENDING_COLOR.filled(),
            );
            bar.set_margin(0, 0, 1, 6);
            bar
        }))?
        .label(PapStatus::Pending.label())
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PENDING_COLOR.filled()));

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(svg)
}
