// src/chart/mod.rs
use anyhow::{bail, Context, Result};
use plotters::prelude::*;
use serde::Serialize;
use std::{fs::File, io::BufWriter, path::Path};
use tracing::info;

use crate::config::ViewRules;
use crate::summarise::{SubjectDelta, YearBands, YearlyTotal};

const CHART_SIZE: (u32, u32) = (900, 600);

const HUMANITIES_COLOR: RGBColor = RGBColor(192, 57, 43);
const BROAD_FIELD_COLOR: RGBColor = RGBColor(41, 128, 185);
const EVERYONE_ELSE_COLOR: RGBColor = RGBColor(189, 189, 189);
const GAIN_COLOR: RGBColor = RGBColor(46, 139, 87);

/// Line chart of total humanities completions per year.
pub fn render_trend(totals: &[YearlyTotal], path: &Path) -> Result<()> {
    if totals.is_empty() {
        bail!("trend view is empty, nothing to chart");
    }
    let years = totals.first().map(|t| t.year).unwrap_or(0)..=totals.last().map(|t| t.year).unwrap_or(0);
    let top = totals.iter().map(|t| t.students).max().unwrap_or(0) as f64 * 1.1;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Humanities completions by year", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(
            *years.start() as i32..*years.end() as i32,
            0f64..top.max(1.0),
        )?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Students")
        .x_labels(totals.len())
        .x_label_formatter(&|y| y.to_string())
        .draw()?;

    chart.draw_series(LineSeries::new(
        totals.iter().map(|t| (t.year as i32, t.students as f64)),
        HUMANITIES_COLOR.stroke_width(3),
    ))?;
    chart.draw_series(
        totals
            .iter()
            .map(|t| Circle::new((t.year as i32, t.students as f64), 4, HUMANITIES_COLOR.filled())),
    )?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    info!(chart = %path.display(), points = totals.len(), "rendered trend chart");
    Ok(())
}

/// Horizontal diverging bar chart of per-subject gains and losses between the
/// two compare years. Expects the deltas in the order they should be stacked,
/// bottom to top.
pub fn render_deltas(deltas: &[SubjectDelta], views: &ViewRules, path: &Path) -> Result<()> {
    if deltas.is_empty() {
        bail!("delta view is empty, nothing to chart");
    }
    let min_gap = deltas.iter().map(|d| d.gap).min().unwrap_or(0).min(0) as f64;
    let max_gap = deltas.iter().map(|d| d.gap).max().unwrap_or(0).max(0) as f64;
    let pad = ((max_gap - min_gap) * 0.08).max(1.0);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Change in completions, {}–{}", views.base_year, views.compare_year),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(220)
        .build_cartesian_2d(
            min_gap - pad..max_gap + pad,
            -0.5f64..deltas.len() as f64 - 0.5,
        )?;

    let subjects: Vec<String> = deltas.iter().map(|d| d.subject.clone()).collect();
    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Students")
        .y_labels(deltas.len())
        .y_label_formatter(&move |y| bar_label(&subjects, *y))
        .draw()?;

    // bars centered on the integer ticks their labels sit at
    chart.draw_series(deltas.iter().enumerate().map(|(i, d)| {
        let color = if d.gap < 0 { HUMANITIES_COLOR } else { GAIN_COLOR };
        Rectangle::new(
            [(0.0, i as f64 - 0.35), (d.gap as f64, i as f64 + 0.35)],
            color.filled(),
        )
    }))?;
    // zero axis
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, -0.5), (0.0, deltas.len() as f64 - 0.5)],
        BLACK.stroke_width(1),
    )))?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    info!(chart = %path.display(), bars = deltas.len(), "rendered gains/losses chart");
    Ok(())
}

/// Stacked area chart of the three percentage bands. Stacking is done by
/// painting cumulative areas back to front: everyone-else fills to 100, the
/// broad field paints over it up to humanities + other, humanities on top.
pub fn render_proportions(bands: &[YearBands], path: &Path) -> Result<()> {
    if bands.is_empty() {
        bail!("proportion view is empty, nothing to chart");
    }
    let first_year = bands.first().map(|b| b.year).unwrap_or(0) as i32;
    let last_year = bands.last().map(|b| b.year).unwrap_or(0) as i32;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Share of all completions", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(first_year..last_year, 0f64..100f64)?;
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Per cent of all students")
        .x_labels(bands.len())
        .x_label_formatter(&|y| y.to_string())
        .draw()?;

    let cumulative = |f: fn(&YearBands) -> f64| {
        bands
            .iter()
            .map(move |b| (b.year as i32, f(b)))
            .collect::<Vec<_>>()
    };
    let everyone = cumulative(|_| 100.0);
    let broad = cumulative(|b| b.humanities_pct + b.other_society_culture_pct);
    let humanities = cumulative(|b| b.humanities_pct);

    chart
        .draw_series(AreaSeries::new(everyone, 0.0, EVERYONE_ELSE_COLOR.mix(0.9)))?
        .label("All other fields")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], EVERYONE_ELSE_COLOR.filled()));
    chart
        .draw_series(AreaSeries::new(broad, 0.0, BROAD_FIELD_COLOR.mix(0.9)))?
        .label("Rest of Society and Culture")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BROAD_FIELD_COLOR.filled()));
    chart
        .draw_series(AreaSeries::new(humanities, 0.0, HUMANITIES_COLOR.mix(0.9)))?
        .label("Humanities")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], HUMANITIES_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present().with_context(|| format!("writing {}", path.display()))?;
    info!(chart = %path.display(), years = bands.len(), "rendered proportion chart");
    Ok(())
}

/// Label for one y tick of the bar chart: the subject whose bar is centered
/// on that integer tick, nothing for ticks that fall between bars.
fn bar_label(subjects: &[String], y: f64) -> String {
    let nearest = y.round();
    if (y - nearest).abs() > 0.01 || nearest < 0.0 {
        return String::new();
    }
    subjects.get(nearest as usize).cloned().unwrap_or_default()
}

/// Writes the numbers behind a chart as pretty JSON next to the image, so the
/// figures are checkable without squinting at pixels.
pub fn write_sidecar<T: Serialize>(view: &T, chart_path: &Path) -> Result<()> {
    let path = chart_path.with_extension("json");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), view)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(sidecar = %path.display(), "wrote chart data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn totals() -> Vec<YearlyTotal> {
        (2008u16..=2017)
            .map(|year| YearlyTotal { year, students: 1000 + (year as u64 - 2008) * 37 })
            .collect()
    }

    fn deltas() -> Vec<SubjectDelta> {
        vec![
            SubjectDelta { subject: "History".into(), base: 100, last: 80, gap: -20, percent_change: -20.0 },
            SubjectDelta { subject: "Sociology".into(), base: 50, last: 90, gap: 40, percent_change: 80.0 },
        ]
    }

    fn bands() -> Vec<YearBands> {
        vec![
            YearBands { year: 2008, humanities_pct: 12.0, other_society_culture_pct: 18.0, everyone_else_pct: 70.0 },
            YearBands { year: 2009, humanities_pct: 11.0, other_society_culture_pct: 18.5, everyone_else_pct: 70.5 },
        ]
    }

    #[test]
    fn sidecar_lands_next_to_the_chart_and_parses_back() {
        let dir = tempdir().unwrap();
        let chart_path = dir.path().join("trend.png");
        write_sidecar(&totals(), &chart_path).unwrap();

        let text = std::fs::read_to_string(dir.path().join("trend.json")).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 10);
        assert_eq!(parsed[0]["year"], 2008);
    }

    #[test]
    fn bar_labels_name_the_bar_centered_on_each_tick() {
        let subjects = vec!["History".to_string(), "Sociology".to_string()];
        assert_eq!(bar_label(&subjects, 0.0), "History");
        assert_eq!(bar_label(&subjects, 1.0), "Sociology");
        // ticks between bars, below the axis, or past the last bar stay blank
        assert_eq!(bar_label(&subjects, 0.5), "");
        assert_eq!(bar_label(&subjects, -0.5), "");
        assert_eq!(bar_label(&subjects, 2.0), "");
    }

    #[test]
    fn empty_views_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");
        assert!(render_trend(&[], &path).is_err());
        assert!(render_deltas(&[], &ViewRules::default(), &path).is_err());
        assert!(render_proportions(&[], &path).is_err());
    }

    /// Needs a system sans-serif font, which CI images often lack.
    #[test]
    #[ignore]
    fn renders_all_three_charts() {
        let dir = tempdir().unwrap();
        render_trend(&totals(), &dir.path().join("trend.png")).unwrap();
        render_deltas(&deltas(), &ViewRules::default(), &dir.path().join("gains_losses.png")).unwrap();
        render_proportions(&bands(), &dir.path().join("proportion.png")).unwrap();

        for name in ["trend.png", "gains_losses.png", "proportion.png"] {
            let meta = std::fs::metadata(dir.path().join(name)).unwrap();
            assert!(meta.len() > 0, "{name} is empty");
        }
    }
}
