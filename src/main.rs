use anyhow::Result;
use enroltrends::{chart, clean, config::Config, load, shape, summarise};
use std::{env, fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) workbook path & config ───────────────────────────────────
    let mut args = env::args().skip(1);
    let workbook = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/enrolments.xlsx"));
    let config = match args.next() {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    fs::create_dir_all(&config.out_dir)?;

    // ─── 3) load the two sheet views ─────────────────────────────────
    let (headers, data) = load::load_views(&workbook, &config.layout)?;

    // ─── 4) synthesize headers & unpivot ─────────────────────────────
    let names = shape::composite_names(&headers, &config.layout, data.width())?;
    let tall = shape::unpivot(&data, &names, &config.layout)?;
    info!(columns = names.len(), records = tall.len(), "unpivoted");

    // ─── 5) clean & filter ───────────────────────────────────────────
    let filtered = clean::filter_records(&tall, &config.filters);
    let humanities = clean::humanities_subset(&filtered, &config.filters);
    info!(
        filtered = filtered.len(),
        humanities = humanities.len(),
        "filtered to degree-level totals"
    );

    // ─── 6) summarise & render ───────────────────────────────────────
    let totals = summarise::yearly_totals(&humanities);
    let trend_path = config.out_dir.join("trend.png");
    chart::render_trend(&totals, &trend_path)?;
    chart::write_sidecar(&totals, &trend_path)?;

    let deltas = summarise::subject_deltas(&humanities, &config.views);
    let bars = summarise::curated_subset(&deltas, &config.views);
    let delta_path = config.out_dir.join("gains_losses.png");
    chart::render_deltas(&bars, &config.views, &delta_path)?;
    chart::write_sidecar(&deltas, &delta_path)?;

    let bands = summarise::proportion_bands(&filtered, &config.filters);
    let proportion_path = config.out_dir.join("proportion.png");
    chart::render_proportions(&bands, &proportion_path)?;
    chart::write_sidecar(&bands, &proportion_path)?;

    info!(out_dir = %config.out_dir.display(), "done");
    Ok(())
}
