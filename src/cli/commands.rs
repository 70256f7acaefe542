use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::info;

use crate::analyzers::AirQualityAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{DateRange, PreparedDataset};
use crate::utils::filename::generate_default_output_dir;
use crate::utils::progress::ProgressReporter;
use crate::writers::{render_text, ChartWriter};

pub fn run(cli: Cli) -> Result<()> {
    let config = DashboardConfig::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Render {
            data,
            output_dir,
            start,
            end,
            compact,
        } => {
            let dataset = load_dataset(&config, data, quiet)?;
            let range = requested_range(start, end)?;

            let analyzer = AirQualityAnalyzer::new();
            let dashboard = analyzer.analyze(&dataset, range)?;

            let output_dir =
                output_dir.unwrap_or_else(|| generate_default_output_dir(&config.output_dir));
            println!("Output directory: {}", output_dir.display());

            let progress = ProgressReporter::new_spinner("Writing charts...", quiet);
            let written = ChartWriter::new(&output_dir)
                .with_pretty(!compact)
                .write_dashboard(&dashboard)?;
            progress.finish_with_message(&format!("Wrote {} files", written.len()));

            println!("\n{}", render_text(&dashboard));
            for path in &written {
                println!("  {}", path.display());
            }
        }

        Commands::Summary { data } => {
            let dataset = load_dataset(&config, data, quiet)?;

            let analyzer = AirQualityAnalyzer::new();
            let statistics = analyzer.summarize(&dataset)?;
            println!("\n{}", statistics.detailed_summary());

            let dashboard = analyzer.analyze(&dataset, None)?;
            println!("\n{}", render_text(&dashboard));
        }

        Commands::Validate { data } => {
            let dataset = load_dataset(&config, data, quiet)?;

            println!("\n{}", dataset.report().summary());
            println!("Columns: {}", dataset.columns().join(", "));
            println!("Temperature bins: {}", dataset.temp_bins().labels().join(", "));
            println!("Wind speed bins: {}", dataset.wind_bins().labels().join(", "));
            println!("Dataset is ready for rendering");
        }
    }

    Ok(())
}

fn load_dataset(
    config: &DashboardConfig,
    data: Option<PathBuf>,
    quiet: bool,
) -> Result<PreparedDataset> {
    let path = data.unwrap_or_else(|| config.data_path.clone());

    let progress = ProgressReporter::new_spinner(&format!("Reading {}...", path.display()), quiet);
    let raw = config.reader().read(&path)?;

    progress.set_message("Preparing records...");
    let dataset = config.preparer().prepare(&raw)?;
    progress.finish_with_message(&format!("Prepared {} records", dataset.len()));

    info!(
        path = %path.display(),
        records = dataset.len(),
        dropped = dataset.report().dropped_incomplete,
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Open-ended sides fall back to the widest dates; the analyzer clamps to the data
fn requested_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<DateRange>> {
    if start.is_none() && end.is_none() {
        return Ok(None);
    }

    let range = DateRange::new(
        start.unwrap_or(NaiveDate::MIN),
        end.unwrap_or(NaiveDate::MAX),
    )?;
    Ok(Some(range))
}
