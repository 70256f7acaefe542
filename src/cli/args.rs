use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "air-quality-dashboard")]
#[command(about = "Prepare an air-quality dataset and render the pollution dashboard charts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file (TOML, JSON or YAML)"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress spinners")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare the dataset and write the dashboard charts as JSON figures
    Render {
        #[arg(short, long, help = "Input CSV file [default: from config]")]
        data: Option<PathBuf>,

        #[arg(
            short,
            long,
            help = "Chart output directory [default: {output_dir}/dashboard-{YYMMDD}]"
        )]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "First date to include (YYYY-MM-DD)")]
        start: Option<NaiveDate>,

        #[arg(long, help = "Last date to include (YYYY-MM-DD)")]
        end: Option<NaiveDate>,

        #[arg(long, default_value = "false", help = "Write single-line JSON")]
        compact: bool,
    },

    /// Print dataset statistics and the chart aggregates
    Summary {
        #[arg(short, long, help = "Input CSV file [default: from config]")]
        data: Option<PathBuf>,
    },

    /// Load and prepare the dataset without rendering
    Validate {
        #[arg(short, long, help = "Input CSV file [default: from config]")]
        data: Option<PathBuf>,
    },
}
