use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "phasehull - classify scored compositions as stable or metastable against an exact convex hull.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify every candidate as stable, unstable or not a hull candidate.
    Classify(ClassifyArgs),
    /// List the points of the phase hull with their labels.
    Vertices(HullArgs),
}

/// Inputs shared by every command that builds a hull.
#[derive(Args, Debug, Clone)]
pub struct HullArgs {
    /// Path to the candidates CSV file (columns: label, formula and a score column).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the hull configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the endpoint formulas from the config file, e.g. `Li2O,CoO`.
    #[arg(short, long, value_delimiter = ',', value_name = "FORMULA")]
    pub endpoints: Option<Vec<String>>,

    /// Override the name of the CSV column holding the score.
    #[arg(short = 's', long, value_name = "NAME")]
    pub score_column: Option<String>,

    /// Keep points that only support vertical facets, overriding the config file.
    #[arg(long)]
    pub no_vertical_filter: bool,
}

/// Arguments for the `classify` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub hull: HullArgs,

    /// Write the classification as CSV to this path instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
