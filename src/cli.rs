use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bidscore",
    version,
    about = "Joint-venture eligibility scoring for construction procurement bids"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one set of financial inputs against an agency's rules
    Evaluate(EvaluateCommand),
    /// Score candidate records and report single-bid eligibility
    Check(CheckCommand),
    /// Build a ranked partner listing from candidate records
    Filter(FilterCommand),
    /// Show the merged formula document
    Formulas(FormulasCommand),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

#[derive(Args)]
pub struct WorkspaceArgs {
    /// Directory holding bidscore.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct BidArgs {
    /// Agency id; falls back to evaluation.default_agency
    #[arg(long)]
    pub agency: Option<String>,
    /// Bid amount used to select the rule tier
    #[arg(long, allow_negative_numbers = true)]
    pub amount: Option<f64>,
    /// Trade code for industry-average normalization
    #[arg(long)]
    pub trade: Option<String>,
    /// Ignore formula overrides
    #[arg(long)]
    pub defaults_only: bool,
    /// Evaluation date for business age (YYYY-MM-DD); today when absent
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
    #[arg(long)]
    pub estimated_amount: Option<f64>,
    #[arg(long)]
    pub file_type: Option<String>,
}

#[derive(Args)]
pub struct EligibilityArgs {
    /// Minimum capacity rating for a single bid
    #[arg(long)]
    pub entry_amount: Option<f64>,
    /// Minimum five-year performance for a single bid
    #[arg(long)]
    pub base_amount: Option<f64>,
    /// Allowed regions, comma separated
    #[arg(long = "region", value_delimiter = ',')]
    pub regions: Vec<String>,
    /// Performance bar for agencies that take one from the caller
    #[arg(long)]
    pub perf_target: Option<f64>,
}

#[derive(Args)]
pub struct EvaluateCommand {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    #[command(flatten)]
    pub bid: BidArgs,
    #[arg(long, allow_negative_numbers = true)]
    pub debt_ratio: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub current_ratio: Option<f64>,
    /// Years, a start date, or text such as "5년 3개월"
    #[arg(long)]
    pub biz_years: Option<String>,
    #[arg(long)]
    pub quality_eval: Option<f64>,
    #[arg(long)]
    pub perf5y: Option<f64>,
    #[arg(long)]
    pub base_amount: Option<f64>,
    #[arg(long)]
    pub credit_grade: Option<String>,
}

#[derive(Args)]
pub struct CheckCommand {
    /// Candidate JSON file or directory of JSON files
    pub candidates: PathBuf,
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    #[command(flatten)]
    pub bid: BidArgs,
    #[command(flatten)]
    pub eligibility: EligibilityArgs,
}

#[derive(Args)]
pub struct FilterCommand {
    /// Candidate JSON file or directory of JSON files
    pub candidates: PathBuf,
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    #[command(flatten)]
    pub bid: BidArgs,
    #[command(flatten)]
    pub eligibility: EligibilityArgs,
    /// Keep companies that could bid alone
    #[arg(long)]
    pub include_single_bid_eligible: bool,
    /// Drop candidates whose credit grade ranks below this
    #[arg(long, conflicts_with = "baseline_grade")]
    pub min_credit_grade: Option<String>,
    /// Use the tier's baseline credit grade as the minimum
    #[arg(long)]
    pub baseline_grade: bool,
    /// Extra registration numbers or names to drop
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,
}

#[derive(Args)]
pub struct FormulasCommand {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Ignore formula overrides
    #[arg(long)]
    pub defaults_only: bool,
}
