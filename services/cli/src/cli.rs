use std::path::PathBuf;

use b2g_match::error::AppError;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::commands;

#[derive(Parser, Debug)]
#[command(
    name = "b2g-match",
    about = "Score company compatibility and rank B2G sales leads from the command line",
    version
)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,
    #[command(subcommand)]
    command: Command,
}

/// Data sources shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Registry CSV export used for CNPJ lookups and lead candidates
    #[arg(long, global = true)]
    pub(crate) registry: Option<PathBuf>,
    /// Sector complementarity table (CSV)
    #[arg(long, global = true)]
    pub(crate) complementarity: Option<PathBuf>,
    /// Extra weight profiles (JSON) registered on top of the built-in ones
    #[arg(long, global = true)]
    pub(crate) profiles: Option<PathBuf>,
    /// Reference date for company age (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub(crate) pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered weight profiles
    Profiles,
    /// Score one company against one counterpart
    Score(ScoreArgs),
    /// Score one pair under every registered weight profile
    Compare(CompareArgs),
    /// Score many companies against one counterpart
    Batch(BatchArgs),
    /// Rank registry companies as leads for a subject company
    Rank(RankArgs),
    /// Rank opportunities for a subject company
    Opportunities(OpportunitiesArgs),
}

/// Either a registry CNPJ or a JSON profile file.
#[derive(Args, Debug, Default)]
#[group(required = true, multiple = false)]
pub(crate) struct SubjectArgs {
    /// Subject CNPJ, resolved through the registry
    #[arg(long)]
    pub(crate) cnpj: Option<String>,
    /// Subject profile as a JSON file
    #[arg(long)]
    pub(crate) subject: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[command(flatten)]
    pub(crate) subject: SubjectArgs,
    /// Counterpart (tender or project) as a JSON file
    #[arg(long)]
    pub(crate) counterpart: PathBuf,
    /// Weight profile name or alias
    #[arg(long)]
    pub(crate) profile: Option<String>,
    /// Print only the headline score, tier and alerts
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    #[command(flatten)]
    pub(crate) subject: SubjectArgs,
    /// Counterpart (tender or project) as a JSON file
    #[arg(long)]
    pub(crate) counterpart: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// JSON array of company profiles
    #[arg(long)]
    pub(crate) companies: PathBuf,
    /// Counterpart (tender or project) as a JSON file
    #[arg(long)]
    pub(crate) counterpart: PathBuf,
    #[arg(long)]
    pub(crate) profile: Option<String>,
    /// Keep only the best N results
    #[arg(long)]
    pub(crate) top: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    #[command(flatten)]
    pub(crate) subject: SubjectArgs,
    /// Candidate filter as a JSON file; flags below override its fields
    #[arg(long)]
    pub(crate) filter: Option<PathBuf>,
    /// State code (UF)
    #[arg(long)]
    pub(crate) uf: Option<String>,
    #[arg(long)]
    pub(crate) municipio: Option<String>,
    /// Size category, e.g. ME, EPP, DEMAIS
    #[arg(long)]
    pub(crate) porte: Option<String>,
    /// Registry status, or "todas" for any status
    #[arg(long)]
    pub(crate) situacao: Option<String>,
    /// Age bracket: 0-2, 2-5, 5-10 or 10+
    #[arg(long)]
    pub(crate) idade: Option<String>,
    #[arg(long)]
    pub(crate) capital_min: Option<f64>,
    #[arg(long)]
    pub(crate) capital_max: Option<f64>,
    #[arg(long)]
    pub(crate) page: Option<usize>,
    #[arg(long)]
    pub(crate) page_size: Option<usize>,
    /// Ceiling on candidates scored for this request
    #[arg(long)]
    pub(crate) max_processing: Option<usize>,
    #[arg(long)]
    pub(crate) profile: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct OpportunitiesArgs {
    #[command(flatten)]
    pub(crate) subject: SubjectArgs,
    /// JSON array of opportunities
    #[arg(long)]
    pub(crate) opportunities: PathBuf,
    /// Keep only the best N opportunities
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    #[arg(long)]
    pub(crate) profile: Option<String>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let context = commands::Context::load(&cli.sources)?;

    match cli.command {
        Command::Profiles => commands::run_profiles(&context),
        Command::Score(args) => commands::run_score(&context, args),
        Command::Compare(args) => commands::run_compare(&context, args),
        Command::Batch(args) => commands::run_batch(&context, args),
        Command::Rank(args) => commands::run_rank(&context, args),
        Command::Opportunities(args) => commands::run_opportunities(&context, args),
    }
}
