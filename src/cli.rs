//! CLI argument parsing for the page generation workflow.
//!
//! The CLI only gathers inputs; every command hands off to `commands` so the
//! pipeline stays usable without it.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "faqgen",
    version,
    about = "Generate FAQ, product and comparison pages from two product records",
    after_help = "Commands:\n  run --product <file> --competitor <file> --out <dir>  Run the full pipeline\n  normalize --product <file>                          Print the normalized product\n  questions --product <file>                          Print the generated question list\n  context --product <file> --category <name>          Print the supporting facts for a category\n  validate --out <dir>                                Re-validate written pages\n\nExamples:\n  faqgen run --product glowboost.json --competitor radiantplus.json --out out/\n  faqgen run --product a.json --competitor b.json --out out/ --lm 'llm -m haiku'\n  faqgen validate --out out/ --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Normalize(NormalizeArgs),
    Questions(QuestionsArgs),
    Context(ContextArgs),
    Validate(ValidateArgs),
}

/// Settings shared by every command that may call a generator.
#[derive(Args, Debug, Clone, Default)]
pub struct GeneratorArgs {
    /// Config file (defaults to the per-user faqgen/config.json when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command used to answer questions; reads the prompt on stdin
    #[arg(long, value_name = "COMMAND")]
    pub lm: Option<String>,

    /// Ask the generator for extra question variants
    #[arg(long)]
    pub expand_questions: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Run the full pipeline and write every page")]
pub struct RunArgs {
    /// Raw record of the product the pages are about
    #[arg(long, value_name = "PATH")]
    pub product: PathBuf,

    /// Raw record of the product it is compared against
    #[arg(long, value_name = "PATH")]
    pub competitor: PathBuf,

    /// Output directory for pages, log and diagnostics
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    /// Command used for comparison verdicts (defaults to the answer backend)
    #[arg(long, value_name = "COMMAND")]
    pub comparison_lm: Option<String>,

    /// Minimum number of generated questions
    #[arg(long, value_name = "N")]
    pub min_questions: Option<usize>,

    /// Maximum number of question generation attempts
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Exit non-zero when any schema problem was recorded
    #[arg(long)]
    pub strict: bool,

    /// Print the diagnostics bundle as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Validate and print one normalized product")]
pub struct NormalizeArgs {
    #[arg(long, value_name = "PATH")]
    pub product: PathBuf,
}

#[derive(Parser, Debug)]
#[command(about = "Print the flattened question list for one product")]
pub struct QuestionsArgs {
    #[arg(long, value_name = "PATH")]
    pub product: PathBuf,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

#[derive(Parser, Debug)]
#[command(about = "Print the supporting facts used to answer one category")]
pub struct ContextArgs {
    #[arg(long, value_name = "PATH")]
    pub product: PathBuf,

    /// Question category, e.g. usage or safety
    #[arg(long, value_name = "NAME")]
    pub category: String,
}

#[derive(Parser, Debug)]
#[command(about = "Re-validate the pages in an output directory")]
pub struct ValidateArgs {
    /// Output directory written by `run`
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
