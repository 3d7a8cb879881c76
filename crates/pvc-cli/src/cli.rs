use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pvc",
    about = "Prompt version control: compare prompt texts and plan releases",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show a word-level diff between two prompt files
    Compare(CompareArgs),
    /// Print the version the next promotion would allocate
    NextVersion(NextVersionArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct CompareArgs {
    /// File holding the old prompt text
    pub old: PathBuf,
    /// File holding the new prompt text
    pub new: PathBuf,
    /// Override the context expansion threshold
    #[arg(long)]
    pub context: Option<usize>,
}

#[derive(Args)]
pub struct NextVersionArgs {
    /// Labels already attached to the prompt's commits
    pub labels: Vec<String>,
}
