use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tablestat")]
#[command(about = "Show the latest collected statistics of a tracked table")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve and display the latest statistics of one table
    Show(ShowArgs),

    /// List the registered statistic kinds and their tracking tables
    Kinds,
}

#[derive(Args, Default)]
pub struct GlobalArgs {
    /// Tracking database written by the collector
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Upper bound for resolving all kinds, e.g. "5s" or "250ms"
    #[arg(long, global = true)]
    pub timeout: Option<String>,

    /// Log resolution details to stderr
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Server the table lives on
    pub server: String,

    /// Database (schema) name
    pub database: String,

    /// Table name
    pub table: String,

    /// Output as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Only consider records from each kind's last collection run
    #[arg(long, default_value_t = false)]
    pub last_run: bool,
}
