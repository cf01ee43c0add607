use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "gradebook")]
#[command(about = "Command-line client for the academic records API")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "API base URL, overrides the config file")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "GRADEBOOK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Exchange credentials for a user object
    Login {
        #[arg(long)]
        username: String,

        #[arg(long, env = "GRADEBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Compute the final grade from three period scores
    Average {
        #[arg(allow_hyphen_values = true)]
        prelim: String,

        #[arg(allow_hyphen_values = true)]
        midterm: String,

        #[arg(value_name = "FINAL", allow_hyphen_values = true)]
        finals: String,

        #[arg(long, help = "Average only the periods that have a score")]
        exclude_missing: bool,

        #[arg(long, help = "Fail when any score is missing or non-numeric")]
        strict: bool,
    },

    /// Export a grade sheet (CSV: student,prelim,midterm,final) and print it
    Print {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        title: Option<String>,
    },
}
