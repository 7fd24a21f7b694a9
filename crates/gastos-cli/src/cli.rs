//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Gastos - Turn money talk into transactions
#[derive(Parser)]
#[command(name = "gastos")]
#[command(about = "Interpret Portuguese money sentences and bank statements as transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "gastos.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the data directory override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Interpret a sentence and print the candidate transactions
    Parse {
        /// Sentence, e.g. "gastei 50 reais no mercado ontem"
        text: String,

        /// Reference date for relative expressions (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Print the extraction as JSON
        #[arg(long)]
        json: bool,

        /// Skip the completion service and use the rule-based extractor
        #[arg(long)]
        rules_only: bool,
    },

    /// Interpret a sentence and store every candidate it yields
    Add {
        /// Sentence, e.g. "recebi 2000 de salário"
        text: String,

        /// Owner of the stored transactions
        #[arg(short, long)]
        owner: String,

        /// Reference date for relative expressions (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Skip the completion service and use the rule-based extractor
        #[arg(long)]
        rules_only: bool,
    },

    /// Import statement rows from a CSV file
    Import {
        /// CSV file with date, description and amount columns
        #[arg(short, long)]
        file: PathBuf,

        /// Owner of the imported transactions
        #[arg(short, long)]
        owner: String,

        /// Reference date for unparseable row dates (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show which category a description would get, and why
    Categorize {
        /// Transaction description
        description: String,

        /// Amount used by the amount heuristic
        #[arg(short, long, default_value = "0")]
        amount: f64,

        /// Transaction type: expense or income
        #[arg(short = 't', long = "type", default_value = "expense")]
        transaction_type: String,
    },

    /// List stored transactions
    Transactions {
        /// Owner whose transactions to list
        #[arg(short, long)]
        owner: String,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show configuration and completion service status
    Status,

    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., extract_transaction)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
