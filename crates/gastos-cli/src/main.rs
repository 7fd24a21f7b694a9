//! Gastos CLI - Turn money talk into transactions
//!
//! Usage:
//!   gastos init                          Initialize database
//!   gastos parse "gastei 50 no mercado"  Show candidate transactions
//!   gastos add "..." --owner ana         Interpret and store
//!   gastos import --file CSV --owner ana Import statement rows

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Parse {
            text,
            date,
            json,
            rules_only,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let reference = commands::reference_date(date.as_deref())?;
            let extractor = commands::build_extractor(&config, rules_only);
            commands::cmd_parse(&extractor, &text, reference, json).await
        }
        Commands::Add {
            text,
            owner,
            date,
            rules_only,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let reference = commands::reference_date(date.as_deref())?;
            let extractor = commands::build_extractor(&config, rules_only);
            let db = commands::open_db(&cli.db)?;
            commands::cmd_add(&db, &config, &extractor, &text, &owner, reference).await
        }
        Commands::Import { file, owner, date } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let reference = commands::reference_date(date.as_deref())?;
            let db = commands::open_db(&cli.db)?;
            commands::cmd_import(&db, &config, &file, &owner, reference).await
        }
        Commands::Categorize {
            description,
            amount,
            transaction_type,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_categorize(&config, &description, amount, &transaction_type)
        }
        Commands::Transactions { owner, limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, &owner, limit)
        }
        Commands::Status => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_status(&cli.db, &config).await
        }
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
    }
}
