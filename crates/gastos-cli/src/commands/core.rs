//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` / `reference_date` / `build_extractor` - Shared setup
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show configuration and backend status

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gastos_core::dates::today;
use gastos_core::{
    CompletionBackend, CompletionClient, Database, ExtractorConfig, GastosConfig,
    TransactionExtractor,
};

pub fn open_db(db_path: &Path) -> Result<Database> {
    Database::new(&db_path.to_string_lossy()).context("Failed to open database")
}

pub fn load_config(path: Option<&Path>) -> Result<GastosConfig> {
    GastosConfig::load(path).context("Failed to load configuration")
}

/// Parse `--date`, defaulting to today
pub fn reference_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date '{}' (use YYYY-MM-DD)", s)),
        None => Ok(today()),
    }
}

/// Extractor with the completion backend from the environment, if any
pub fn build_extractor(config: &GastosConfig, rules_only: bool) -> TransactionExtractor {
    let client = if rules_only {
        None
    } else {
        CompletionClient::from_env().map(|c| c.with_timeout(config.completion.timeout))
    };
    TransactionExtractor::new(client, ExtractorConfig::from(config))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Try a sentence: gastos parse \"gastei 50 reais no mercado ontem\"");
    println!("  2. Store it: gastos add \"gastei 50 reais no mercado ontem\" --owner you");
    println!("  3. Import a statement: gastos import --file extrato.csv --owner you");

    Ok(())
}

pub async fn cmd_status(db_path: &Path, config: &GastosConfig) -> Result<()> {
    println!();
    println!("📊 Gastos Status");
    println!("   ─────────────────────────────────────────────");
    println!("   Database:    {}", db_path.display());
    println!(
        "   Config:      {}",
        config
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in defaults".to_string())
    );
    println!("   Batch size:  {}", config.import.batch_size);
    println!(
        "   Completion:  timeout {}s, {}",
        config.completion.timeout.as_secs(),
        if config.completion.strict {
            "strict (no rule fallback on outages)"
        } else {
            "falls back to rules"
        }
    );

    match CompletionClient::from_env() {
        Some(client) => {
            let info = client.info();
            let healthy = client
                .with_timeout(config.completion.timeout)
                .health_check()
                .await;
            println!(
                "   Backend:     {} ({}) at {} {}",
                info.kind,
                info.model,
                info.host,
                if healthy { "✓ reachable" } else { "✗ unreachable" }
            );
        }
        None => {
            println!("   Backend:     not configured (rules only)");
            println!("   💡 Tip: Set OLLAMA_HOST to enable model extraction");
        }
    }

    Ok(())
}
