//! Sentence interpretation commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gastos_core::categorize::InferenceSource;
use gastos_core::{
    import_batch, infer_category_with_trace, CandidateTransaction, Database, Extraction,
    GastosConfig, ImportOutcome, TransactionExtractor, TransactionType,
};

use super::{format_brl, truncate};

pub async fn cmd_parse(
    extractor: &TransactionExtractor,
    text: &str,
    reference: NaiveDate,
    json: bool,
) -> Result<()> {
    let extraction = extractor.extract(text, reference).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    print_extraction(&extraction);
    Ok(())
}

pub async fn cmd_add(
    db: &Database,
    config: &GastosConfig,
    extractor: &TransactionExtractor,
    text: &str,
    owner: &str,
    reference: NaiveDate,
) -> Result<()> {
    let extraction = extractor.extract(text, reference).await?;
    print_extraction(&extraction);

    let report = import_batch(db, &extraction.candidates, owner, config, reference)
        .await
        .context("Failed to store transactions")?;

    println!();
    match report.outcome() {
        ImportOutcome::Completed => {
            println!("✅ Stored {} transaction(s) for {}", report.inserted, owner)
        }
        ImportOutcome::NothingToImport => {
            println!("⚠️  Nothing stored: no amount found in \"{}\"", text)
        }
        ImportOutcome::PartialFailure { failed_batches } => {
            anyhow::bail!(
                "Stored {} transaction(s), {} batch(es) failed",
                report.inserted,
                failed_batches
            )
        }
    }

    Ok(())
}

pub fn cmd_categorize(
    config: &GastosConfig,
    description: &str,
    amount: f64,
    transaction_type: &str,
) -> Result<()> {
    let transaction_type: TransactionType = transaction_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let inference =
        infer_category_with_trace(description, amount, transaction_type, &config.heuristic);

    let reason = match inference.source {
        InferenceSource::Name => "description names the category",
        InferenceSource::Keyword => "keyword match",
        InferenceSource::Synonym => "brand or slang synonym",
        InferenceSource::Heuristic => "amount heuristic",
        InferenceSource::Default => "no signal, default category",
    };

    println!(
        "{} → {} ({})",
        description,
        inference.category.display_name(),
        reason
    );
    Ok(())
}

fn print_extraction(extraction: &Extraction) {
    println!();
    println!(
        "🧾 {} candidate(s) via {:?}",
        extraction.candidates.len(),
        extraction.source
    );
    if let Some(reason) = &extraction.fallback_reason {
        println!("   ↳ {}", reason);
    }
    println!("   ─────────────────────────────────────────────────────────────");

    for candidate in &extraction.candidates {
        print_candidate(candidate);
    }
}

fn print_candidate(candidate: &CandidateTransaction) {
    let amount_str = match candidate.transaction_type {
        TransactionType::Expense => format!("\x1b[31m-{}\x1b[0m", format_brl(candidate.amount)),
        TransactionType::Income => format!("\x1b[32m+{}\x1b[0m", format_brl(candidate.amount)),
    };
    let category = candidate
        .category()
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|| candidate.category.clone());

    println!(
        "   {} │ {:>14} │ {:<14} │ {}",
        candidate.date,
        amount_str,
        category,
        truncate(&candidate.description, 35)
    );
    if let Some(goal) = &candidate.saving_goal {
        println!("   {:>10} ↳ saving towards {}", "", goal);
    }
}
