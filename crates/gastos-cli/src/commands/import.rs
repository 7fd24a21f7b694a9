//! Statement import command implementation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gastos_core::{
    import_statement_rows, read_statement_csv, Database, GastosConfig, ImportOutcome,
};

pub async fn cmd_import(
    db: &Database,
    config: &GastosConfig,
    file: &Path,
    owner: &str,
    reference: NaiveDate,
) -> Result<()> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let rows = read_statement_csv(BufReader::new(csv_file))
        .with_context(|| format!("Failed to read statement: {}", file.display()))?;

    println!("📥 Importing {} row(s) from {}...", rows.len(), file.display());

    let report = import_statement_rows(db, &rows, owner, config, reference).await?;

    println!("   Inserted: {}", report.inserted);
    if report.skipped > 0 {
        println!("   Skipped:  {} (no usable amount)", report.skipped);
    }

    match report.outcome() {
        ImportOutcome::Completed => println!("✅ Import complete"),
        ImportOutcome::NothingToImport => println!("⚠️  Nothing to import"),
        ImportOutcome::PartialFailure { failed_batches } => {
            for batch in &report.failed_batches {
                eprintln!(
                    "   ✗ Batch {} ({} rows): {}",
                    batch.index + 1,
                    batch.rows,
                    batch.error
                );
            }
            anyhow::bail!(
                "{} batch(es) failed, {} row(s) not stored",
                failed_batches,
                report.failed_rows()
            );
        }
    }

    Ok(())
}
