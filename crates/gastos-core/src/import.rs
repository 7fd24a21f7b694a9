//! Batch import of reviewed candidates
//!
//! Candidates come back from review (or from a statement file) untrusted:
//! they are re-validated, re-sanitized and re-categorized where needed, then
//! persisted in fixed-size chunks. A failing chunk is reported, never fatal.

use std::io::Read;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::amount::parse_amount;
use crate::categorize::{infer_category_with_trace, CategoryHeuristic};
use crate::classify::classify_type;
use crate::config::GastosConfig;
use crate::dates::normalize_date;
use crate::db::TransactionStore;
use crate::error::{Error, Result};
use crate::models::{
    sanitize_description, CandidateTransaction, NewTransaction, PersistedTransaction, RawAmount,
    StatementRow, TransactionType,
};
use crate::text::fold;

/// A chunk the store rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedBatch {
    /// Zero-based chunk position in input order
    pub index: usize,
    pub rows: usize,
    pub error: String,
}

/// Summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    /// Unselected or zero-amount candidates
    pub skipped: usize,
    pub failed_batches: Vec<FailedBatch>,
}

/// Overall verdict of an import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Completed,
    PartialFailure { failed_batches: usize },
    NothingToImport,
}

impl ImportReport {
    pub fn outcome(&self) -> ImportOutcome {
        if !self.failed_batches.is_empty() {
            ImportOutcome::PartialFailure {
                failed_batches: self.failed_batches.len(),
            }
        } else if self.inserted == 0 {
            ImportOutcome::NothingToImport
        } else {
            ImportOutcome::Completed
        }
    }

    /// Rows that were valid but sit in failed chunks
    pub fn failed_rows(&self) -> usize {
        self.failed_batches.iter().map(|b| b.rows).sum()
    }
}

/// Validate and persist reviewed candidates in chunks
pub async fn import_batch<S>(
    store: &S,
    candidates: &[CandidateTransaction],
    owner_id: &str,
    config: &GastosConfig,
    reference: NaiveDate,
) -> Result<ImportReport>
where
    S: TransactionStore + ?Sized,
{
    let owner_id = validate_owner(owner_id)?;

    let rows: Vec<NewTransaction> = candidates
        .iter()
        .filter_map(|c| prepare_row(c, owner_id, reference, &config.heuristic))
        .collect();

    let mut report = ImportReport {
        skipped: candidates.len() - rows.len(),
        ..Default::default()
    };

    if rows.is_empty() {
        info!(skipped = report.skipped, "Nothing to import");
        return Ok(report);
    }

    let batch_size = config.import.batch_size.max(1);
    for (index, chunk) in rows.chunks(batch_size).enumerate() {
        match store.insert_many(chunk).await {
            Ok(persisted) => {
                debug!(batch = index, rows = persisted.len(), "Batch persisted");
                report.inserted += persisted.len();
            }
            Err(e) => {
                warn!(batch = index, rows = chunk.len(), error = %e, "Batch failed, continuing");
                report.failed_batches.push(FailedBatch {
                    index,
                    rows: chunk.len(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        failed_batches = report.failed_batches.len(),
        "Import finished"
    );
    Ok(report)
}

/// Convert statement rows to candidates and import them
pub async fn import_statement_rows<S>(
    store: &S,
    rows: &[StatementRow],
    owner_id: &str,
    config: &GastosConfig,
    reference: NaiveDate,
) -> Result<ImportReport>
where
    S: TransactionStore + ?Sized,
{
    let candidates: Vec<CandidateTransaction> = rows
        .iter()
        .map(|row| statement_candidate(row, reference))
        .collect();
    import_batch(store, &candidates, owner_id, config, reference).await
}

/// Single-record insert path
pub async fn insert_single<S>(
    store: &S,
    candidate: &CandidateTransaction,
    owner_id: &str,
    config: &GastosConfig,
    reference: NaiveDate,
) -> Result<PersistedTransaction>
where
    S: TransactionStore + ?Sized,
{
    let owner_id = validate_owner(owner_id)?;
    let row = prepare_row(candidate, owner_id, reference, &config.heuristic).ok_or_else(|| {
        Error::InvalidData(format!(
            "Nothing to insert: amount must be positive (got {})",
            candidate.amount
        ))
    })?;

    store
        .insert_many(std::slice::from_ref(&row))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Store("Store returned no row for single insert".into()))
}

fn validate_owner(owner_id: &str) -> Result<&str> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(Error::InvalidData("Owner id must not be empty".into()));
    }
    Ok(owner_id)
}

/// Turn a reviewed candidate into a storable row, `None` if it is skipped
fn prepare_row(
    candidate: &CandidateTransaction,
    owner_id: &str,
    reference: NaiveDate,
    heuristic: &CategoryHeuristic,
) -> Option<NewTransaction> {
    if !candidate.selected || !candidate.has_valid_amount() {
        return None;
    }

    let description = sanitize_description(&candidate.description);

    // User-chosen ids are kept; anything else is re-inferred
    let category = candidate.category().unwrap_or_else(|| {
        let inference = infer_category_with_trace(
            &description,
            candidate.amount,
            candidate.transaction_type,
            heuristic,
        );
        debug!(
            label = %candidate.category,
            category = %inference.category,
            "Candidate category not in closed set, re-inferred"
        );
        inference.category
    });

    // Candidate dates are already calendar dates; the ISO round-trip is a no-op
    let date = normalize_date(&candidate.date.to_string(), reference);

    Some(NewTransaction {
        owner_id: owner_id.to_string(),
        date,
        description,
        amount: candidate.amount,
        transaction_type: candidate.transaction_type,
        category,
    })
}

/// Statement row to candidate
///
/// An explicit type label wins. Otherwise a negative amount is an expense and
/// a positive one is income unless the description carries an expense trigger.
pub fn statement_candidate(row: &StatementRow, reference: NaiveDate) -> CandidateTransaction {
    let signed = match &row.amount {
        RawAmount::Number(n) => Some(*n),
        RawAmount::Text(s) => parse_amount(s),
    }
    .filter(|v| v.is_finite())
    .unwrap_or(0.0);

    let transaction_type = row
        .transaction_type
        .as_deref()
        .and_then(TransactionType::from_label)
        .unwrap_or_else(|| {
            if signed < 0.0 {
                TransactionType::Expense
            } else {
                classify_type(&row.description, Some("income"))
            }
        });

    CandidateTransaction {
        amount: signed.abs(),
        transaction_type,
        category: row.category.clone().unwrap_or_default(),
        date: normalize_date(&row.date, reference),
        description: sanitize_description(&row.description),
        is_saving: false,
        saving_goal: None,
        selected: true,
    }
}

/// Read statement rows from CSV
///
/// Header names are matched in English or Portuguese (`data`, `descricao`,
/// `valor`, `tipo`, `categoria`). Comma and semicolon delimiters are accepted.
pub fn read_statement_csv<R: Read>(mut reader: R) -> Result<Vec<StatementRow>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let header_line = content.lines().next().unwrap_or_default();
    let delimiter = if header_line.contains(';') && !header_line.contains(',') {
        b';'
    } else {
        b','
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.contains(&fold(h).as_str()))
    };

    let date_col = column(&["date", "data"])
        .ok_or_else(|| Error::InvalidData("Statement CSV has no date column".into()))?;
    let description_col = column(&["description", "descricao", "historico"])
        .ok_or_else(|| Error::InvalidData("Statement CSV has no description column".into()))?;
    let amount_col = column(&["amount", "valor"])
        .ok_or_else(|| Error::InvalidData("Statement CSV has no amount column".into()))?;
    let type_col = column(&["type", "tipo"]);
    let category_col = column(&["category", "categoria"]);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        let optional = |i: Option<usize>| {
            i.and_then(|i| record.get(i))
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };

        rows.push(StatementRow {
            date: field(date_col),
            description: field(description_col),
            amount: RawAmount::Text(field(amount_col)),
            transaction_type: optional(type_col),
            category: optional(category_col),
        });
    }

    debug!("Parsed {} statement rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::Category;
    use crate::test_utils::FlakyStore;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn candidate(amount: f64, description: &str, category: &str) -> CandidateTransaction {
        CandidateTransaction {
            amount,
            transaction_type: TransactionType::Expense,
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            description: description.to_string(),
            is_saving: false,
            saving_goal: None,
            selected: true,
        }
    }

    fn config_with_batch(batch_size: usize) -> GastosConfig {
        let mut config = GastosConfig::default();
        config.import.batch_size = batch_size;
        config
    }

    #[tokio::test]
    async fn test_partial_failure_continues() {
        let store = FlakyStore::failing_batches(&[1]);
        let candidates: Vec<_> = (1..=45)
            .map(|i| candidate(i as f64, "Mercado", "alimentacao"))
            .collect();

        let report = import_batch(&store, &candidates, "ana", &config_with_batch(20), reference())
            .await
            .unwrap();

        assert_eq!(report.inserted, 25);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed_batches.len(), 1);
        assert_eq!(report.failed_batches[0].index, 1);
        assert_eq!(report.failed_batches[0].rows, 20);
        assert_eq!(report.failed_rows(), 20);
        assert_eq!(
            report.outcome(),
            ImportOutcome::PartialFailure { failed_batches: 1 }
        );
        assert_eq!(store.calls(), 3);
    }

    #[tokio::test]
    async fn test_skips_unselected_and_zero_amounts() {
        let store = FlakyStore::reliable();
        let mut unselected = candidate(10.0, "Padaria", "alimentacao");
        unselected.selected = false;
        let candidates = vec![
            unselected,
            candidate(0.0, "Nada", "outros"),
            candidate(-5.0, "Negativo", "outros"),
            candidate(30.0, "Uber", "transporte"),
        ];

        let report = import_batch(&store, &candidates, "ana", &GastosConfig::default(), reference())
            .await
            .unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.outcome(), ImportOutcome::Completed);
    }

    #[tokio::test]
    async fn test_nothing_to_import() {
        let store = FlakyStore::reliable();
        let report = import_batch(&store, &[], "ana", &GastosConfig::default(), reference())
            .await
            .unwrap();
        assert_eq!(report.outcome(), ImportOutcome::NothingToImport);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_category_kept_or_reinferred() {
        let store = FlakyStore::reliable();
        let candidates = vec![
            // User picked lazer for a market run: respected
            candidate(50.0, "Mercado", "lazer"),
            // Label outside the closed set: re-inferred from the description
            candidate(50.0, "Mercado", "Groceries"),
        ];
        import_batch(&store, &candidates, "ana", &GastosConfig::default(), reference())
            .await
            .unwrap();

        let stored = store.rows();
        assert_eq!(stored[0].category, Category::Lazer);
        assert_eq!(stored[1].category, Category::Alimentacao);
    }

    #[tokio::test]
    async fn test_description_resanitized() {
        let store = FlakyStore::reliable();
        let candidates = vec![
            candidate(10.0, &"a".repeat(400), "outros"),
            candidate(10.0, "   ", "outros"),
        ];
        import_batch(&store, &candidates, "ana", &GastosConfig::default(), reference())
            .await
            .unwrap();

        let stored = store.rows();
        assert_eq!(stored[0].description.chars().count(), 255);
        assert_eq!(stored[1].description, crate::models::DESCRIPTION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_empty_owner_rejected() {
        let store = FlakyStore::reliable();
        let result = import_batch(
            &store,
            &[candidate(10.0, "x", "outros")],
            "  ",
            &GastosConfig::default(),
            reference(),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_insert_single() {
        let db = Database::in_memory().unwrap();
        let persisted = insert_single(
            &db,
            &candidate(42.0, "Farmácia", "saude"),
            "ana",
            &GastosConfig::default(),
            reference(),
        )
        .await
        .unwrap();
        assert!(persisted.id > 0);
        assert_eq!(persisted.category, Category::Saude);

        let zero = insert_single(
            &db,
            &candidate(0.0, "x", "outros"),
            "ana",
            &GastosConfig::default(),
            reference(),
        )
        .await;
        assert!(matches!(zero, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_statement_candidate_types() {
        let row = |amount: &str, kind: Option<&str>, description: &str| StatementRow {
            date: "01/06/2024".into(),
            description: description.into(),
            amount: RawAmount::Text(amount.into()),
            transaction_type: kind.map(str::to_string),
            category: None,
        };

        let debit = statement_candidate(&row("-12,50", None, "PADARIA"), reference());
        assert_eq!(debit.amount, 12.5);
        assert_eq!(debit.transaction_type, TransactionType::Expense);
        assert_eq!(debit.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

        let credit = statement_candidate(&row("1.500,00", None, "PIX RECEBIDO"), reference());
        assert_eq!(credit.transaction_type, TransactionType::Income);

        let labelled = statement_candidate(&row("80", Some("debito"), "TED"), reference());
        assert_eq!(labelled.transaction_type, TransactionType::Expense);

        let positive_payment = statement_candidate(&row("99,90", None, "Pagamento boleto"), reference());
        assert_eq!(positive_payment.transaction_type, TransactionType::Expense);

        let garbage = statement_candidate(&row("abc", None, "???"), reference());
        assert_eq!(garbage.amount, 0.0);
    }

    #[test]
    fn test_read_statement_csv_portuguese_semicolon() {
        let csv = "Data;Descrição;Valor;Tipo\n01/06/2024;Padaria;-12,50;\n02/06/2024;Salário;3.000,00;credito\n";
        let rows = read_statement_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, RawAmount::Text("-12,50".into()));
        assert_eq!(rows[0].transaction_type, None);
        assert_eq!(rows[1].transaction_type.as_deref(), Some("credito"));
    }

    #[test]
    fn test_read_statement_csv_english() {
        let csv = "date,description,amount,type,category\n2024-06-01,Uber,23.40,expense,transporte\n";
        let rows = read_statement_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].category.as_deref(), Some("transporte"));
        assert_eq!(rows[0].date, "2024-06-01");
    }

    #[test]
    fn test_read_statement_csv_missing_column() {
        let err = read_statement_csv("date,description\n2024-06-01,Uber\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[tokio::test]
    async fn test_import_statement_rows_into_database() {
        let db = Database::in_memory().unwrap();
        let csv = "date,description,amount\n2024-06-01,Mercado,-80\n2024-06-02,PIX RECEBIDO,200\n2024-06-03,Estorno,0\n";
        let rows = read_statement_csv(csv.as_bytes()).unwrap();

        let report = import_statement_rows(&db, &rows, "ana", &GastosConfig::default(), reference())
            .await
            .unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);

        let stored = db.list_transactions("ana", 10).unwrap();
        assert_eq!(stored[0].transaction_type, TransactionType::Income);
        assert_eq!(stored[0].category, Category::Outros);
        assert_eq!(stored[1].category, Category::Alimentacao);
    }
}
