//! Integration tests for gastos-core
//!
//! These tests exercise the full utterance → extraction → review → import workflow.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use gastos_core::{
    import_batch, import_statement_rows, read_statement_csv, CandidateTransaction, Category,
    CompletionClient, Database, Error, ExtractionSource, ExtractorConfig, FallbackReason,
    GastosConfig, ImportOutcome, MockBackend, NewTransaction, PersistedTransaction, Result,
    TransactionExtractor, TransactionStore, TransactionType,
};

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
}

fn file_database() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("gastos.db");
    let db = Database::new(&path.to_string_lossy()).expect("Failed to open database");
    (dir, db)
}

/// Database wrapper that fails the batches listed by call index
struct FailingBatches<'a> {
    db: &'a Database,
    failing: &'a [usize],
    calls: AtomicUsize,
}

#[async_trait]
impl TransactionStore for FailingBatches<'_> {
    async fn insert_many(&self, rows: &[NewTransaction]) -> Result<Vec<PersistedTransaction>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&call) {
            return Err(Error::Store(format!("connection reset on batch {}", call)));
        }
        self.db.insert_transactions(rows)
    }
}

// =============================================================================
// Utterance to stored transaction
// =============================================================================

#[tokio::test]
async fn test_utterance_to_database_via_model() {
    let (_dir, db) = file_database();
    let extractor = TransactionExtractor::new(
        Some(CompletionClient::Mock(MockBackend::new())),
        ExtractorConfig::default(),
    );

    let extraction = extractor
        .extract("Gastei 50 reais no mercado ontem", reference())
        .await
        .unwrap();

    assert_eq!(extraction.source, ExtractionSource::Model);
    let candidate = &extraction.candidates[0];
    assert_eq!(candidate.amount, 50.0);
    assert_eq!(candidate.transaction_type, TransactionType::Expense);
    assert_eq!(candidate.category, "alimentacao");
    assert_eq!(candidate.date, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());

    let report = import_batch(
        &db,
        &extraction.candidates,
        "ana",
        &GastosConfig::default(),
        reference(),
    )
    .await
    .unwrap();
    assert_eq!(report.outcome(), ImportOutcome::Completed);

    let stored = db.list_transactions("ana", 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, Category::Alimentacao);
    assert_eq!(stored[0].date, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
}

#[tokio::test]
async fn test_utterance_to_database_via_rules_fallback() {
    let (_dir, db) = file_database();
    let extractor = TransactionExtractor::new(
        Some(CompletionClient::Mock(MockBackend::unavailable())),
        ExtractorConfig::default(),
    );

    let extraction = extractor
        .extract("Gastei 50 reais no mercado ontem", reference())
        .await
        .unwrap();

    assert_eq!(extraction.source, ExtractionSource::Rules);
    assert!(matches!(
        extraction.fallback_reason,
        Some(FallbackReason::Unavailable(_))
    ));
    assert_eq!(extraction.candidates[0].amount, 50.0);
    assert_eq!(extraction.candidates[0].category, "alimentacao");

    import_batch(&db, &extraction.candidates, "ana", &GastosConfig::default(), reference())
        .await
        .unwrap();
    assert_eq!(db.count_transactions("ana").unwrap(), 1);
}

#[tokio::test]
async fn test_income_with_large_amount() {
    let extraction = TransactionExtractor::rules_only()
        .extract("Recebi 3.500 de salário", reference())
        .await
        .unwrap();

    let candidate = &extraction.candidates[0];
    assert_eq!(candidate.amount, 3500.0);
    assert_eq!(candidate.transaction_type, TransactionType::Income);
    assert_eq!(candidate.date, reference());
}

#[tokio::test]
async fn test_saving_intent() {
    let extraction = TransactionExtractor::rules_only()
        .extract("Guardei 200 para a viagem", reference())
        .await
        .unwrap();

    let candidate = &extraction.candidates[0];
    assert!(candidate.is_saving);
    assert_eq!(candidate.saving_goal.as_deref(), Some("Viagem"));
}

#[tokio::test]
async fn test_longest_keyword_wins() {
    let extractor = TransactionExtractor::rules_only();

    let bill = extractor
        .extract("Paguei 80 na conta do celular", reference())
        .await
        .unwrap();
    assert_eq!(bill.candidates[0].category, "internet");

    let card = extractor
        .extract("Paguei 300 da fatura do cartão de crédito", reference())
        .await
        .unwrap();
    assert_eq!(card.candidates[0].category, "cartao");
}

#[tokio::test]
async fn test_unintelligible_input_is_not_imported() {
    let (_dir, db) = file_database();
    let extraction = TransactionExtractor::rules_only()
        .extract("bom dia", reference())
        .await
        .unwrap();
    assert_eq!(extraction.candidates[0].amount, 0.0);

    let report = import_batch(&db, &extraction.candidates, "ana", &GastosConfig::default(), reference())
        .await
        .unwrap();
    assert_eq!(report.outcome(), ImportOutcome::NothingToImport);
    assert_eq!(report.skipped, 1);
}

// =============================================================================
// Batch import
// =============================================================================

fn reviewed(count: usize) -> Vec<CandidateTransaction> {
    (0..count)
        .map(|i| CandidateTransaction {
            amount: 10.0 + i as f64,
            transaction_type: TransactionType::Expense,
            category: "transporte".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            description: format!("Corrida {}", i + 1),
            is_saving: false,
            saving_goal: None,
            selected: true,
        })
        .collect()
}

#[tokio::test]
async fn test_second_batch_failure_keeps_others() {
    let (_dir, db) = file_database();
    let store = FailingBatches {
        db: &db,
        failing: &[1],
        calls: AtomicUsize::new(0),
    };

    let report = import_batch(&store, &reviewed(45), "ana", &GastosConfig::default(), reference())
        .await
        .unwrap();

    assert_eq!(report.inserted, 25);
    assert_eq!(report.failed_batches.len(), 1);
    assert_eq!(report.failed_batches[0].index, 1);
    assert!(report.failed_batches[0].error.contains("connection reset"));
    assert_eq!(
        report.outcome(),
        ImportOutcome::PartialFailure { failed_batches: 1 }
    );
    assert_eq!(db.count_transactions("ana").unwrap(), 25);
}

#[tokio::test]
async fn test_statement_file_import() {
    let (_dir, db) = file_database();
    let csv = "\
Data;Descrição;Valor
03/06/2024;IFOOD *RESTAURANTE;-42,90
04/06/2024;PIX RECEBIDO JOAO;150,00
05/06/2024;NETFLIX.COM;-39,90
";
    let rows = read_statement_csv(csv.as_bytes()).unwrap();
    let report = import_statement_rows(&db, &rows, "ana", &GastosConfig::default(), reference())
        .await
        .unwrap();
    assert_eq!(report.inserted, 3);

    let stored = db.list_transactions("ana", 10).unwrap();
    assert_eq!(stored[0].description, "NETFLIX.COM");
    assert_eq!(stored[0].transaction_type, TransactionType::Expense);
    assert_eq!(stored[1].transaction_type, TransactionType::Income);
    assert_eq!(stored[2].amount, 42.9);
    assert_eq!(stored[2].category, Category::Alimentacao);
}
