//! Transaction operations

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::{parse_datetime, Database, TransactionStore};
use crate::error::{Error, Result};
use crate::models::{Category, NewTransaction, PersistedTransaction, TransactionType};

impl Database {
    /// Insert rows inside one SQL transaction
    ///
    /// Any failing row rolls back the whole call.
    pub fn insert_transactions(&self, rows: &[NewTransaction]) -> Result<Vec<PersistedTransaction>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut persisted = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transactions (owner_id, date, description, amount, type, category)
                VALUES (?, ?, ?, ?, ?, ?)
                RETURNING id, created_at
                "#,
            )?;

            for row in rows {
                let (id, created_at): (i64, String) = stmt.query_row(
                    params![
                        row.owner_id,
                        row.date.to_string(),
                        row.description,
                        row.amount,
                        row.transaction_type.as_str(),
                        row.category.as_str(),
                    ],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )?;

                persisted.push(PersistedTransaction {
                    id,
                    owner_id: row.owner_id.clone(),
                    date: row.date,
                    description: row.description.clone(),
                    amount: row.amount,
                    transaction_type: row.transaction_type,
                    category: row.category,
                    created_at: parse_datetime(&created_at),
                });
            }
        }

        tx.commit()?;
        Ok(persisted)
    }

    /// Most recent transactions of one owner, newest first
    pub fn list_transactions(&self, owner_id: &str, limit: i64) -> Result<Vec<PersistedTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, date, description, amount, type, category, created_at
            FROM transactions
            WHERE owner_id = ?
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![owner_id, limit], RawRow::from_row)?;

        let mut transactions = Vec::new();
        for raw in rows {
            transactions.push(raw?.into_transaction()?);
        }
        Ok(transactions)
    }

    /// Number of stored transactions for one owner
    pub fn count_transactions(&self, owner_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE owner_id = ?",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[async_trait]
impl TransactionStore for Database {
    async fn insert_many(&self, rows: &[NewTransaction]) -> Result<Vec<PersistedTransaction>> {
        self.insert_transactions(rows)
    }
}

// Column values as stored, before domain validation
struct RawRow {
    id: i64,
    owner_id: String,
    date: String,
    description: String,
    amount: f64,
    transaction_type: String,
    category: String,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            date: row.get(2)?,
            description: row.get(3)?,
            amount: row.get(4)?,
            transaction_type: row.get(5)?,
            category: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_transaction(self) -> Result<PersistedTransaction> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| Error::InvalidData(format!("Bad stored date '{}': {}", self.date, e)))?;
        let transaction_type: TransactionType =
            self.transaction_type.parse().map_err(Error::InvalidData)?;
        let category: Category = self.category.parse().map_err(Error::InvalidData)?;

        Ok(PersistedTransaction {
            id: self.id,
            owner_id: self.owner_id,
            date,
            description: self.description,
            amount: self.amount,
            transaction_type,
            category,
            created_at: parse_datetime(&self.created_at),
        })
    }
}
