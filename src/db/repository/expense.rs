//! Expense Repository

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Expense, ExpenseCreate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const EXPENSE_TABLE: &str = "expense";

#[derive(Clone)]
pub struct ExpenseRepository {
    base: BaseRepository,
}

impl ExpenseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, timeout),
        }
    }

    pub async fn create(&self, data: ExpenseCreate) -> RepoResult<Expense> {
        let expense = Expense {
            id: None,
            description: data.description,
            value: data.value,
            date: data.date,
        };

        self.base
            .run(async {
                let created: Option<Expense> =
                    self.base.db().create(EXPENSE_TABLE).content(expense).await?;
                created.ok_or_else(|| RepoError::Database("Failed to create expense".into()))
            })
            .await
    }

    /// Expenses whose date falls in `[start, end)` (Unix millis)
    pub async fn find_in_range(&self, start: i64, end: i64) -> RepoResult<Vec<Expense>> {
        self.base
            .run(async {
                let expenses: Vec<Expense> = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM expense WHERE date >= $start AND date < $end \
                         ORDER BY date",
                    )
                    .bind(("start", start))
                    .bind(("end", end))
                    .await?
                    .take(0)?;
                Ok(expenses)
            })
            .await
    }
}
