//! Transaction Repository
//!
//! Executes the single parameterized insert. Uniqueness of `reference` is
//! left to the datastore constraint: there is no check-then-insert, so two
//! concurrent requests with the same reference resolve to one success and
//! one `DuplicateKey`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::error::PipelineError;
use super::types::TransactionRequest;
use crate::config::TransactionMode;

const INSERT_TRANSACTION: &str = r#"
    INSERT INTO transactions (service, name, amount, account, reference)
    VALUES ($1, $2, $3, $4, $5)
"#;

/// Persistence seam for the pipeline
///
/// Implementations make exactly one attempt; nothing is retried.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Get repository name for logging
    fn name(&self) -> &'static str;

    /// Insert one transaction.
    ///
    /// # Errors
    /// `DuplicateKey` when `reference` already exists, `Persistence` for any
    /// other datastore failure. Nothing is left committed on error.
    async fn insert(&self, request: &TransactionRequest) -> Result<(), PipelineError>;
}

/// PostgreSQL-backed repository
pub struct PgTransactionRepository {
    pool: PgPool,
    mode: TransactionMode,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool, mode: TransactionMode) -> Self {
        Self { pool, mode }
    }

    fn insert_query(
        request: &TransactionRequest,
    ) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
        sqlx::query(INSERT_TRANSACTION)
            .bind(&request.service)
            .bind(&request.name)
            .bind(request.amount)
            .bind(&request.account)
            .bind(&request.reference)
    }

    /// BEGIN / INSERT / COMMIT; ROLLBACK on failure
    async fn insert_explicit(&self, request: &TransactionRequest) -> Result<(), PipelineError> {
        let mut tx = self.pool.begin().await?;

        match Self::insert_query(request).execute(&mut *tx).await {
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                // Dropping `tx` would also roll back; done explicitly so the
                // connection goes back to the pool clean.
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        reference = %request.reference,
                        "Rollback failed: {}",
                        rollback_err
                    );
                }
                Err(e.into())
            }
        }
    }

    async fn insert_implicit(&self, request: &TransactionRequest) -> Result<(), PipelineError> {
        Self::insert_query(request).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, request: &TransactionRequest) -> Result<(), PipelineError> {
        match self.mode {
            TransactionMode::Explicit => self.insert_explicit(request).await,
            TransactionMode::Implicit => self.insert_implicit(request).await,
        }
    }
}
