// src/common/transaction.rs
//! Write transactions that take SQLite's write lock up front.
//!
//! A deferred transaction that reads and then writes can fail with SQLITE_BUSY when
//! another connection wins the upgrade, and the busy handler is not consulted. With
//! `BEGIN IMMEDIATE` the lock is taken at the start, so concurrent writers queue on
//! `busy_timeout` instead.

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use tracing::warn;

use super::error::ApiError;

pub struct ImmediateTransaction {
    /// `None` once committed or rolled back
    conn: Option<PoolConnection<Sqlite>>,
}

impl ImmediateTransaction {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, ApiError> {
        let mut conn = pool.acquire().await.map_err(ApiError::DatabaseError)?;
        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(ApiError::DatabaseError)?;
        Ok(Self { conn: Some(conn) })
    }

    pub fn conn(&mut self) -> Result<&mut SqliteConnection, ApiError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| ApiError::InternalServer("transaction already finished".to_string()))
    }

    pub async fn commit(mut self) -> Result<(), ApiError> {
        sqlx::query("COMMIT")
            .execute(self.conn()?)
            .await
            .map_err(ApiError::DatabaseError)?;
        self.conn.take();
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<(), ApiError> {
        sqlx::query("ROLLBACK")
            .execute(self.conn()?)
            .await
            .map_err(ApiError::DatabaseError)?;
        self.conn.take();
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`, and hand `result` back
    pub async fn finish<T>(self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; connection discarded");
                }
                Err(e)
            }
        }
    }
}

impl Drop for ImmediateTransaction {
    // Unfinished (failed COMMIT/ROLLBACK or a cancelled request): the connection is
    // detached from the pool and closed, which makes SQLite roll the transaction back.
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            drop(conn.detach());
        }
    }
}
