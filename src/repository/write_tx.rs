use sqlx::{pool::PoolConnection, Sqlite, SqliteConnection, SqlitePool};

use crate::error::{AppError, Result};

/// A transaction that holds SQLite's write lock from its first statement.
///
/// `pool.begin()` issues a deferred `BEGIN`, whose read-then-write upgrade fails
/// with SQLITE_BUSY instead of waiting when another writer is active.
/// `BEGIN IMMEDIATE` waits on the busy timeout, so concurrent writers queue.
pub struct WriteTransaction {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTransaction {
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        Ok(Self { conn: Some(conn) })
    }

    pub fn conn(&mut self) -> Result<&mut SqliteConnection> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| AppError::Internal("Transaction already finished".to_string()))
    }

    pub async fn commit(mut self) -> Result<()> {
        self.end("COMMIT").await
    }

    pub async fn rollback(mut self) -> Result<()> {
        self.end("ROLLBACK").await
    }

    /// Commit on `Ok`, roll back on `Err`, and pass the result through.
    pub async fn finish<T>(self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn end(&mut self, statement: &str) -> Result<()> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };

        if let Err(e) = sqlx::query(statement).execute(&mut *conn).await {
            discard(conn);
            return Err(e.into());
        }

        Ok(())
    }
}

impl Drop for WriteTransaction {
    fn drop(&mut self) {
        // Never finished (early return or cancelled future); closing rolls it back
        if let Some(conn) = self.conn.take() {
            discard(conn);
        }
    }
}

// The pool cannot tell this connection still has a transaction open, so it must not go back.
fn discard(conn: PoolConnection<Sqlite>) {
    drop(conn.detach());
}
