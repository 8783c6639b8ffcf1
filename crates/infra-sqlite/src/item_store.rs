// SQLite ItemStore Implementation

use crate::error::map_sqlx_error;
use crate::SqliteItemTransaction;
use async_trait::async_trait;
use queue_manager_core::domain::{Item, ItemId};
use queue_manager_core::error::{AppError, Result};
use queue_manager_core::port::{ItemStore, ItemStoreTransaction, TransactionalItemStore};
use sqlx::SqlitePool;

pub(crate) const INSERT_ITEM: &str =
    "INSERT INTO items (id, text, cost, enqueued_at) VALUES (?, ?, ?, ?)";

// Single statement, so the pick and the removal cannot be split by a writer
pub(crate) const FETCH_OLDEST_AND_REMOVE: &str = r#"
    DELETE FROM items
    WHERE seq = (
        SELECT seq FROM items
        ORDER BY enqueued_at ASC, seq ASC
        LIMIT 1
    )
    RETURNING seq, id, text, cost, enqueued_at
"#;

pub(crate) const DELETE_ALL: &str = "DELETE FROM items";

pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn insert(&self, item: &Item) -> Result<()> {
        sqlx::query(INSERT_ITEM)
            .bind(&item.id)
            .bind(&item.text)
            .bind(i64::from(item.cost))
            .bind(item.enqueued_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn fetch_oldest_and_remove(&self) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(FETCH_OLDEST_AND_REMOVE)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ItemRow::try_into_item).transpose()
    }

    async fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT seq, id, text, cost, enqueued_at FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ItemRow::try_into_item).transpose()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query(DELETE_ALL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TransactionalItemStore for SqliteItemStore {
    async fn begin_transaction(&self) -> Result<Box<dyn ItemStoreTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteItemTransaction::new(tx)))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    #[allow(dead_code)] // ordering column, not part of the domain model
    seq: i64,
    id: String,
    text: String,
    cost: i64,
    enqueued_at: i64,
}

impl ItemRow {
    pub(crate) fn try_into_item(self) -> Result<Item> {
        let cost = u32::try_from(self.cost).map_err(|_| {
            AppError::Database(format!("Item {} has out-of-range cost {}", self.id, self.cost))
        })?;

        Ok(Item {
            id: self.id,
            text: self.text,
            cost,
            enqueued_at: self.enqueued_at,
        })
    }
}
