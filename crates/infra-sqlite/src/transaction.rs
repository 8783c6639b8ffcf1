// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::item_store::{ItemRow, DELETE_ALL, FETCH_OLDEST_AND_REMOVE, INSERT_ITEM};
use async_trait::async_trait;
use queue_manager_core::domain::Item;
use queue_manager_core::error::Result;
use queue_manager_core::port::{ItemStoreTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

/// Dropping without commit rolls back (sqlx behavior)
pub struct SqliteItemTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteItemTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteItemTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ItemStoreTransaction for SqliteItemTransaction<'_> {
    async fn insert(&mut self, item: &Item) -> Result<()> {
        sqlx::query(INSERT_ITEM)
            .bind(&item.id)
            .bind(&item.text)
            .bind(i64::from(item.cost))
            .bind(item.enqueued_at)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn fetch_oldest_and_remove(&mut self) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(FETCH_OLDEST_AND_REMOVE)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ItemRow::try_into_item).transpose()
    }

    async fn delete_all(&mut self) -> Result<u64> {
        let result = sqlx::query(DELETE_ALL)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
