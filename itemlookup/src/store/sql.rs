// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use super::ItemStore;
use crate::configs::DatabaseConfig;
use crate::error::Result;
use crate::model::Item;
use async_trait::async_trait;
use log::debug;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{PgPool, SqlitePool};

const PG_FIND_BY_ID: &str =
    "SELECT CAST(id AS BIGINT) AS id, name, status FROM items WHERE id = $1";

const SQLITE_FIND_BY_ID: &str =
    "SELECT CAST(id AS BIGINT) AS id, name, status FROM items WHERE id = ?";

/// An [`ItemStore`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        PgItemStore { pool }
    }

    /// Creates a pool that opens connections on demand.
    pub fn connect_lazy(conf: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(conf.max_connections)
            .acquire_timeout(conf.acquire_timeout)
            .connect_lazy(&conf.url)?;
        Ok(PgItemStore::new(pool))
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn find_by_id(&self, id: i64) -> Result<Vec<Item>> {
        debug!("postgres lookup for item {}", id);
        let rows = sqlx::query_as::<_, Item>(PG_FIND_BY_ID)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// An [`ItemStore`] backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Wraps an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteItemStore { pool }
    }

    /// Creates a pool that opens connections on demand.
    pub fn connect_lazy(conf: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(conf.max_connections)
            .acquire_timeout(conf.acquire_timeout)
            .connect_lazy(&conf.url)?;
        Ok(SqliteItemStore::new(pool))
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn find_by_id(&self, id: i64) -> Result<Vec<Item>> {
        debug!("sqlite lookup for item {}", id);
        let rows = sqlx::query_as::<_, Item>(SQLITE_FIND_BY_ID)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemLookupError;
    use crate::test_util::sqlite_store;

    fn seed() -> Vec<Item> {
        vec![
            Item {
                id:     42,
                name:   "Widget".to_owned(),
                status: "active".to_owned(),
            },
            Item {
                id:     7,
                name:   "Gadget".to_owned(),
                status: "retired".to_owned(),
            },
        ]
    }

    #[tokio::test]
    async fn finds_row_by_primary_key() -> Result<()> {
        let store = sqlite_store(&seed()).await?;
        let rows = store.find_by_id(42).await?;
        assert_eq!(vec![seed()[0].clone()], rows);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_yields_no_rows() -> Result<()> {
        let store = sqlite_store(&seed()).await?;
        assert!(store.find_by_id(999).await?.is_empty());
        assert!(store.find_by_id(-42).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_table_is_a_database_fault() -> Result<()> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = SqliteItemStore::new(pool);
        match store.find_by_id(1).await {
            Err(ItemLookupError::Database(_)) => Ok(()),
            other => panic!("expected a database fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connect_dispatches_on_dialect() -> Result<()> {
        let conf = DatabaseConfig::new("sqlite::memory:")?;
        let store = crate::store::connect(&conf)?;
        // Lazily connected: the empty in-memory schema makes the query fail.
        assert!(matches!(
            store.find_by_id(1).await,
            Err(ItemLookupError::Database(_))
        ));
        Ok(())
    }
}
