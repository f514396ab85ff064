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

//! The relational store holding the `items` table.

mod sql;

pub use sql::{PgItemStore, SqliteItemStore};

use crate::configs::{DatabaseConfig, SqlDialect};
use crate::error::Result;
use crate::model::Item;
use async_trait::async_trait;
use std::sync::Arc;

/// ItemStore defines the read access the handler needs from the database
/// client. Implementations must be safe for concurrent use.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns the rows whose primary key equals `id`, in the store's order.
    ///
    /// The id is always bound as a typed parameter. Connectivity and query
    /// faults are returned to the caller unchanged.
    async fn find_by_id(&self, id: i64) -> Result<Vec<Item>>;
}

/// Builds the store described by `conf`.
///
/// The pool is created lazily: no connection is opened until the first query,
/// so an unreachable database surfaces as a query fault.
pub fn connect(conf: &DatabaseConfig) -> Result<Arc<dyn ItemStore>> {
    let store: Arc<dyn ItemStore> = match conf.dialect {
        SqlDialect::Postgres => Arc::new(PgItemStore::connect_lazy(conf)?),
        SqlDialect::Sqlite => Arc::new(SqliteItemStore::connect_lazy(conf)?),
    };
    Ok(store)
}
