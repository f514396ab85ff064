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

//! Connection settings of the relational store.
//!
//! The connection string is provisioned externally through `DATABASE_URL`; the
//! pool shape comes from the embedded defaults and may be overridden with
//! `DATABASE_MAX_CONNECTIONS`.

use super::{ITEMLOOKUP_DB_ACQUIRE_TIMEOUT, ITEMLOOKUP_DB_MAX_CONNECTIONS};
use crate::error::{ItemLookupError, Result};
use std::env;
use std::time::Duration;

/// Environment variable holding the connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable overriding the pool size.
pub const DATABASE_MAX_CONNECTIONS_ENV: &str = "DATABASE_MAX_CONNECTIONS";

/// SQL dialect spoken by the configured store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// PostgreSQL, `postgres://` or `postgresql://` URLs.
    Postgres,
    /// SQLite, `sqlite:` URLs. Mostly used for local runs.
    Sqlite,
}

impl SqlDialect {
    /// Derives the dialect from the scheme of a connection string.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(SqlDialect::Postgres),
            "sqlite" => Ok(SqlDialect::Sqlite),
            _ => Err(ItemLookupError::Config(format!(
                "unsupported database url scheme: '{}'",
                scheme
            ))),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// The connection string.
    pub url:             String,
    /// The dialect derived from `url`.
    pub dialect:         SqlDialect,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long a query waits for a pooled connection.
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Builds the settings for `url` with the embedded pool defaults.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let dialect = SqlDialect::from_url(&url)?;
        Ok(DatabaseConfig {
            url,
            dialect,
            max_connections: *ITEMLOOKUP_DB_MAX_CONNECTIONS,
            acquire_timeout: *ITEMLOOKUP_DB_ACQUIRE_TIMEOUT,
        })
    }

    /// Attempts to read the settings from environment variables.
    pub fn from_env() -> Result<Self> {
        let url = env::var(DATABASE_URL_ENV).map_err(|e| {
            ItemLookupError::Config(format!("{} is not set: {}", DATABASE_URL_ENV, e))
        })?;
        let mut conf = DatabaseConfig::new(url)?;
        if let Ok(max) = env::var(DATABASE_MAX_CONNECTIONS_ENV) {
            conf.max_connections = max.trim().parse::<u32>().map_err(|e| {
                ItemLookupError::Config(format!(
                    "{} must be a positive integer: {}",
                    DATABASE_MAX_CONNECTIONS_ENV, e
                ))
            })?;
        }
        if conf.max_connections == 0 {
            return Err(ItemLookupError::Config(format!(
                "{} must be greater than zero",
                DATABASE_MAX_CONNECTIONS_ENV
            )));
        }
        Ok(conf)
    }
}
