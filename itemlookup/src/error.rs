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

//! Item lookup error types

use std::error;
use std::fmt::{Display, Formatter};
use std::io;
use std::result;

/// Result type for operations that could result in an [ItemLookupError]
pub type Result<T> = result::Result<T, ItemLookupError>;

/// Item lookup error
#[derive(Debug)]
pub enum ItemLookupError {
    /// Error associated to Lambda runtime execution.
    LambdaError(Box<dyn std::error::Error + Send + Sync>),
    /// Error associated to I/O operations and associated traits.
    IoError(io::Error),
    /// Error returned by the relational store: connectivity, SQL execution,
    /// pool timeouts or row decoding.
    Database(sqlx::Error),
    /// Error returned when serde_json failed to serialize or deserialize data.
    SerdeJson(serde_json::Error),
    /// Error returned when the environment or the embedded settings are
    /// missing or invalid.
    Config(String),
}

impl From<io::Error> for ItemLookupError {
    fn from(e: io::Error) -> Self {
        ItemLookupError::IoError(e)
    }
}

impl From<sqlx::Error> for ItemLookupError {
    fn from(e: sqlx::Error) -> Self {
        ItemLookupError::Database(e)
    }
}

impl From<serde_json::Error> for ItemLookupError {
    fn from(e: serde_json::Error) -> Self {
        ItemLookupError::SerdeJson(e)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ItemLookupError {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ItemLookupError::LambdaError(e)
    }
}

impl Display for ItemLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            ItemLookupError::LambdaError(ref desc) => write!(f, "Lambda error: {}", desc),
            ItemLookupError::IoError(ref desc) => write!(f, "IO error: {}", desc),
            ItemLookupError::Database(ref desc) => write!(f, "Database error: {}", desc),
            ItemLookupError::SerdeJson(ref desc) => write!(f, "serde_json error: {:?}", desc),
            ItemLookupError::Config(ref desc) => write!(f, "Configuration error: {}", desc),
        }
    }
}

impl error::Error for ItemLookupError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ItemLookupError::IoError(e) => Some(e),
            ItemLookupError::Database(e) => Some(e),
            ItemLookupError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_keep_their_source() {
        let err: ItemLookupError = sqlx::Error::PoolTimedOut.into();
        assert!(err.to_string().starts_with("Database error:"));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn runtime_errors_become_lambda_errors() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = "runtime api unreachable".into();
        let err: ItemLookupError = boxed.into();
        assert!(matches!(err, ItemLookupError::LambdaError(_)));
        assert_eq!("Lambda error: runtime api unreachable", err.to_string());
    }
}
