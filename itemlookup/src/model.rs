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

//! The records crossing the handler boundary.

use serde::{Deserialize, Serialize};

/// A row of the `items` table. The store owns its lifecycle; the lookup only
/// ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    /// Primary key.
    pub id:     i64,
    /// Display name.
    pub name:   String,
    /// Free-form status, e.g. `active`.
    pub status: String,
}

/// The payload returned to the caller.
///
/// `item` is present if and only if `found` is true, and `id` is `null`
/// exactly when no valid numeric id was supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// The parsed identifier.
    pub id:    Option<i64>,
    /// Whether a matching row exists.
    pub found: bool,
    /// The matched row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item:  Option<Item>,
}

impl LookupResponse {
    /// The response for a request without a usable id.
    pub fn absent() -> Self {
        LookupResponse {
            id:    None,
            found: false,
            item:  None,
        }
    }

    /// Shapes the query outcome for `id`. Only the first row is kept.
    pub fn from_rows(id: i64, rows: Vec<Item>) -> Self {
        let item = rows.into_iter().next();
        LookupResponse {
            id: Some(id),
            found: item.is_some(),
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    fn widget(id: i64) -> Item {
        Item {
            id,
            name: "Widget".to_owned(),
            status: "active".to_owned(),
        }
    }

    #[test]
    fn absent_serializes_null_id() -> Result<()> {
        let json = serde_json::to_string(&LookupResponse::absent())?;
        assert_eq!(r#"{"id":null,"found":false}"#, json);
        Ok(())
    }

    #[test]
    fn found_keeps_the_first_row() -> Result<()> {
        let mut other = widget(42);
        other.name = "Gadget".to_owned();
        let response = LookupResponse::from_rows(42, vec![widget(42), other]);
        assert!(response.found);
        assert_eq!(
            r#"{"id":42,"found":true,"item":{"id":42,"name":"Widget","status":"active"}}"#,
            serde_json::to_string(&response)?
        );
        Ok(())
    }

    #[test]
    fn no_rows_means_not_found() -> Result<()> {
        let response = LookupResponse::from_rows(999, vec![]);
        assert_eq!(None, response.item);
        assert_eq!(
            r#"{"id":999,"found":false}"#,
            serde_json::to_string(&response)?
        );
        Ok(())
    }
}
