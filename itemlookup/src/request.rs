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

//! Extraction of the item id from a request-shaped JSON document.
//!
//! The request is schema-less: only `queryStringParameters.id` is read and
//! every other key is ignored. A missing or malformed id is never a fault, it
//! is reported as an [`IdRejection`] which the handler discards.

use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;

/// Key holding the query string parameters of an API Gateway proxy event.
pub const QUERY_STRING_PARAMETERS: &str = "queryStringParameters";
/// Query string parameter carrying the item id.
pub const ID_PARAMETER: &str = "id";

/// Why a request did not yield an item id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdRejection {
    /// The request is `null` or not an object, or it has no
    /// `queryStringParameters` object.
    MissingParameters,
    /// `queryStringParameters` has no `id` entry.
    MissingId,
    /// The `id` entry is not a JSON string.
    NotAString,
    /// The `id` entry is empty or whitespace only.
    Blank,
    /// The `id` entry is not a base-10 `i64`.
    NotNumeric(ParseIntError),
}

impl Display for IdRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IdRejection::MissingParameters => write!(f, "no {} object", QUERY_STRING_PARAMETERS),
            IdRejection::MissingId => write!(f, "no '{}' parameter", ID_PARAMETER),
            IdRejection::NotAString => write!(f, "'{}' parameter is not a string", ID_PARAMETER),
            IdRejection::Blank => write!(f, "'{}' parameter is blank", ID_PARAMETER),
            IdRejection::NotNumeric(e) => write!(f, "'{}' parameter: {}", ID_PARAMETER, e),
        }
    }
}

/// Reads `queryStringParameters.id` from `request` and parses it as a signed
/// 64-bit integer.
///
/// Surrounding whitespace is not trimmed, so `" 42"` is rejected; a leading
/// `+` or `-` sign is accepted. Values out of the `i64` range are rejected like
/// any other non-numeric text.
pub fn extract_item_id(request: &Value) -> Result<i64, IdRejection> {
    let params = request
        .get(QUERY_STRING_PARAMETERS)
        .and_then(Value::as_object)
        .ok_or(IdRejection::MissingParameters)?;

    let raw = match params.get(ID_PARAMETER) {
        None | Some(Value::Null) => return Err(IdRejection::MissingId),
        Some(Value::String(s)) => s,
        Some(_) => return Err(IdRejection::NotAString),
    };

    if raw.trim().is_empty() {
        return Err(IdRejection::Blank);
    }
    raw.parse::<i64>().map_err(IdRejection::NotNumeric)
}
