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

#![warn(missing_docs, clippy::needless_borrow)]
// Clippy lints, some should be disabled incrementally
#![allow(clippy::new_without_default, clippy::upper_case_acronyms)]

//! `itemlookup` looks up an item by numeric identifier in a relational store
//! and returns a found/not-found payload, with the invocation span tagged and
//! the log line correlated with the trace.

pub mod configs;
pub mod error;
pub mod handler;
pub mod logger;
pub mod model;
pub mod prelude;
pub mod request;
pub mod store;
#[allow(missing_docs)]
pub mod test_util;
pub mod trace;
