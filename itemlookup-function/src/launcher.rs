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

//! The common interface of the places the item lookup can run.

use async_trait::async_trait;
use itemlookup::prelude::*;
use serde_json::Value;

/// Launcher is a trait that defines how a hosting environment builds the
/// handler and feeds it with invocations.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Creates a launcher from the environment of the host.
    async fn new() -> Result<Self>
    where
        Self: Sized;

    /// The handler serving the invocations.
    fn handler(&self) -> &ItemLookupHandler;

    /// Runs a single invocation.
    async fn execute(&self, event: Value) -> Result<LookupResponse> {
        self.handler().handle(&event).await
    }
}
