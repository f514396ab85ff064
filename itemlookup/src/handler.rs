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

//! The item lookup handler.

use crate::configs::{
    ITEMLOOKUP_ITEM_ID_TAG, ITEMLOOKUP_SPAN_ID_KEY, ITEMLOOKUP_SPAN_OPERATION,
    ITEMLOOKUP_SPAN_RESOURCE, ITEMLOOKUP_TRACE_ID_KEY,
};
use crate::error::Result;
use crate::logger::{ContextLogger, ScopedContext};
use crate::model::LookupResponse;
use crate::request::extract_item_id;
use crate::store::ItemStore;
use crate::trace::{SpanScope, Tracer};
use serde_json::Value;
use std::sync::Arc;

/// Looks up an item by the `id` query string parameter of a request.
///
/// The handler holds no per-invocation state, so one instance serves any
/// number of concurrent invocations. The collaborators are injected:
///
/// * `store` - the database client issuing the parameterized query.
/// * `tracer` - opens the invocation span, which is tagged with the item id.
/// * `logger` - records the processed line with the trace and span ids
///   attached to its context for the duration of that single call.
#[derive(Clone)]
pub struct ItemLookupHandler {
    store:  Arc<dyn ItemStore>,
    tracer: Arc<dyn Tracer>,
    logger: Arc<dyn ContextLogger>,
}

impl ItemLookupHandler {
    /// Creates a handler over the given collaborators.
    pub fn new(
        store: Arc<dyn ItemStore>,
        tracer: Arc<dyn Tracer>,
        logger: Arc<dyn ContextLogger>,
    ) -> Self {
        ItemLookupHandler {
            store,
            tracer,
            logger,
        }
    }

    /// Handles one request.
    ///
    /// A missing or malformed id yields `{id: null, found: false}` without
    /// touching the store, the span tags or the log. A database fault is
    /// returned as `Err` after marking the span as failed.
    pub async fn handle(&self, request: &Value) -> Result<LookupResponse> {
        let mut span = SpanScope::start(
            self.tracer.as_ref(),
            &ITEMLOOKUP_SPAN_OPERATION,
            &ITEMLOOKUP_SPAN_RESOURCE,
        );

        let id = match extract_item_id(request) {
            Ok(id) => id,
            Err(_) => return Ok(LookupResponse::absent()),
        };

        let rows = match self.store.find_by_id(id).await {
            Ok(rows) => rows,
            Err(e) => {
                if let Some(active) = span.active_span() {
                    active.record_error(&e.to_string());
                }
                return Err(e);
            }
        };
        let response = LookupResponse::from_rows(id, rows);

        if let Some(active) = span.active_span() {
            active.set_tag_i64(&ITEMLOOKUP_ITEM_ID_TAG, id);
        }

        {
            let _ctx = ScopedContext::attach(
                self.logger.as_ref(),
                [
                    (ITEMLOOKUP_TRACE_ID_KEY.as_str(), span.trace_id()),
                    (ITEMLOOKUP_SPAN_ID_KEY.as_str(), span.span_id()),
                ],
            );
            self.logger
                .info(&format!("item lookup processed. id={}", id));
        }

        Ok(response)
    }
}
