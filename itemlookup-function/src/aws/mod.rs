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

//! The `aws` module contains the AWS Lambda hosting of the item lookup.

use crate::launcher::Launcher;
use async_trait::async_trait;
use itemlookup::prelude::*;
use itemlookup::store;
use lambda_runtime::{service_fn, LambdaEvent};
use log::{error, info, warn};
use opentelemetry::global;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use serde_json::Value;
use std::sync::Arc;

/// Installs the process-wide tracer provider the handler's spans come from.
pub fn init_tracer_provider() -> SdkTracerProvider {
    let provider = SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(ITEMLOOKUP_SERVICE_NAME.clone())
                .build(),
        )
        .build();
    global::set_tracer_provider(provider.clone());
    provider
}

/// AwsLambdaLauncher serves invocations from the Lambda Runtime API.
pub struct AwsLambdaLauncher {
    handler:  ItemLookupHandler,
    provider: Option<SdkTracerProvider>,
}

#[async_trait]
impl Launcher for AwsLambdaLauncher {
    async fn new() -> Result<Self> {
        let conf = DatabaseConfig::from_env()?;
        info!(
            "Item lookup on {:?} with up to {} connection(s)",
            conf.dialect, conf.max_connections
        );
        let store = store::connect(&conf)?;
        let provider = init_tracer_provider();
        let handler = ItemLookupHandler::new(
            store,
            Arc::new(OtelTracer::global(ITEMLOOKUP_SERVICE_NAME.clone())),
            Arc::new(MdcLogger::default()),
        );
        Ok(AwsLambdaLauncher {
            handler,
            provider: Some(provider),
        })
    }

    fn handler(&self) -> &ItemLookupHandler {
        &self.handler
    }
}

impl AwsLambdaLauncher {
    /// Serves invocations until the runtime shuts the execution environment
    /// down, then flushes the tracer provider.
    pub async fn serve(mut self) -> Result<()> {
        let handler = self.handler.clone();
        let served = lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
            let handler = handler.clone();
            async move { invoke(&handler, event).await }
        }))
        .await;

        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                warn!("Tracer provider shutdown failed: {}", e);
            }
        }
        Ok(served?)
    }
}

/// Runs one Lambda invocation. A handler fault is returned to the runtime,
/// which reports it as an invocation error.
pub async fn invoke(
    handler: &ItemLookupHandler,
    event: LambdaEvent<Value>,
) -> std::result::Result<LookupResponse, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    handler.handle(&payload).await.map_err(|e| {
        error!("Invocation {} failed: {}", context.request_id, e);
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemlookup::test_util::{MemoryItemStore, RecordingLogger, RecordingTracer};
    use lambda_runtime::Context;
    use serde_json::json;

    fn handler(store: MemoryItemStore) -> ItemLookupHandler {
        ItemLookupHandler::new(
            Arc::new(store),
            Arc::new(RecordingTracer::default()),
            Arc::new(RecordingLogger::default()),
        )
    }

    #[tokio::test]
    async fn invocation_returns_the_lookup() -> Result<()> {
        let handler = handler(MemoryItemStore::new(vec![Item {
            id:     42,
            name:   "Widget".to_owned(),
            status: "active".to_owned(),
        }]));
        let event = LambdaEvent::new(
            json!({ "queryStringParameters": { "id": "42" } }),
            Context::default(),
        );

        let response = invoke(&handler, event).await?;
        assert_eq!(
            r#"{"id":42,"found":true,"item":{"id":42,"name":"Widget","status":"active"}}"#,
            serde_json::to_string(&response)?
        );
        Ok(())
    }

    #[tokio::test]
    async fn null_payload_is_not_found() -> Result<()> {
        let handler = handler(MemoryItemStore::default());
        let response = invoke(&handler, LambdaEvent::new(Value::Null, Context::default())).await?;
        assert_eq!(LookupResponse::absent(), response);
        Ok(())
    }

    #[tokio::test]
    async fn database_fault_is_an_invocation_error() -> Result<()> {
        let handler = handler(MemoryItemStore::failing());
        let event = LambdaEvent::new(
            json!({ "queryStringParameters": { "id": "42" } }),
            Context::default(),
        );

        let err = invoke(&handler, event).await.unwrap_err();
        assert!(err.to_string().starts_with("Database error:"));
        Ok(())
    }
}
