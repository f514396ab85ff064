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

//! This module runs the item lookup on the local machine.
//!
//! Requests are read one JSON document per line and each response is written
//! as one JSON line. A handler fault is written in the shape the Lambda
//! runtime reports invocation errors with, and the launcher moves on to the
//! next line.

use crate::launcher::Launcher;
use async_trait::async_trait;
use itemlookup::prelude::*;
use itemlookup::store;
use log::{info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// LocalLauncher executes the item lookup locally.
pub struct LocalLauncher {
    handler: ItemLookupHandler,
}

#[async_trait]
impl Launcher for LocalLauncher {
    async fn new() -> Result<Self> {
        let conf = DatabaseConfig::from_env()?;
        let store = store::connect(&conf)?;
        Ok(LocalLauncher::with_handler(ItemLookupHandler::new(
            store,
            Arc::new(NoopTracer),
            Arc::new(MdcLogger::default()),
        )))
    }

    fn handler(&self) -> &ItemLookupHandler {
        &self.handler
    }
}

impl LocalLauncher {
    /// Wraps an already built handler.
    pub fn with_handler(handler: ItemLookupHandler) -> Self {
        LocalLauncher { handler }
    }

    /// Serves every line of `input`, writing one line per request to `output`.
    /// Blank lines are skipped. Returns the number of requests served.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let mut lines = input.lines();
        let mut served = 0;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let mut bytes = match serde_json::from_str::<Value>(&line) {
                Ok(event) => match self.execute(event).await {
                    Ok(response) => serde_json::to_vec(&response)?,
                    Err(e) => {
                        warn!("Invocation failed: {}", e);
                        serde_json::to_vec(&error_reply("ItemLookupError", &e.to_string()))?
                    }
                },
                Err(e) => serde_json::to_vec(&error_reply("InvalidEvent", &e.to_string()))?,
            };
            bytes.push(b'\n');
            output.write_all(&bytes).await?;
            served += 1;
        }
        output.flush().await?;
        info!("Served {} local invocation(s)", served);
        Ok(served)
    }
}

fn error_reply(error_type: &str, message: &str) -> Value {
    json!({ "errorType": error_type, "errorMessage": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemlookup::test_util::{MemoryItemStore, RecordingLogger, RecordingTracer};

    fn launcher(store: MemoryItemStore) -> LocalLauncher {
        LocalLauncher::with_handler(ItemLookupHandler::new(
            Arc::new(store),
            Arc::new(RecordingTracer::default()),
            Arc::new(RecordingLogger::default()),
        ))
    }

    #[tokio::test]
    async fn one_reply_per_request_line() -> Result<()> {
        let launcher = launcher(MemoryItemStore::new(vec![Item {
            id:     42,
            name:   "Widget".to_owned(),
            status: "active".to_owned(),
        }]));
        let input = concat!(
            "{\"queryStringParameters\": {\"id\": \"42\"}}\n",
            "\n",
            "{\"queryStringParameters\": {\"id\": \"999\"}}\n",
            "{\"queryStringParameters\": {\"id\": \"abc\"}}\n",
            "{}\n",
            "not json\n",
        );
        let mut output = Vec::new();

        let served = launcher.run(input.as_bytes(), &mut output).await?;
        assert_eq!(5, served);

        let lines = String::from_utf8(output).unwrap();
        let lines = lines.lines().collect::<Vec<_>>();
        assert_eq!(
            vec![
                r#"{"id":42,"found":true,"item":{"id":42,"name":"Widget","status":"active"}}"#,
                r#"{"id":999,"found":false}"#,
                r#"{"id":null,"found":false}"#,
                r#"{"id":null,"found":false}"#,
            ],
            lines[..4]
        );
        assert!(lines[4].contains("\"errorType\":\"InvalidEvent\""));
        Ok(())
    }

    #[tokio::test]
    async fn database_fault_becomes_an_error_line() -> Result<()> {
        let launcher = launcher(MemoryItemStore::failing());
        let mut output = Vec::new();
        launcher
            .run(
                "{\"queryStringParameters\": {\"id\": \"1\"}}\n".as_bytes(),
                &mut output,
            )
            .await?;

        let reply: Value = serde_json::from_slice(&output)?;
        assert_eq!("ItemLookupError", reply["errorType"]);
        assert!(reply["errorMessage"]
            .as_str()
            .unwrap()
            .starts_with("Database error:"));
        Ok(())
    }
}
