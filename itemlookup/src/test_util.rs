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

//! Common unit test utility methods

use crate::error::{ItemLookupError, Result};
use crate::logger::ContextLogger;
use crate::model::Item;
use crate::store::{ItemStore, SqliteItemStore};
use crate::trace::{TraceSpan, Tracer};
use async_trait::async_trait;
use fake::faker::lorem::en::Word;
use fake::{Dummy, Fake, Faker};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A generated row of the `items` table.
#[derive(Dummy, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemRecord {
    #[dummy(faker = "1..1_000_000")]
    pub id:     i64,
    #[dummy(faker = "Word()")]
    pub name:   String,
    #[dummy(faker = "Word()")]
    pub status: String,
}

impl From<ItemRecord> for Item {
    fn from(r: ItemRecord) -> Self {
        Item {
            id:     r.id,
            name:   r.name,
            status: r.status,
        }
    }
}

/// Returns `n` random items with distinct ids.
pub fn random_items(n: usize) -> Vec<Item> {
    let mut items: BTreeMap<i64, Item> = BTreeMap::new();
    while items.len() < n {
        let record: ItemRecord = Faker.fake();
        items.insert(record.id, record.into());
    }
    items.into_values().collect()
}

/// A SQLite store over a private in-memory database holding `items`.
///
/// The pool is capped at one connection: every new connection to
/// `sqlite::memory:` would see an empty schema.
pub async fn sqlite_store(items: &[Item]) -> Result<SqliteItemStore> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::query(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, status TEXT NOT NULL)",
    )
    .execute(&pool)
    .await?;
    for item in items {
        sqlx::query("INSERT INTO items (id, name, status) VALUES (?, ?, ?)")
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.status)
            .execute(&pool)
            .await?;
    }
    Ok(SqliteItemStore::new(pool))
}

/// An in-memory [`ItemStore`] counting the queries it serves.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    rows:    Vec<Item>,
    queries: AtomicUsize,
    fail:    bool,
}

impl MemoryItemStore {
    /// A store holding `rows` in insertion order.
    pub fn new(rows: Vec<Item>) -> Self {
        MemoryItemStore {
            rows,
            ..Default::default()
        }
    }

    /// A store whose every query fails like an unreachable database.
    pub fn failing() -> Self {
        MemoryItemStore {
            fail: true,
            ..Default::default()
        }
    }

    /// Number of queries issued so far.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn find_by_id(&self, id: i64) -> Result<Vec<Item>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ItemLookupError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.iter().filter(|r| r.id == id).cloned().collect())
    }
}

/// What a [`RecordingTracer`] saw of one span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanRecord {
    pub operation: String,
    pub resource:  String,
    pub tags:      Vec<(String, i64)>,
    pub error:     Option<String>,
    pub finished:  bool,
}

/// A [`Tracer`] keeping every span it starts. Ids are the 1-based position of
/// the span, both for the trace and the span.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RecordingTracer {
    /// Snapshot of the spans started so far.
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().unwrap().clone()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, operation: &str, resource: &str) -> Option<Box<dyn TraceSpan>> {
        let mut spans = self.spans.lock().unwrap();
        spans.push(SpanRecord {
            operation: operation.to_owned(),
            resource: resource.to_owned(),
            ..Default::default()
        });
        Some(Box::new(RecordingSpan {
            index: spans.len() - 1,
            spans: self.spans.clone(),
        }))
    }
}

struct RecordingSpan {
    index: usize,
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RecordingSpan {
    fn update(&self, f: impl FnOnce(&mut SpanRecord)) {
        f(&mut self.spans.lock().unwrap()[self.index]);
    }
}

impl TraceSpan for RecordingSpan {
    fn set_tag_i64(&mut self, key: &str, value: i64) {
        self.update(|s| s.tags.push((key.to_owned(), value)));
    }

    fn record_error(&mut self, message: &str) {
        self.update(|s| s.error = Some(message.to_owned()));
    }

    fn trace_id(&self) -> String {
        (self.index + 1).to_string()
    }

    fn span_id(&self) -> String {
        (self.index + 1).to_string()
    }

    fn finish(&mut self) {
        self.update(|s| s.finished = true);
    }
}

/// One call observed by a [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogCall {
    Put(String, String),
    Remove(String),
    /// The message with the context active when it was logged.
    Info(String, BTreeMap<String, String>),
}

/// A [`ContextLogger`] recording every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    calls:   Arc<Mutex<Vec<LogCall>>>,
    context: Arc<Mutex<BTreeMap<String, String>>>,
}

impl RecordingLogger {
    /// Snapshot of the calls so far.
    pub fn calls(&self) -> Vec<LogCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The informational lines with their context.
    pub fn lines(&self) -> Vec<(String, BTreeMap<String, String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LogCall::Info(message, ctx) => Some((message, ctx)),
                _ => None,
            })
            .collect()
    }

    /// The context left behind after the last call.
    pub fn context(&self) -> BTreeMap<String, String> {
        self.context.lock().unwrap().clone()
    }
}

impl ContextLogger for RecordingLogger {
    fn put(&self, key: &str, value: String) {
        self.context
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.clone());
        self.calls
            .lock()
            .unwrap()
            .push(LogCall::Put(key.to_owned(), value));
    }

    fn remove(&self, key: &str) {
        self.context.lock().unwrap().remove(key);
        self.calls
            .lock()
            .unwrap()
            .push(LogCall::Remove(key.to_owned()));
    }

    fn info(&self, message: &str) {
        let ctx = self.context();
        self.calls
            .lock()
            .unwrap()
            .push(LogCall::Info(message.to_owned(), ctx));
    }
}
