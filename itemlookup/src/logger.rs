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

//! Leveled logging with a scoped key/value diagnostic context.

use log::info;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// A logger with a mapped diagnostic context.
pub trait ContextLogger: Send + Sync {
    /// Sets `key` in the diagnostic context of the calling thread.
    fn put(&self, key: &str, value: String);
    /// Removes `key` from the diagnostic context of the calling thread.
    fn remove(&self, key: &str);
    /// Emits an informational line carrying the current context.
    fn info(&self, message: &str);
}

/// Keys attached to a [`ContextLogger`] for as long as the guard lives.
///
/// Every key is removed when the guard is dropped, including while unwinding
/// from a panic raised by the logger itself.
pub struct ScopedContext<'a> {
    logger: &'a dyn ContextLogger,
    keys:   Vec<String>,
}

impl<'a> ScopedContext<'a> {
    /// Puts each of `entries` on `logger`.
    pub fn attach<K, I>(logger: &'a dyn ContextLogger, entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, String)>,
    {
        let mut scope = ScopedContext {
            logger,
            keys: Vec::new(),
        };
        for (key, value) in entries {
            let key = key.into();
            // Record the key first so a panicking `put` still gets cleaned up.
            scope.keys.push(key.clone());
            logger.put(&key, value);
        }
        scope
    }
}

impl Drop for ScopedContext<'_> {
    fn drop(&mut self) {
        for key in self.keys.iter().rev() {
            self.logger.remove(key);
        }
    }
}

thread_local! {
    static DIAGNOSTIC_CONTEXT: RefCell<BTreeMap<String, String>> = RefCell::new(BTreeMap::new());
}

/// A [`ContextLogger`] writing through the `log` facade.
///
/// The context lives in a thread-local map, so concurrent invocations on other
/// threads never observe each other's keys. Entries are rendered after the
/// message as `key=value` pairs.
#[derive(Debug, Clone)]
pub struct MdcLogger {
    target: String,
}

impl MdcLogger {
    /// Creates a logger emitting records for `target`.
    pub fn new(target: impl Into<String>) -> Self {
        MdcLogger {
            target: target.into(),
        }
    }

    /// A snapshot of the calling thread's diagnostic context.
    pub fn context() -> BTreeMap<String, String> {
        DIAGNOSTIC_CONTEXT.with(|ctx| ctx.borrow().clone())
    }

    fn render(message: &str) -> String {
        DIAGNOSTIC_CONTEXT.with(|ctx| {
            ctx.borrow()
                .iter()
                .fold(message.to_owned(), |mut line, (key, value)| {
                    line.push(' ');
                    line.push_str(key);
                    line.push('=');
                    line.push_str(value);
                    line
                })
        })
    }
}

impl Default for MdcLogger {
    fn default() -> Self {
        MdcLogger::new(crate::configs::ITEMLOOKUP_LOG_TARGET.as_str())
    }
}

impl ContextLogger for MdcLogger {
    fn put(&self, key: &str, value: String) {
        DIAGNOSTIC_CONTEXT.with(|ctx| {
            ctx.borrow_mut().insert(key.to_owned(), value);
        });
    }

    fn remove(&self, key: &str) {
        DIAGNOSTIC_CONTEXT.with(|ctx| {
            ctx.borrow_mut().remove(key);
        });
    }

    fn info(&self, message: &str) {
        info!(target: self.target.as_str(), "{}", MdcLogger::render(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn scoped_keys_are_removed_on_drop() {
        let logger = MdcLogger::new("test");
        {
            let _ctx = ScopedContext::attach(
                &logger,
                vec![("dd.trace_id", "1".to_owned()), ("dd.span_id", "2".to_owned())],
            );
            assert_eq!(
                "done dd.span_id=2 dd.trace_id=1",
                MdcLogger::render("done")
            );
            logger.info("done");
        }
        assert!(MdcLogger::context().is_empty());
        assert_eq!("done", MdcLogger::render("done"));
    }

    #[test]
    fn keys_outside_the_scope_survive() {
        let logger = MdcLogger::new("test");
        logger.put("request_id", "abc".to_owned());
        {
            let _ctx = ScopedContext::attach(&logger, vec![("dd.trace_id", "1".to_owned())]);
            assert_eq!(2, MdcLogger::context().len());
        }
        let ctx = MdcLogger::context();
        assert_eq!(Some(&"abc".to_owned()), ctx.get("request_id"));
        assert_eq!(1, ctx.len());
        logger.remove("request_id");
    }

    struct PanickingLogger(MdcLogger);

    impl ContextLogger for PanickingLogger {
        fn put(&self, key: &str, value: String) {
            self.0.put(key, value)
        }

        fn remove(&self, key: &str) {
            self.0.remove(key)
        }

        fn info(&self, _message: &str) {
            panic!("log sink unavailable");
        }
    }

    #[test]
    fn keys_are_removed_when_logging_panics() {
        let logger = PanickingLogger(MdcLogger::new("test"));
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ctx = ScopedContext::attach(&logger, vec![("dd.trace_id", "1".to_owned())]);
            logger.info("processed");
        }));
        assert!(result.is_err());
        assert!(MdcLogger::context().is_empty());
    }

    #[test]
    fn contexts_are_thread_local() {
        let logger = MdcLogger::new("test");
        let _ctx = ScopedContext::attach(&logger, vec![("dd.trace_id", "1".to_owned())]);
        let other = std::thread::spawn(MdcLogger::context).join().unwrap();
        assert!(other.is_empty());
        assert_eq!(1, MdcLogger::context().len());
    }
}
