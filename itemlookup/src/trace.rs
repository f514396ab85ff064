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

//! The tracer collaborator.
//!
//! The handler opens one span per invocation through a [`Tracer`] and keeps it
//! in a [`SpanScope`], which closes the span on every exit path. When tracing
//! is disabled the tracer returns no span and every tagging call is a no-op.

use opentelemetry::trace::{SpanKind, Status};
use opentelemetry::KeyValue;
use std::borrow::Cow;

/// Correlation id reported when no span is active.
pub const NO_CORRELATION_ID: &str = "0";

/// A source of spans.
pub trait Tracer: Send + Sync {
    /// Starts a span named `operation` for `resource`. `None` means tracing is
    /// not enabled for this invocation.
    fn start_span(&self, operation: &str, resource: &str) -> Option<Box<dyn TraceSpan>>;
}

/// An open span.
pub trait TraceSpan: Send {
    /// Attaches a numeric tag.
    fn set_tag_i64(&mut self, key: &str, value: i64);
    /// Marks the span as failed.
    fn record_error(&mut self, message: &str);
    /// Trace id in the form expected by the log correlation keys.
    fn trace_id(&self) -> String;
    /// Span id in the form expected by the log correlation keys.
    fn span_id(&self) -> String;
    /// Closes the span. Further calls are ignored.
    fn finish(&mut self);
}

/// Owns the span of one invocation and finishes it when dropped.
pub struct SpanScope {
    span: Option<Box<dyn TraceSpan>>,
}

impl SpanScope {
    /// Opens a span on `tracer`.
    pub fn start(tracer: &dyn Tracer, operation: &str, resource: &str) -> Self {
        SpanScope {
            span: tracer.start_span(operation, resource),
        }
    }

    /// The active span, if any.
    pub fn active_span(&mut self) -> Option<&mut (dyn TraceSpan + 'static)> {
        self.span.as_deref_mut()
    }

    /// The trace id of the active span, `"0"` without one.
    pub fn trace_id(&self) -> String {
        self.span
            .as_ref()
            .map_or_else(|| NO_CORRELATION_ID.to_owned(), |s| s.trace_id())
    }

    /// The span id of the active span, `"0"` without one.
    pub fn span_id(&self) -> String {
        self.span
            .as_ref()
            .map_or_else(|| NO_CORRELATION_ID.to_owned(), |s| s.span_id())
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        if let Some(span) = self.span.as_mut() {
            span.finish();
        }
    }
}

/// A tracer that never starts spans.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn start_span(&self, _operation: &str, _resource: &str) -> Option<Box<dyn TraceSpan>> {
        None
    }
}

/// Adapts an OpenTelemetry tracer, typically the global one.
#[derive(Debug)]
pub struct OtelTracer<T> {
    tracer: T,
}

impl<T> OtelTracer<T> {
    /// Wraps `tracer`.
    pub fn new(tracer: T) -> Self {
        OtelTracer { tracer }
    }
}

impl OtelTracer<opentelemetry::global::BoxedTracer> {
    /// Uses the tracer provider installed with
    /// [`opentelemetry::global::set_tracer_provider`].
    pub fn global(name: impl Into<Cow<'static, str>>) -> Self {
        OtelTracer::new(opentelemetry::global::tracer(name))
    }
}

impl<T> Tracer for OtelTracer<T>
where
    T: opentelemetry::trace::Tracer + Send + Sync,
    T::Span: Send + 'static,
{
    fn start_span(&self, operation: &str, resource: &str) -> Option<Box<dyn TraceSpan>> {
        let span = self
            .tracer
            .span_builder(operation.to_owned())
            .with_kind(SpanKind::Server)
            .with_attributes(vec![KeyValue::new("resource.name", resource.to_owned())])
            .start(&self.tracer);
        Some(Box::new(OtelSpan {
            span,
            finished: false,
        }))
    }
}

struct OtelSpan<S> {
    span:     S,
    finished: bool,
}

impl<S> TraceSpan for OtelSpan<S>
where
    S: opentelemetry::trace::Span + Send,
{
    fn set_tag_i64(&mut self, key: &str, value: i64) {
        self.span.set_attribute(KeyValue::new(key.to_owned(), value));
    }

    fn record_error(&mut self, message: &str) {
        self.span.set_status(Status::error(message.to_owned()));
    }

    fn trace_id(&self) -> String {
        let bytes = self.span.span_context().trace_id().to_bytes();
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[8..]);
        u64::from_be_bytes(low).to_string()
    }

    fn span_id(&self) -> String {
        u64::from_be_bytes(self.span.span_context().span_id().to_bytes()).to_string()
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.span.end();
        }
    }
}
