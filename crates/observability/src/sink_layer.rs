//! Tracing layer that hands each event to a `LogSink` as one plain line.

use std::fmt::Write;

use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};

use crate::config::LogSink;

/// Lines longer than this are cut and suffixed with the original length.
const MAX_LINE_CHARS: usize = 8_000;

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push_field(&mut self, name: &str, value: impl std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        write!(self.fields, "{}={}", name, value).ok();
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            write!(self.message, "{:?}", value).ok();
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

/// `[LEVEL] target: message key=value ...`
fn format_line(level: &tracing::Level, target: &str, visitor: LineVisitor) -> String {
    let mut line = format!("[{}] {}", level, target);
    if !visitor.message.is_empty() {
        write!(line, ": {}", visitor.message).ok();
    }
    if !visitor.fields.is_empty() {
        line.push(' ');
        line.push_str(&visitor.fields);
    }
    let chars = line.chars().count();
    if chars > MAX_LINE_CHARS {
        let cut: String = line.chars().take(MAX_LINE_CHARS).collect();
        return format!("{}... ({} chars)", cut, chars);
    }
    line
}

pub(crate) fn sink_layer(sink: Option<LogSink>) -> SinkLayer {
    SinkLayer { sink }
}

#[derive(Clone)]
pub(crate) struct SinkLayer {
    sink: Option<LogSink>,
}

impl<S> Layer<S> for SinkLayer
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let Some(sink) = &self.sink else {
            return;
        };
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        sink(format_line(event.metadata().level(), event.metadata().target(), visitor));
    }
}
