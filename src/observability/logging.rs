//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once at startup
//! - Render events as `<timestamp> - <LEVEL> - <message>: k=v ...`
//! - Offer JSON output for log shippers
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging; call sites attach fields,
//!   the formatter decides how they are laid out
//! - Log level configurable via config, overridden by `RUST_LOG`

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Event formatter producing `<timestamp> - <LEVEL> - <message>: k=v k=v`.
///
/// The message comes first; remaining fields follow in call-site order. An
/// event without extra fields is rendered as the bare message.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        SystemTime.format_time(&mut writer)?;
        write!(writer, " - {} - ", event.metadata().level())?;

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        writer.write_str(&visitor.message)?;
        if !visitor.fields.is_empty() {
            write!(writer, ": {}", visitor.fields)?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn push(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if field.name() == "message" {
            let _ = self.message.write_fmt(value);
            return;
        }
        if field.name().starts_with("log.") {
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{value}"));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format_args!("{value:?}"));
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Line-format layer writing to `writer`.
pub fn line_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(writer)
}

/// JSON layer writing to `writer`. Each event carries its fields and the
/// current span, so `trace_id` appears on nested events too.
pub fn json_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_writer(writer)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    match config.format {
        LogFormat::Line => registry.with(line_layer(std::io::stdout)).try_init(),
        LogFormat::Json => registry.with(json_layer(std::io::stdout)).try_init(),
    }
}

/// A line-format subscriber writing to `writer`, for scoped use with
/// `tracing::subscriber::set_default`.
pub fn line_subscriber<W>(writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(line_layer(writer))
}

/// A JSON subscriber writing to `writer`, for scoped use.
pub fn json_subscriber<W>(writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(json_layer(writer))
}
