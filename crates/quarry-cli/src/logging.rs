//! Terminal logging for the `quarry` binary.
//!
//! Row tables and status lines are logged at INFO and land on stdout
//! untagged. Every other level is tagged and written to stderr. With
//! `--json` the data itself is printed as JSON on stdout, so all log output
//! moves to stderr as JSON lines.

use std::{fmt::Write as _, io};

use nu_ansi_term::Color::{Blue, Magenta, Red, Yellow};
use tracing::{field::Field, Event, Level, Metadata, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
};

use crate::{cli::Args, utils::Colored};

const TARGETS: [&str; 3] = ["quarry", "quarry_db", "quarry_config"];

/// Collects the event message followed by any structured `key=value` fields.
#[derive(Default)]
struct EventText(String);

impl tracing::field::Visit for EventText {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let sep = if self.0.is_empty() { "" } else { " " };
        let _ = match field.name() {
            "message" => write!(self.0, "{sep}{value:?}"),
            name if name.starts_with("log.") => Ok(()),
            name => write!(self.0, "{sep}{name}={value:?}"),
        };
    }
}

fn level_tag(level: Level) -> Option<Colored<&'static str>> {
    match level {
        Level::TRACE => Some(Colored(Magenta, "[TRACE]")),
        Level::DEBUG => Some(Colored(Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some(Colored(Yellow, "[WARN]")),
        Level::ERROR => Some(Colored(Red, "[ERROR]")),
    }
}

pub struct QuarryFormatter;

impl<S, N> FormatEvent<S, N> for QuarryFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut text = EventText::default();
        event.record(&mut text);

        if let Some(tag) = level_tag(*event.metadata().level()) {
            write!(writer, "{tag} ")?;
        }
        writeln!(writer, "{}", text.0)
    }
}

/// Where log lines go.
#[derive(Clone, Copy)]
struct Output {
    info_to_stdout: bool,
}

enum Sink {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
}

impl io::Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Stdout(out) => out.write(buf),
            Sink::Stderr(err) => err.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Stdout(out) => out.flush(),
            Sink::Stderr(err) => err.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for Output {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        Sink::Stderr(io::stderr())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if self.info_to_stdout && *meta.level() == Level::INFO {
            Sink::Stdout(io::stdout())
        } else {
            Sink::Stderr(io::stderr())
        }
    }
}

fn filter_level(args: &Args) -> Level {
    match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

fn env_filter(level: Level) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn setup_logging(args: &Args) {
    let output = Output {
        info_to_stdout: !args.json,
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(filter_level(args)))
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(output)
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(QuarryFormatter).finish())
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed");
    }
}
