use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install the console and file log sinks for the current thread.
///
/// Logging stays active until the returned guard is dropped. `RUST_LOG`, when set,
/// replaces `log_level`.
pub fn init(log_file: &Path, log_level: &str) -> io::Result<DefaultGuard> {
    let log_level = Level::from_str(log_level.to_lowercase().as_str()).unwrap_or(Level::DEBUG);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .event_format(PlainFormat)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), log_level));

    Ok(tracing::subscriber::set_default(subscriber))
}

/// `log_level` applies only when `rust_log` holds no valid directive
fn env_filter(rust_log: Option<&str>, log_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(log_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

/// `timestamp - LEVEL - message`
struct PlainFormat;

impl<S, N> FormatEvent<S, N> for PlainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        SystemTime.format_time(&mut writer)?;
        write!(writer, " - {} - ", event.metadata().level())?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}
