use std::path::Path;

use time::{format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime};
use tracing::Level;
use tracing_subscriber::fmt::{
    format::{FmtSpan, Writer},
    time::FormatTime,
};
use tracing_subscriber::FmtSubscriber;

const LOG_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

struct Timer;
impl FormatTime for Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = local_now()
            .format(LOG_TIME_FORMAT)
            .map_err(|_| std::fmt::Error)?;
        write!(w, "{}", now)
    }
}

/// Local wall clock, falling back to UTC when the offset can't be determined
/// (e.g. multi-threaded processes on some unix targets).
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Logs into `<dir>/demo_charts_<name>_<timestamp>.log` through a non-blocking writer.
/// The returned guard must be held for the lifetime of the process.
pub fn file_logger(
    dir: impl AsRef<Path>,
    name: &str,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let name = if name.is_empty() {
        "".to_string()
    } else {
        name.to_string() + "_"
    };
    let stamp = local_now().format(format_description!(
        "[year]-[month]-[day]T[hour]-[minute]-[second]"
    ))?;
    let file_name = format!("demo_charts_{}{}.log", name, stamp);
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(non_blocking)
        .with_span_events(FmtSpan::CLOSE)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_timer(Timer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(guard)
}

/// Console logger. Stdout carries chart payloads, so logs go to stderr.
pub fn stderr_logger() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE)
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_timer(Timer)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[test]
fn local_now_formats() {
    let s = local_now().format(LOG_TIME_FORMAT).unwrap();
    assert_eq!(s.len(), "2024-01-01 00:00:00".len());
}
