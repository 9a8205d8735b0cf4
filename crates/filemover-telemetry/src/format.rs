//! Plain-text line format: `<timestamp> - <LEVEL> - <message>`.
//!
//! # Design
//! - Timestamps are local time with millisecond precision, `2024-03-05 11:00:00,123`.
//! - Level names follow the conventional logging vocabulary: `WARN` prints as `WARNING`, and
//!   `ERROR` events emitted under [`CRITICAL_TARGET`] print as `CRITICAL`.
//! - Structured fields follow the message as `key=value` pairs.

use std::fmt;

use chrono::Local;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Target that promotes an `error!` event to the `CRITICAL` level.
///
/// Events under this target do not carry the emitting crate's path, so filters installed by
/// [`init_logging`](crate::init_logging) always enable `critical=error` alongside any
/// `RUST_LOG` directives.
///
/// ```ignore
/// tracing::error!(target: filemover_telemetry::CRITICAL_TARGET, "configuration unusable");
/// ```
pub const CRITICAL_TARGET: &str = "critical";

/// Timestamp layout used at the start of every line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Event formatter producing one `<timestamp> - <LEVEL> - <message>` line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} - {} - ",
            Local::now().format(TIMESTAMP_FORMAT),
            level_label(event.metadata())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Level name printed for an event.
#[must_use]
pub fn level_label(metadata: &Metadata<'_>) -> &'static str {
    match *metadata.level() {
        Level::ERROR if metadata.target() == CRITICAL_TARGET => "CRITICAL",
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::{debug, error, info, warn};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .map_err(|_| io::Error::other("capture poisoned"))?
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().expect("capture lock").clone();
            String::from_utf8(bytes)
                .expect("utf8 log output")
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    fn capture(emit: impl FnOnce()) -> Vec<String> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .event_format(LineFormat)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        captured.lines()
    }

    fn split(line: &str) -> (&str, &str, &str) {
        let mut parts = line.splitn(3, " - ");
        (
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        )
    }

    #[test]
    fn lines_carry_timestamp_level_and_message() {
        let lines = capture(|| {
            info!("handler initialized");
            debug!(path = "/srv/in/a.txt", "discovered file");
        });
        assert_eq!(lines.len(), 2);

        let (timestamp, level, message) = split(&lines[0]);
        assert!(
            chrono::NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp {timestamp:?}"
        );
        assert_eq!(timestamp.len(), "2024-03-05 11:00:00,123".len());
        assert_eq!(level, "INFO");
        assert_eq!(message, "handler initialized");

        let (_, level, message) = split(&lines[1]);
        assert_eq!(level, "DEBUG");
        assert_eq!(message, "discovered file path=\"/srv/in/a.txt\"");
    }

    #[test]
    fn warning_and_critical_use_conventional_names() {
        let lines = capture(|| {
            warn!("rename failed");
            error!("copy failed");
            error!(target: CRITICAL_TARGET, "configuration unusable");
        });
        let levels: Vec<_> = lines.iter().map(|line| split(line).1).collect();
        assert_eq!(levels, vec!["WARNING", "ERROR", "CRITICAL"]);
    }
}
