use core::fmt;
use std::fs::OpenOptions;
use std::io;
use std::sync::Once;

use tracing::field::{Field, Visit};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::{FormatFields, Writer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tracingfmt};

/// if `cond` is false, logs a warning with your message.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

/// Field formatter that gives the decoding round its own column.
///
/// Events carrying an `iter` field print as `it    3 | message k=v`, all
/// others leave the column blank, so per-round traces line up under each other.
pub struct RoundFields;

#[derive(Default)]
struct RoundVisitor {
    iter: Option<u64>,
    message: String,
    rest: Vec<String>,
}

impl Visit for RoundVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "iter" {
            self.iter = Some(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            "iter" => self.iter = format!("{:?}", value).parse().ok(),
            name => self.rest.push(format!("{}={:?}", name, value)),
        }
    }
}

impl<'writer> FormatFields<'writer> for RoundFields {
    fn format_fields<R: RecordFields>(&self, mut writer: Writer<'writer>, fields: R) -> fmt::Result {
        let mut visitor = RoundVisitor::default();
        fields.record(&mut visitor);

        match visitor.iter {
            Some(iter) => write!(writer, "it {:>4} | ", iter)?,
            None => write!(writer, "        | ")?,
        }
        write!(writer, "{}", visitor.message)?;
        for field in &visitor.rest {
            write!(writer, " {}", field)?;
        }
        Ok(())
    }
}

static INIT_LOG: Once = Once::new();

/// Sets up logging with maximum verbosity (trace level)
/// Mainly for unit tests
pub fn setup_logging_verbose() {
    INIT_LOG.call_once(|| {
        tracing_subscriber::registry()
            .with(stderr_layer().with_filter(EnvFilter::new("trace")))
            .init();
    });
}

/// Sets up default logging to stderr and optionally, a trace-level log file.
/// Returns a guard that needs to be kept alive for logging to file to work.
/// Fails only if the log file cannot be opened.
pub fn setup_logging_default(verbose_logfile: Option<String>) -> io::Result<Option<WorkerGuard>> {
    let Some(path) = verbose_logfile else {
        INIT_LOG.call_once(|| {
            tracing_subscriber::registry()
                .with(stderr_layer().with_filter(get_default_stderr_filter()))
                .init();
        });
        return Ok(None);
    };

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    INIT_LOG.call_once(|| {
        let file_layer = tracingfmt::layer()
            .fmt_fields(RoundFields)
            .with_timer(tracingfmt::time::uptime())
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(file_writer);

        tracing_subscriber::registry()
            .with(file_layer.with_filter(EnvFilter::new("trace")))
            .with(stderr_layer().with_filter(get_default_stderr_filter()))
            .init();
    });
    tracing::debug!("verbose log in {}", path);

    Ok(Some(guard))
}

// Per-round syndrome traces are only interesting in the log file
const STDERR_DIRECTIVES: [&str; 4] =
    ["ldpc_bp::decoder=info", "ldpc_bp::graph=info", "ldpc_bp::node=warn", "ldpc_config=info"];

pub fn get_default_stderr_filter() -> EnvFilter {
    STDERR_DIRECTIVES
        .iter()
        .filter_map(|d| d.parse().ok())
        .fold(EnvFilter::new("info"), |filter, directive| filter.add_directive(directive))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracingfmt::layer()
        .fmt_fields(RoundFields)
        .without_time()
        .with_target(true)
        .with_line_number(true)
        .with_writer(io::stderr)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_round_column() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .fmt_fields(RoundFields)
            .with_max_level(tracing::Level::TRACE)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!(iter = 3usize, "syndrome weight {}", 2);
            tracing::info!(rows = 5, "loaded");
        });

        let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("it    3 | syndrome weight 2"), "{}", lines[0]);
        assert!(lines[1].ends_with("        | loaded rows=5"), "{}", lines[1]);
        assert!(!out.contains("iter="));
    }

    #[test]
    fn test_stderr_directives_parse() {
        for d in STDERR_DIRECTIVES {
            assert!(d.parse::<tracing_subscriber::filter::Directive>().is_ok(), "{}", d);
        }
    }
}
