use std::{env, io::Write, sync::Once};

use chrono::Local;
use env_logger::Builder as EnvLoggerBuilder;
use log::LevelFilter;

use crate::error::{HarnessError, HarnessErrorKind, HarnessResult};

static HARNESS_LOGGING_INIT: Once = Once::new();

/// Installs the harness logger once per process. Does nothing unless `RUST_LOG` is set.
///
/// `RUST_LOG_FORMATTER=text_no_color` turns off level colouring, e.g. for CI logs.
pub fn init_logger() {
    HARNESS_LOGGING_INIT.call_once(|| {
        if let Ok(filters) = env::var("RUST_LOG") {
            if let Err(err) = try_init_logger(&filters) {
                eprintln!("{err}");
            }
        }
    });
}

fn try_init_logger(filters: &str) -> HarnessResult<()> {
    let colored = env::var("RUST_LOG_FORMATTER").as_deref() != Ok("text_no_color");
    EnvLoggerBuilder::new()
        .format(move |buf, record| {
            let level = record.level();
            let style = if colored {
                buf.default_level_style(level)
            } else {
                Default::default()
            };
            writeln!(
                buf,
                "{}|{style}{level:>5}{style:#}|{:<30}|{:>35}:{:<4}| {}",
                Local::now().format("%Y-%m-%d %H:%M:%S.%f"),
                record.target(),
                record.file().unwrap_or(""),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter(None, LevelFilter::Off)
        .parse_filters(filters)
        .try_init()
        .map_err(|err| {
            HarnessError::from_msg(
                HarnessErrorKind::LoggingError,
                format!("Cannot init logger: {err}"),
            )
        })
}
