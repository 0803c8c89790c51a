use std::env;

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, Logging};

fn get_rust_log(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::OFF => "",
        LevelFilter::ERROR => "ERROR",
        LevelFilter::WARN => "WARN",
        LevelFilter::INFO => {
            "INFO,\
             hickory_proto=WARN,\
             hyper_util=WARN"
        }
        LevelFilter::DEBUG => {
            "INFO,\
             hickory_proto=WARN,\
             fetchkit_core=DEBUG,\
             fetchkit_images=DEBUG,\
             fetchkit_json=DEBUG"
        }
        LevelFilter::TRACE => {
            "INFO,\
             hickory_proto=WARN,\
             fetchkit_core=TRACE,\
             fetchkit_images=TRACE,\
             fetchkit_json=TRACE"
        }
    }
}

/// Initializes logging for applications built on fetchkit.
///
/// This considers the `RUST_LOG` environment variable and defaults it to the level specified in the
/// configuration. Fails if a global subscriber has already been installed.
pub fn init_logging(config: &Logging) -> Result<()> {
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| get_rust_log(config.level).to_string());

    let fmt_layer = {
        let layer = tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(true);

        match (config.format, console::user_attended_stderr()) {
            (LogFormat::Auto, true) | (LogFormat::Pretty, _) => {
                layer.pretty().with_writer(std::io::stderr).boxed()
            }
            (LogFormat::Auto, false) | (LogFormat::Simplified, _) => layer
                .compact()
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .boxed(),
            (LogFormat::Json, _) => layer
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stdout)
                .boxed(),
        }
    }
    .with_filter(EnvFilter::new(&rust_log));

    tracing_subscriber::registry().with(fmt_layer).try_init()?;

    Ok(())
}
