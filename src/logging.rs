//! Tracing setup for the mnemo binary.

use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mnemo_config::LoggingConfig;

static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`. Console output goes to stderr so command
/// output on stdout stays machine-readable. With `logging.dir` set, a daily rolling
/// file layer is added as well.
pub(crate) fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .boxed();

    let file = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("mnemo")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = GUARD.set(guard);

            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            Some(if config.json {
                layer.json().boxed()
            } else {
                layer.boxed()
            })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()?;

    Ok(())
}
