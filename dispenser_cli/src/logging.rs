//! Tracing setup: console output plus an optional JSON-lines file sink.

use std::path::Path;

use eyre::WrapErr;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::FILE_GUARD;

pub fn init(
    log_level: Option<&str>,
    json_console: bool,
    logging: &dispenser_config::Logging,
) -> eyre::Result<()> {
    // Precedence: RUST_LOG, then an explicit --log-level, then the
    // config file, then "info".
    let level = log_level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let console_pretty =
        (!json_console).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let console_json = json_console.then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file:?}"))?;
            let dir = dir.unwrap_or_else(|| Path::new("."));
            let appender = match logging.rotation.as_deref() {
                Some("daily") => rolling::daily(dir, name),
                Some("hourly") => rolling::hourly(dir, name),
                None | Some("never") => rolling::never(dir, name),
                Some(other) => eyre::bail!("logging.rotation must be never|daily|hourly, got {other:?}"),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_pretty)
        .with(console_json)
        .with(file_layer)
        .init();
    Ok(())
}
