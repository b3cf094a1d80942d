//! Tracing subscriber setup: console layer on stderr plus an optional
//! JSON-lines file layer from `[logging]`.

use std::path::Path;

use dispenser_config::Logging;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LEVEL: &str = "info";

/// `--log-level` if given, else `[logging].level`, else `info`.
pub fn effective_level<'a>(cli_level: Option<&'a str>, cfg_level: Option<&'a str>) -> &'a str {
    cli_level.or(cfg_level).unwrap_or(DEFAULT_LEVEL)
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_logging(
    json: bool,
    cli_level: Option<&str>,
    cfg: &Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(effective_level(cli_level, cfg.level.as_deref()))?,
    };

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file, guard) = match cfg.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let appender = match cfg.rotation.as_deref() {
                Some("daily") => rolling::daily(dir, name),
                Some("hourly") => rolling::hourly(dir, name),
                _ => rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::effective_level;
    use rstest::rstest;

    #[rstest]
    #[case(Some("info"), Some("debug"), "info")]
    #[case(Some("trace"), None, "trace")]
    #[case(None, Some("warn"), "warn")]
    #[case(None, None, "info")]
    fn explicit_flag_beats_config_level(
        #[case] cli: Option<&str>,
        #[case] cfg: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(effective_level(cli, cfg), expected);
    }
}
