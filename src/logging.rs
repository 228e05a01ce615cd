use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; `debug` enables debug
/// output and lets `RUST_LOG` override the level.
///
/// With `log_file` set, output is appended to that file instead of stdout.
pub fn init(debug: bool, log_file: Option<&Path>) {
    // When debug logging is disabled we force `info` level regardless of the
    // `RUST_LOG` environment variable.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let appender = log_file.and_then(|path| match file_appender(path) {
        Ok(appender) => Some(appender),
        Err(err) => {
            eprintln!("cannot open log file {}: {err}", path.display());
            None
        }
    });
    let _ = match appender {
        Some(appender) => builder.with_ansi(false).with_writer(appender).try_init(),
        None => builder.try_init(),
    };
}

fn file_appender(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let (dir, name) = split_log_path(path)
        .ok_or_else(|| anyhow::anyhow!("log path has no file name"))?;
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy().into_owned())
        .build(dir)?)
}

fn split_log_path(path: &Path) -> Option<(&Path, &std::ffi::OsStr)> {
    let name = path.file_name()?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Some((dir, name))
}
