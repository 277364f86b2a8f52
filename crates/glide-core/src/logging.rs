#![forbid(unsafe_code)]

//! Tracing subscriber bootstrap.
//!
//! Library code only emits `tracing` events. Binaries and test harnesses
//! that want output call [`init_logging`] once at startup.
//!
//! JSON output requires the `tracing-json` feature.

use tracing_subscriber::EnvFilter;

/// Output format for [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event.
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Errors from [`init_logging`].
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Install a global fmt subscriber.
///
/// `filter` uses `EnvFilter` directive syntax (`"glide_grid=debug,info"`).
/// With `None`, `RUST_LOG` is read and `info` is used if it is unset.
/// Calling this twice returns [`LoggingError::AlreadyInstalled`].
pub fn init_logging(filter: Option<&str>, format: LogFormat) -> Result<(), LoggingError> {
    let env_filter = match filter {
        Some(directives) => EnvFilter::try_new(directives).map_err(|source| LoggingError::Filter {
            filter: directives.to_owned(),
            source,
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let result = match format {
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .try_init(),
        #[cfg(feature = "tracing-json")]
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .try_init(),
    };
    result.map_err(|_| LoggingError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error() {
        let _ = init_logging(Some("glide_core=debug"), LogFormat::Plain);
        assert!(matches!(
            init_logging(None, LogFormat::Plain),
            Err(LoggingError::AlreadyInstalled)
        ));
    }
}
