use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Installs the stderr `tracing` subscriber once per process. `RUST_LOG`
/// overrides the level picked from `--debug`.
pub struct Logger {
    debug: bool,
}

impl Logger {
    pub fn init(debug: bool) {
        let _ = LOGGER.get_or_init(|| {
            let level = if debug { "debug" } else { "warn" };
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("qarun={level},qarun_lib={level}")));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .try_init();
            Logger { debug }
        });
    }

    pub fn is_debug() -> bool {
        LOGGER.get().is_some_and(|logger| logger.debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_init_is_idempotent() {
        Logger::init(true);
        Logger::init(false);
        assert!(Logger::is_debug());
        tracing::debug!("logger test message");
    }
}
