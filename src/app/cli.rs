use std::future::Future;
use std::str::FromStr;

use tracing::{Level, error, warn};

use super::error::AppError;

/// Environment variable selecting the log level (error, warn, info, debug, trace)
pub const LOG_LEVEL_ENV: &str = "BANKLEDGER_LOG";

/// Reusable CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Stdout buffering and flushing
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM)
/// - Logging to stderr
pub struct CliApp {
    name: String,
    default_level: Level,
}

impl CliApp {
    /// Create a new CLI application runner
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_level: Level::WARN,
        }
    }

    /// Log level used when `BANKLEDGER_LOG` is unset or invalid
    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install the stderr fmt subscriber; stdout stays reserved for the snapshot
    pub fn init_tracing(&self) {
        let level = resolve_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref(), self.default_level);

        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run the CLI application with proper signal handling and resource cleanup
    ///
    /// Creates a buffered stdout writer and passes it to the main function.
    /// This function never returns - it calls std::process::exit with the appropriate code
    pub async fn run<F, Fut>(self, main_fn: F) -> !
    where
        F: FnOnce(tokio::io::BufWriter<tokio::io::Stdout>) -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        self.init_tracing();
        let writer = tokio::io::BufWriter::new(tokio::io::stdout());

        tokio::select! {
            result = main_fn(writer) => {
                match result {
                    Ok(()) => std::process::exit(0),
                    Err(e) => {
                        error!(app = %self.name, error = %e, "Run failed");
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            signal_code = wait_for_signal() => {
                std::process::exit(signal_code);
            }
        }
    }
}

fn resolve_level(raw: Option<&str>, default_level: Level) -> Level {
    raw.and_then(|value| Level::from_str(value.trim()).ok())
        .unwrap_or(default_level)
}

/// Wait for SIGINT, SIGTERM or SIGHUP (Ctrl+C elsewhere)
/// Returns the exit code to use (130 for SIGINT, 143 for SIGTERM, 129 for SIGHUP)
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (Ok(mut sigterm), Ok(mut sigint), Ok(mut sighup)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        ) else {
            warn!("Signal handlers unavailable, running without them");
            return std::future::pending().await;
        };

        tokio::select! {
            _ = sigterm.recv() => {
                warn!("Received SIGTERM");
                143 // 128 + 15
            }
            _ = sigint.recv() => {
                warn!("Received SIGINT");
                130 // 128 + 2
            }
            _ = sighup.recv() => {
                warn!("Received SIGHUP");
                129 // 128 + 1
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Ctrl+C handler unavailable, running without it");
            return std::future::pending().await;
        }
        warn!("Received Ctrl+C");
        130
    }
}
