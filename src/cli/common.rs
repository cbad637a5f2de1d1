//! Common utilities and traits for CLI commands

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigOverrides, GlobalConfig, ResolvedConfig};
use crate::core::user_friendly_error;
use crate::utils::home_dir;

/// Environment variable that turns on the full error chain on failure.
pub const DEBUG_ENV: &str = "VIBE_PLUGINS_DEBUG";

/// Global flags shared by every command of both binaries.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// `--config`
    pub config: Option<PathBuf>,
    /// `--plugins-root`
    pub plugins_root: Option<PathBuf>,
    /// `--presets-root`
    pub presets_root: Option<PathBuf>,
}

impl GlobalOptions {
    /// Load the configuration file and merge it with the flags.
    pub async fn resolve_config(&self) -> Result<ResolvedConfig> {
        let file = GlobalConfig::load_with_optional(self.config.clone()).await?;
        let cwd = std::env::current_dir()?;
        ResolvedConfig::resolve(
            ConfigOverrides {
                plugins_root: self.plugins_root.clone(),
                presets_root: self.presets_root.clone(),
            },
            file,
            &cwd,
            home_dir(),
        )
    }
}

/// Common trait for CLI command execution pattern
pub trait CommandExecutor: Sized {
    /// Resolve the configuration from the global flags, then run the command.
    fn execute(self, global: GlobalOptions) -> impl std::future::Future<Output = Result<()>> + Send
    where
        Self: Send,
    {
        async move {
            let config = global.resolve_config().await?;
            tracing::debug!("Plugins root: {}", config.plugins_root.display());
            self.execute_with_config(config).await
        }
    }

    /// Run the command against an already resolved configuration.
    fn execute_with_config(
        self,
        config: ResolvedConfig,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Set up the stderr log subscriber.
///
/// `--verbose` logs at debug, `--quiet` only errors, otherwise info. `RUST_LOG` wins
/// when set.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}

/// Print `error` for the user and exit with status 1.
///
/// The full error chain follows the friendly message when `verbose` is set or
/// [`DEBUG_ENV`] is present in the environment.
pub fn exit_with_error(error: anyhow::Error, verbose: bool) -> ! {
    let debug = verbose || std::env::var_os(DEBUG_ENV).is_some();
    let chain = debug.then(|| format!("{error:?}"));

    user_friendly_error(error).display();
    if let Some(chain) = chain {
        eprintln!("\n{}\n{chain}", "debug:".dimmed());
    }
    std::process::exit(1);
}
