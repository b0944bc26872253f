use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::{
    app::{get_cache_dir, load_config_from, state_file_path, Config},
    cli::{handle_command, Cli, Commands, OutputFormat},
    constants::LOG_FILE_NAME,
    index::PatternSet,
    state::StateStore,
    tui::{
        load_patterns, load_theme, run_ui, App, AppSettings, ColorMode, TerminalCapability,
        ThemeName,
    },
    utils::{init_logger, LogTarget, MarktreeError},
};

use super::NonInteractiveRunner;

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        // An explicit --config must load; otherwise fall back to defaults
        let mut config = match (&cli.config, load_config_from(cli.config.as_deref())) {
            (_, Ok(cfg)) => cfg,
            (Some(_), Err(e)) => return Err(e),
            (None, Err(e)) => {
                eprintln!("Failed to load config: {:#}. Using defaults.", e);
                Config::default()
            }
        };

        if let Some(max_depth) = cli.max_depth {
            config.scan.max_depth = max_depth;
        }
        if let Some(state_file) = &cli.state_file {
            config.state.file = Some(state_file.clone());
        }
        if cli.mono {
            config.ui.color_mode = ColorMode::Mono;
        }

        Ok(Self { cli, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        match &self.cli.command {
            Some(Commands::Scan {
                path,
                patterns,
                format,
            }) => self.run_scan(path.clone(), patterns, *format),
            Some(command) => {
                handle_command(command)?;
                Ok(())
            }
            None => self.run_interactive().await,
        }
    }

    fn open_store(&self) -> Result<StateStore> {
        let path = state_file_path(&self.config)?;
        debug!("State file: {}", path.display());
        Ok(StateStore::new(path))
    }

    fn run_scan(
        &self,
        path: Option<PathBuf>,
        patterns: &[String],
        format: OutputFormat,
    ) -> Result<()> {
        init_logger(LogTarget::Stderr, self.cli.verbose)?;

        let patterns = if patterns.is_empty() {
            load_patterns(&self.open_store()?)
        } else {
            PatternSet::new(patterns).map_err(MarktreeError::from)?
        };

        let root = path.unwrap_or_else(|| PathBuf::from("."));
        let runner = NonInteractiveRunner::new(root, patterns, self.config.scan.to_options())?;
        let result = runner.execute()?;
        println!("{}", runner.format_result(&result, format));
        Ok(())
    }

    async fn run_interactive(&self) -> Result<()> {
        let log_path = get_cache_dir()?.join(LOG_FILE_NAME);
        init_logger(LogTarget::File(log_path), self.cli.verbose)?;

        let root = self
            .cli
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let root = root
            .canonicalize()
            .with_context(|| format!("Cannot open {}", root.display()))?;
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {}", root.display());
        }

        let store = self.open_store()?;
        // CLI flag > last theme picked with T > config
        let theme = match &self.cli.theme {
            Some(name) => name
                .parse::<ThemeName>()
                .map_err(MarktreeError::ConfigError)?,
            None => load_theme(&store, self.config.ui.theme),
        };

        let settings = AppSettings {
            root,
            options: self.config.scan.to_options(),
            theme,
            color_mode: self.config.ui.color_mode,
            capability: TerminalCapability::detect(),
            dim_non_active_depth: self.config.ui.dim_non_active_depth,
        };
        info!(
            "Browsing {} with theme {} ({:?})",
            settings.root.display(),
            settings.theme,
            settings.capability
        );

        let app = App::new(settings, store);
        let result = run_ui(app).await;
        if let Err(e) = &result {
            warn!("UI exited with error: {:#}", e);
        }
        result
    }
}
