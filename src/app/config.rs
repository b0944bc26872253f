use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_MAX_DEPTH, EXCLUDED_DIRS, FILE_EXTENSIONS, STATE_FILE_NAME};
use crate::index::ScanOptions;
use crate::tui::{ColorMode, ThemeName};

const LOCAL_CONFIG: &str = ".marktree/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,

    /// What the scan looks at
    #[serde(default)]
    pub scan: ScanConfig,

    /// Persisted state location
    #[serde(default)]
    pub state: StateConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme, used until one is picked with `T`
    pub theme: ThemeName,
    /// `color` or `mono`
    pub color_mode: ColorMode,
    /// Dim rows outside the focused row's sibling layer
    pub dim_non_active_depth: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            color_mode: ColorMode::Color,
            dim_non_active_depth: true,
        }
    }
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions to count, without the dot; empty means all files
    pub file_extensions: Vec<String>,
    /// Directory names never descended into
    pub excluded_dirs: Vec<String>,
    pub max_depth: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            file_extensions: FILE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            excluded_dirs: EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ScanConfig {
    pub fn to_options(&self) -> ScanOptions {
        ScanOptions {
            file_extensions: self
                .file_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            excluded_dirs: self.excluded_dirs.clone(),
            max_depth: self.max_depth,
        }
    }
}

/// State configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// State file; defaults to `state.json` in the data directory
    pub file: Option<PathBuf>,
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    load_config_from(None)
}

/// Load configuration; an explicit file replaces the global and local files
pub fn load_config_from(explicit: Option<&Path>) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let global_config = get_config_dir()?.join("config.toml");
            if global_config.exists() {
                figment = figment.merge(Toml::file(&global_config));
            }

            let local_config = PathBuf::from(LOCAL_CONFIG);
            if local_config.exists() {
                figment = figment.merge(Toml::file(&local_config));
            }
        }
    }

    // Environment variables, e.g. MARKTREE_UI__THEME=light
    figment = figment.merge(Env::prefixed("MARKTREE_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "marktree")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = project_dirs() {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        // Fallback to home directory
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("marktree"))
    }
}

/// Directory for the log file
pub fn get_cache_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .context("Could not determine a cache directory")
}

/// Where persisted state lives: the configured file or the data directory
pub fn state_file_path(config: &Config) -> Result<PathBuf> {
    if let Some(file) = &config.state.file {
        return Ok(file.clone());
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().join(STATE_FILE_NAME))
        .context("Could not determine a data directory")
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = if let Some(p) = path {
        p
    } else {
        get_config_dir()?.join("config.toml")
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
pub fn init_config() -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    let config_file = get_config_dir()?.join("config.toml");
    if !config_file.exists() {
        save_config(&Config::default(), Some(config_file.clone()))?;
        created.push(config_file);
    }

    // Create example local config
    let local_example = PathBuf::from(".marktree/config.toml.example");
    if !local_example.exists() {
        if let Some(parent) = local_example.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let example_config = r#"# marktree project configuration
# This file overrides global settings for this project

[ui]
theme = "high-contrast"
color_mode = "color"
dim_non_active_depth = true

[scan]
file_extensions = ["js", "ts", "jsx", "tsx", "mjs"]
excluded_dirs = ["node_modules", "dist"]
max_depth = 8
"#;
        std::fs::write(&local_example, example_config)?;
        created.push(local_example);
    }

    Ok(created)
}
