use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "marktree")]
#[command(version)]
#[command(
    about = "Browse a source tree with per-file and per-directory marker counts",
    long_about = None
)]
pub struct Cli {
    /// Directory to browse (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Path to configuration file (replaces global and project config files)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Color theme (dark, light, high-contrast)
    #[arg(long)]
    pub theme: Option<String>,

    /// Disable colors
    #[arg(long)]
    pub mono: bool,

    /// Deepest directory level listed below the root
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    /// State file holding the chosen markers and theme
    #[arg(long, env = "MARKTREE_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Count markers without the UI and print the busiest paths
    Scan {
        /// Directory to scan (defaults to current directory)
        path: Option<PathBuf>,

        /// Marker to count; repeat for several (defaults to the saved markers)
        #[arg(short, long = "pattern")]
        patterns: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::parse_from([
            "marktree", "scan", "web", "-p", "TODO:", "--pattern", "FIXME", "--format", "json",
        ]);
        match cli.command {
            Some(Commands::Scan {
                path,
                patterns,
                format,
            }) => {
                assert_eq!(path, Some(PathBuf::from("web")));
                assert_eq!(patterns, vec!["TODO:".to_string(), "FIXME".to_string()]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_browse_arguments() {
        let cli = Cli::parse_from(["marktree", "src", "--mono", "--theme", "light"]);
        assert_eq!(cli.path, Some(PathBuf::from("src")));
        assert!(cli.mono);
        assert_eq!(cli.theme.as_deref(), Some("light"));
        assert!(cli.command.is_none());
    }
}
