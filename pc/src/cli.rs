//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Pitchcraft - startup pitches and scaffolding prompts from an idea
#[derive(Parser)]
#[command(
    name = "pc",
    about = "Generate startup pitches and AI scaffolding prompts from an idea",
    version,
    after_help = after_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Generate a pitch (name, elevator pitch, slides)
    Pitch {
        /// Startup idea
        idea: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate a full scaffolding prompt
    CodePrompt {
        /// Startup idea
        idea: String,

        /// JSON file with pitch data ({name, elevator, slides})
        #[arg(short, long, value_name = "FILE")]
        pitch_file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Generate a quick, condensed build prompt
    BuildPrompt {
        /// Startup idea (at most 500 characters)
        idea: String,

        /// JSON file with pitch data ({name, elevator, slides})
        #[arg(short, long, value_name = "FILE")]
        pitch_file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List stored pitches, newest first
    History {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Pitches per page
        #[arg(long, default_value_t = crate::store::DEFAULT_PAGE_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for generated results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}

/// Path of the log file written by every command
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pitchcraft")
        .join("logs")
        .join("pitchcraft.log")
}

fn after_help() -> String {
    format!(
        "The API key is read from the environment variable named by llm.api-key-env (default OPENAI_API_KEY).\n\
         Without it, pitch generation is disabled and prompts come from built-in templates.\n\n\
         Logs are written to: {}",
        get_log_path().display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_code_prompt() {
        let cli = Cli::try_parse_from([
            "pc",
            "code-prompt",
            "A marketplace for camping gear",
            "--pitch-file",
            "pitch.json",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::CodePrompt {
                idea,
                pitch_file,
                format,
            } => {
                assert_eq!(idea, "A marketplace for camping gear");
                assert_eq!(pitch_file, Some(PathBuf::from("pitch.json")));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("Expected CodePrompt, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pc", "serve", "--bind", "0.0.0.0:8080", "-l", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Command::Serve { bind: Some(ref b) } if b == "0.0.0.0:8080"));
    }

    #[test]
    fn test_history_defaults() {
        let cli = Cli::try_parse_from(["pc", "history"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History { page: 1, limit: crate::store::DEFAULT_PAGE_LIMIT, .. }
        ));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
