//! CLI module
//!
//! Provides command-line interface parsing for the aptos-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod config;
pub mod init;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Aptos Research Server
///
/// Answers Aptos and Move development questions by running several research
/// crews in parallel and writing one combined report.
#[derive(Parser, Debug)]
#[command(
    name = "aptos-research",
    version,
    about = "Aptos Research Server",
    long_about = "Answers Aptos and Move development questions by researching several\n\
                  documentation sources in parallel and reporting one combined answer.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a configuration.",
    after_help = "EXAMPLES:\n    \
                  aptos-research init                       # Write aptos.toml and .env.example\n    \
                  aptos-research                            # Start the server (requires aptos.toml)\n    \
                  aptos-research ask \"What are Move resources?\"\n    \
                  aptos-research config --validate          # Check aptos.toml\n    \
                  aptos-research --config my.toml serve     # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "aptos.toml", global = true, env = "APTOS_RESEARCH_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute; defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,

    /// Research a single question and print the report
    Ask {
        /// The question to research
        question: String,
    },

    /// Show configuration information
    Config {
        /// Show agents, tasks and sources in full
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file and list warnings
        #[arg(long)]
        validate: bool,
    },

    /// Write a starter aptos.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure
        #[arg(long, value_enum, default_value_t = InitProvider::Ollama)]
        provider: InitProvider,

        /// Host address for the server
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8007")]
        port: u16,
    },
}

/// Provider choices offered by `init`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitProvider {
    Ollama,
    Openai,
    Both,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::try_parse_from(["aptos-research"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("aptos.toml"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_ask_with_global_flags() {
        let cli = Cli::try_parse_from([
            "aptos-research",
            "ask",
            "What are Move resources?",
            "--config",
            "custom.toml",
            "--no-color",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(cli.no_color);
        match cli.command {
            Some(Commands::Ask { question }) => assert_eq!(question, "What are Move resources?"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_provider_parsing() {
        let cli =
            Cli::try_parse_from(["aptos-research", "init", "proj", "--provider", "openai"]).unwrap();
        match cli.command {
            Some(Commands::Init {
                path,
                provider,
                port,
                ..
            }) => {
                assert_eq!(path, PathBuf::from("proj"));
                assert_eq!(provider, InitProvider::Openai);
                assert_eq!(port, 8007);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["aptos-research", "init", "--provider", "gemini"]).is_err());
    }
}
