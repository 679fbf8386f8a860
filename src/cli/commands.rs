//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "caserag")]
#[command(about = "Search election-law precedents and compose reference answers")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: configured level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank indexed cases by similarity to a query
    Search {
        /// Situation to look up
        query: String,
        /// Number of cases to return (default: search.default_topk)
        #[arg(short = 'k', long)]
        topk: Option<usize>,
        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },
    /// Retrieve similar cases and compose a reference answer
    Ask {
        /// Situation to look up
        query: String,
        /// Number of cases to retrieve (default: search.default_topk)
        #[arg(short = 'k', long)]
        topk: Option<usize>,
        /// Answer backend: template or generated (overrides answer.backend)
        #[arg(short, long)]
        backend: Option<String>,
        /// Model for the generated backend (overrides answer.model)
        #[arg(short, long)]
        model: Option<String>,
        /// Sampling temperature for the generated backend (overrides answer.temperature)
        #[arg(short, long)]
        temperature: Option<f32>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a summary of the loaded index
    Inspect,
    /// Show current configuration
    Config,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_overrides() {
        let cli = Cli::parse_from([
            "caserag", "-v", "ask", "banner before election day", "-k", "3", "--backend",
            "generated", "--temperature", "0.5", "--json",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Ask {
                query,
                topk,
                backend,
                model,
                temperature,
                json,
            } => {
                assert_eq!(query, "banner before election day");
                assert_eq!(topk, Some(3));
                assert_eq!(backend.as_deref(), Some("generated"));
                assert_eq!(model, None);
                assert_eq!(temperature, Some(0.5));
                assert!(json);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["caserag", "inspect", "-c", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Inspect));
    }

    #[test]
    fn test_verbose_flag_after_subcommand() {
        let cli = Cli::parse_from(["caserag", "ask", "banner", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Ask { .. }));

        let cli = Cli::parse_from(["caserag", "search", "banner", "--verbose", "-k", "2"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Search { topk: Some(2), .. }));
    }
}
