//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - (none): interactive chat with the coordinator
//! - send: route a single message and print the answer
//! - tools: list the hospital agents the model can call

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MedCore - hospital system coordinator
#[derive(Parser, Debug)]
#[command(name = "medcore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route one message through the coordinator and print the answer
    Send {
        /// Message text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// List the tools declared to the model
    Tools {
        /// Include parameter details
        #[arg(short, long)]
        detailed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        // No args means interactive chat
        let cli = Cli::try_parse_from(["medcore"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["medcore", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["medcore", "-c", "/path/to/medcore.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/medcore.yml")));
    }

    #[test]
    fn test_send_joins_words() {
        let cli = Cli::try_parse_from(["medcore", "send", "Book", "an", "appointment"]).unwrap();
        match cli.command {
            Some(Commands::Send { message }) => {
                assert_eq!(message.join(" "), "Book an appointment");
            }
            _ => panic!("Expected send command"),
        }
    }

    #[test]
    fn test_send_requires_message() {
        assert!(Cli::try_parse_from(["medcore", "send"]).is_err());
    }

    #[test]
    fn test_tools_detailed() {
        let cli = Cli::try_parse_from(["medcore", "tools", "--detailed"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Tools { detailed: true })));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["medcore", "tools", "-v", "-c", "x.yml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
