//! CLI module for medcore - command-line interface and subcommands.
//!
//! Provides the main entry point with an interactive chat by default and
//! subcommands for one-shot routing and catalog listing.

pub mod commands;

pub use commands::Cli;
