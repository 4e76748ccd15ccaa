//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It only
//! depends on `clap` and `std` so the build script can include it to render
//! the manual page.

use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

/// Resolve, order, and clean the build output directories of a project tree.
#[derive(Debug, Parser)]
#[command(name = "buildtree", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project tree manifest.
    #[arg(short, long, value_name = "FILE", default_value = "buildtree.yml")]
    pub file: PathBuf,

    /// Change to this directory before doing anything.
    #[arg(short = 'C', long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Relocate the root build directory, overriding the manifest.
    ///
    /// Relative paths are resolved against the working directory.
    #[arg(long, value_name = "PATH", env = "BUILDTREE_RELOCATE")]
    pub relocate: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional subcommand to execute; defaults to `resolve` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Parse the provided arguments, applying the default command when needed.
    ///
    /// # Errors
    ///
    /// Returns the [`clap::Error`] describing why parsing failed.
    pub fn try_parse_from_with_default<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map(Self::with_default_command)
    }

    /// Apply the default command if none was specified.
    #[must_use]
    pub fn with_default_command(mut self) -> Self {
        if self.command.is_none() {
            self.command = Some(Commands::Resolve {
                format: OutputFormat::Text,
            });
        }
        self
    }
}

/// Output formats accepted by `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `name<TAB>path` line per project.
    #[default]
    Text,
    /// The full layout as JSON.
    Json,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Print the resolved build directory of every project (default).
    Resolve {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print subprojects in evaluation order, one per line.
    Order,

    /// Display the evaluation order constraints in DOT format.
    Graph,

    /// Delete the resolved root build directory.
    Clean {
        /// Report what would be deleted without deleting it.
        #[arg(long)]
        dry_run: bool,
    },
}
