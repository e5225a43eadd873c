//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Partial rendering pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: partials.toml)
    #[arg(short = 'C', long, default_value = "partials.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every document, resolve partials and write the output
    Build {
        /// Clean output directory completely before building
        #[arg(long)]
        clean: bool,
    },

    /// Remove the generated-artifacts directory below the partials root
    Clean,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_clean(&self) -> bool {
        matches!(self.command, Commands::Clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["tola-partials", "--root", "site", "build", "--clean"]);
        assert!(cli.is_build());
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert_eq!(cli.config, PathBuf::from("partials.toml"));
        assert!(matches!(cli.command, Commands::Build { clean: true }));
    }

    #[test]
    fn test_parse_clean_with_config() {
        let cli = Cli::parse_from(["tola-partials", "-C", "site.toml", "clean"]);
        assert!(cli.is_clean());
        assert_eq!(cli.config, PathBuf::from("site.toml"));
    }
}
