//! CLI argument definitions for Jeka.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "jeka",
    version,
    about = "Resolve Java dependencies and inspect the result",
    long_about = "Jeka resolves the dependencies declared in jeka.toml against Maven \
                  repositories and prints the resolved tree, the classpath, or the \
                  version conflicts met on the way."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to jeka.toml (default: nearest one above the current directory)
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,
}

/// Options of every command that resolves.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    /// Scope to resolve for, e.g. compile, runtime, test or compile+runtime (repeatable)
    #[arg(short, long = "scope")]
    pub scopes: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved dependency tree
    Tree {
        #[command(flatten)]
        scopes: ScopeArgs,
        /// Conflict strategy: latest-wins, strict, nearest-wins
        #[arg(long)]
        strategy: Option<String>,
        /// Maximum depth
        #[arg(long)]
        depth: Option<u32>,
        /// Exit with an error when resolution collected any
        #[arg(long)]
        assert_no_error: bool,
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved classpath
    Classpath {
        #[command(flatten)]
        scopes: ScopeArgs,
        /// Conflict strategy: latest-wins, strict, nearest-wins
        #[arg(long)]
        strategy: Option<String>,
        /// Separator between entries (default: platform path separator)
        #[arg(long)]
        separator: Option<String>,
    },

    /// Explain why a module is included
    Why {
        /// Module as group:name
        module: String,
        #[command(flatten)]
        scopes: ScopeArgs,
    },

    /// Show modules requested at more than one version
    Conflicts {
        #[command(flatten)]
        scopes: ScopeArgs,
    },
}

/// Parse command-line arguments into a [`Cli`] struct.
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn tree_flags() {
        let cli = Cli::parse_from([
            "jeka",
            "--manifest",
            "app/jeka.toml",
            "tree",
            "-s",
            "compile",
            "--scope",
            "test",
            "--depth",
            "2",
            "--assert-no-error",
        ]);
        assert_eq!(cli.manifest, Some(PathBuf::from("app/jeka.toml")));
        match cli.command {
            Command::Tree {
                scopes,
                depth,
                assert_no_error,
                json,
                ..
            } => {
                assert_eq!(scopes.scopes, vec!["compile", "test"]);
                assert_eq!(depth, Some(2));
                assert!(assert_no_error);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
