//! Command dispatch and handler modules.

mod classpath;
mod conflicts;
mod tree;
mod why;

use std::path::PathBuf;

use jeka_ops::ResolveOptions;
use miette::Result;

use crate::cli::{Cli, Command, ScopeArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let manifest = cli.manifest;
    match cli.command {
        Command::Tree {
            scopes,
            strategy,
            depth,
            assert_no_error,
            json,
        } => tree::exec(
            resolve_options(manifest, scopes, strategy),
            depth,
            assert_no_error,
            json,
        ),
        Command::Classpath {
            scopes,
            strategy,
            separator,
        } => classpath::exec(resolve_options(manifest, scopes, strategy), separator),
        Command::Why { module, scopes } => why::exec(resolve_options(manifest, scopes, None), module),
        Command::Conflicts { scopes } => conflicts::exec(resolve_options(manifest, scopes, None)),
    }
}

fn resolve_options(manifest: Option<PathBuf>, scopes: ScopeArgs, strategy: Option<String>) -> ResolveOptions {
    ResolveOptions {
        manifest,
        scopes: scopes.scopes,
        strategy,
    }
}
