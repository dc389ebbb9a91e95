pub mod ops_classpath;
pub mod ops_conflicts;
pub mod ops_tree;
pub mod ops_why;
pub mod project;

use std::path::PathBuf;

/// Options shared by every operation that runs a resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Explicit manifest path; otherwise `jeka.toml` is searched upwards
    /// from the current directory.
    pub manifest: Option<PathBuf>,
    /// Scope names, each possibly `compile+runtime`. Empty means every declared scope.
    pub scopes: Vec<String>,
    /// Overrides `[resolution] conflict-strategy`.
    pub strategy: Option<String>,
}
