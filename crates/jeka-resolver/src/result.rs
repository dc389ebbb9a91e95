use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_util::errors::JekaError;
use serde::Serialize;
use thiserror::Error;

use crate::conflict::ConflictReport;
use crate::tree::ResolvedDependencyNode;

/// A problem with the dependency graph, collected during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResolutionError {
    /// Strict strategy: a module was requested at several versions.
    #[error("version conflict on {module}: {}", .paths.join("; "))]
    VersionConflict {
        module: ModuleId,
        versions: Vec<String>,
        /// One `a:b:1.0 > c:d:2.0` path per conflicting version.
        paths: Vec<String>,
    },

    /// No repository could provide the module.
    #[error("unresolvable module {module}{}: {reason}", .version.as_ref().map(|v| format!(":{v}")).unwrap_or_default())]
    UnresolvableModule {
        module: ModuleId,
        version: Option<String>,
        reason: String,
    },
}

impl ResolutionError {
    pub fn module(&self) -> &ModuleId {
        match self {
            ResolutionError::VersionConflict { module, .. } => module,
            ResolutionError::UnresolvableModule { module, .. } => module,
        }
    }
}

/// Outcome of one resolution: tree, classpath, and the graph errors found.
#[derive(Debug, Clone)]
pub struct ResolveResult {
    tree: ResolvedDependencyNode,
    files: Vec<PathBuf>,
    errors: Vec<ResolutionError>,
    conflicts: ConflictReport,
}

impl ResolveResult {
    pub fn new(tree: ResolvedDependencyNode, errors: Vec<ResolutionError>, conflicts: ConflictReport) -> Self {
        let files = tree.resolved_files();
        Self {
            tree,
            files,
            errors,
            conflicts,
        }
    }

    pub fn dependency_tree(&self) -> &ResolvedDependencyNode {
        &self.tree
    }

    /// The flattened classpath, without duplicates.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn conflicts(&self) -> &ConflictReport {
        &self.conflicts
    }

    /// Turn collected errors into a hard failure.
    pub fn assert_no_error(&self) -> Result<&Self, JekaError> {
        if self.errors.is_empty() {
            return Ok(self);
        }
        let lines: Vec<String> = self.errors.iter().map(|e| format!("\n  - {e}")).collect();
        Err(JekaError::Resolution {
            message: format!("{} error(s):{}", self.errors.len(), lines.concat()),
        })
    }
}
