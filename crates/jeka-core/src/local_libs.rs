//! Dependencies taken from a local library directory.
//!
//! ```text
//! libs/
//!   *.jar                  compile
//!   compile/*.jar          compile
//!   runtime/*.jar          runtime
//!   compile+runtime/*.jar  compile, runtime
//!   provided/*.jar         provided
//!   test/*.jar             test
//! ```

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use jeka_util::errors::JekaError;

use crate::dependency_set::DependencySet;
use crate::scope::Scope;

const DEFAULT_PATTERNS: &[&str] = &["*.jar"];

/// Scan `dir` with the default `*.jar` pattern.
pub fn scan(dir: &Path) -> Result<DependencySet, JekaError> {
    scan_with(dir, DEFAULT_PATTERNS)
}

/// Scan `dir`, keeping files whose name matches one of `patterns`.
///
/// A missing directory yields an empty set.
pub fn scan_with(dir: &Path, patterns: &[&str]) -> Result<DependencySet, JekaError> {
    let matcher = build_matcher(patterns)?;
    let layout: [(&str, Vec<Scope>); 6] = [
        ("", vec![Scope::compile()]),
        ("compile", vec![Scope::compile()]),
        ("runtime", vec![Scope::runtime()]),
        ("compile+runtime", vec![Scope::compile(), Scope::runtime()]),
        ("provided", vec![Scope::provided()]),
        ("test", vec![Scope::test()]),
    ];

    let mut set = DependencySet::of();
    for (sub, scopes) in layout {
        let files = matching_files(&dir.join(sub), &matcher)?;
        if !files.is_empty() {
            tracing::debug!(dir = %dir.join(sub).display(), count = files.len(), "local libs");
            set = set.and_files(files, &scopes);
        }
    }
    Ok(set)
}

fn build_matcher(patterns: &[&str]) -> Result<GlobSet, JekaError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| JekaError::Config {
            message: format!("invalid lib pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| JekaError::Config {
        message: format!("failed to build lib patterns: {e}"),
    })
}

fn matching_files(dir: &Path, matcher: &GlobSet) -> Result<Vec<PathBuf>, JekaError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_name().is_some_and(|name| matcher.is_match(name)))
        .collect();
    files.sort();
    Ok(files)
}
