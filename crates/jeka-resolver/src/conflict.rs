//! Conflict resolution strategies and the version conflict report.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use jeka_core::module_id::ModuleId;
use jeka_core::version;
use jeka_util::errors::JekaError;
use serde::{Deserialize, Serialize};

/// Policy picking one version when a module appears at several versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// The highest version wins.
    #[default]
    LatestWins,
    /// Distinct versions of one module are an error.
    Strict,
    /// The occurrence closest to the root wins.
    NearestWins,
}

/// One occurrence of a module taking part in an election.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    pub version: &'a str,
    pub depth: usize,
    /// Pre-order position in the graph.
    pub order: usize,
    pub forced: bool,
}

impl ConflictStrategy {
    pub const ALL: [ConflictStrategy; 3] = [
        ConflictStrategy::LatestWins,
        ConflictStrategy::Strict,
        ConflictStrategy::NearestWins,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConflictStrategy::LatestWins => "latest-wins",
            ConflictStrategy::Strict => "strict",
            ConflictStrategy::NearestWins => "nearest-wins",
        }
    }

    pub fn is_strict(self) -> bool {
        self == ConflictStrategy::Strict
    }

    /// The winning version among `occurrences`.
    ///
    /// Forced occurrences beat everything else. Ties on version go to the
    /// shallowest occurrence, then to the first declared one. `Strict` elects
    /// like `LatestWins`; reporting the conflict is up to the caller.
    pub fn select<'a>(self, occurrences: &[Occurrence<'a>]) -> Option<&'a str> {
        let forced: Vec<&Occurrence<'a>> = occurrences.iter().filter(|o| o.forced).collect();
        if let Some(first) = forced.iter().min_by_key(|o| (o.depth, o.order)) {
            return Some(first.version);
        }
        let winner = match self {
            ConflictStrategy::LatestWins | ConflictStrategy::Strict => {
                occurrences.iter().max_by(|a, b| latest_first(a, b))
            }
            ConflictStrategy::NearestWins => occurrences.iter().min_by_key(|o| (o.depth, o.order)),
        };
        winner.map(|o| o.version)
    }
}

/// Greater means preferred: higher version, then shallower, then earlier.
fn latest_first(a: &Occurrence<'_>, b: &Occurrence<'_>) -> Ordering {
    version::compare(a.version, b.version)
        .then(b.depth.cmp(&a.depth))
        .then(b.order.cmp(&a.order))
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConflictStrategy {
    type Err = JekaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        ConflictStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == normalized)
            .ok_or_else(|| JekaError::Config {
                message: format!(
                    "unknown conflict strategy '{s}' (expected latest-wins, strict or nearest-wins)"
                ),
            })
    }
}

/// A report of all version conflicts encountered during resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<VersionConflict>,
}

/// A module requested at more than one version, with the version kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionConflict {
    pub module: ModuleId,
    /// Distinct requested versions, ascending.
    pub requested: Vec<String>,
    pub resolved: String,
    pub strategy: ConflictStrategy,
}

impl VersionConflict {
    /// Requested versions that lost.
    pub fn evicted(&self) -> impl Iterator<Item = &str> {
        self.requested
            .iter()
            .map(String::as_str)
            .filter(move |v| *v != self.resolved)
    }
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, conflict: VersionConflict) {
        self.conflicts.push(conflict);
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn get(&self, module: &ModuleId) -> Option<&VersionConflict> {
        self.conflicts.iter().find(|c| &c.module == module)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requested {} -> {} ({})",
            self.module,
            self.requested.join(", "),
            self.resolved,
            self.strategy
        )
    }
}
