//! The declarative, immutable dependency set.
//!
//! Every builder method returns a new set and leaves the receiver untouched.
//! Duplicate declarations are kept as declared; [`DependencySet::normalised`]
//! is the only place where they are collapsed.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

use jeka_util::errors::JekaError;
use serde::{Deserialize, Serialize};

use crate::dependency::{ComputedDependency, Dependency, DependencyKey, Exclusion, FileDependency, ModuleDependency};
use crate::module_id::ModuleId;
use crate::scope::{Scope, ScopeMapping};
use crate::scoped_dependency::{Qualifier, ScopedDependency};
use crate::version::{self, Version};
use crate::version_provider::VersionProvider;

/// How [`DependencySet::normalised`] picks among duplicate declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateStrategy {
    #[default]
    KeepFirst,
    KeepLast,
    /// Keep the declaration with the highest version; undeclared versions rank lowest.
    KeepHighestVersion,
}

#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    entries: Vec<ScopedDependency>,
    version_provider: VersionProvider,
    global_exclusions: Vec<Exclusion>,
}

impl DependencySet {
    /// An empty set.
    pub fn of() -> Self {
        Self::default()
    }

    /// Return a new set with `dependency` appended for `scopes`.
    pub fn and(&self, dependency: impl Into<Dependency>, scopes: &[Scope]) -> Self {
        self.and_scoped(ScopedDependency::of_scopes(dependency, scopes))
    }

    /// Return a new set with `dependency` appended under `mapping`.
    pub fn and_mapped(&self, dependency: impl Into<Dependency>, mapping: ScopeMapping) -> Self {
        self.and_scoped(ScopedDependency::of_mapping(dependency, mapping))
    }

    pub fn and_scoped(&self, scoped: ScopedDependency) -> Self {
        let mut next = self.clone();
        next.entries.push(scoped);
        next
    }

    /// Parse `group:name[:version[:classifier]]` and append it.
    pub fn and_module(&self, coordinate: &str, scopes: &[Scope]) -> Result<Self, JekaError> {
        Ok(self.and(ModuleDependency::parse(coordinate)?, scopes))
    }

    pub fn and_files(&self, files: impl IntoIterator<Item = impl Into<PathBuf>>, scopes: &[Scope]) -> Self {
        self.and(FileDependency::of(files), scopes)
    }

    pub fn and_computed(&self, computed: ComputedDependency, scopes: &[Scope]) -> Self {
        self.and(computed, scopes)
    }

    /// Attach version overrides. They are merged over any provider already
    /// attached and win over inline versions for the same module.
    pub fn with_version_provider(&self, provider: VersionProvider) -> Self {
        for entry in &self.entries {
            let Some(module) = entry.dependency().as_module() else {
                continue;
            };
            let (Some(inline), Some(forced)) = (&module.version, provider.get(&module.module)) else {
                continue;
            };
            if inline.is_dynamic() && !forced.is_dynamic() {
                tracing::warn!(
                    module = %module.module,
                    declared = %inline,
                    forced = %forced,
                    "version provider pins a dynamic or range version"
                );
            }
        }
        let mut next = self.clone();
        next.version_provider = self.version_provider.merge(&provider);
        next
    }

    /// Return a new set that also excludes `exclusions` from every transitive path.
    pub fn with_global_exclusions(&self, exclusions: impl IntoIterator<Item = Exclusion>) -> Self {
        let mut next = self.clone();
        for exclusion in exclusions {
            if !next.global_exclusions.contains(&exclusion) {
                next.global_exclusions.push(exclusion);
            }
        }
        next
    }

    /// Concatenate `other` after this set, merging providers and exclusions.
    pub fn merge(&self, other: &DependencySet) -> Self {
        let mut next = self.with_global_exclusions(other.global_exclusions.iter().cloned());
        next.entries.extend(other.entries.iter().cloned());
        next.version_provider = next.version_provider.merge(&other.version_provider);
        next
    }

    /// Collapse entries with the same dependency and qualifier.
    ///
    /// The surviving entry takes the position of the first occurrence.
    pub fn normalised(&self, strategy: DuplicateStrategy) -> Self {
        let mut slots: Vec<ScopedDependency> = Vec::new();
        let mut index: HashMap<(DependencyKey, Qualifier), usize> = HashMap::new();
        for entry in &self.entries {
            let key = (entry.dependency().key(), entry.qualifier().clone());
            let Some(&slot) = index.get(&key) else {
                index.insert(key, slots.len());
                slots.push(entry.clone());
                continue;
            };
            let replace = match strategy {
                DuplicateStrategy::KeepFirst => false,
                DuplicateStrategy::KeepLast => true,
                DuplicateStrategy::KeepHighestVersion => {
                    self.effective_rank(entry) > self.effective_rank(&slots[slot])
                }
            };
            if replace {
                slots[slot] = entry.clone();
            }
        }
        Self {
            entries: slots,
            ..self.clone()
        }
    }

    fn effective_rank(&self, entry: &ScopedDependency) -> Option<version::ComparableVersion> {
        entry
            .dependency()
            .as_module()
            .and_then(|m| self.effective_version(m))
            .map(|v| version::ComparableVersion::parse(v.as_str()))
    }

    /// Entries whose declared scopes are exactly `scopes`.
    pub fn dependencies_having_qualifier(&self, scopes: &[Scope]) -> Self {
        let wanted: BTreeSet<Scope> = scopes.iter().cloned().collect();
        self.filtered(|entry| entry.declared_scopes(&[]) == wanted)
    }

    /// Entries taking part in the resolution of `scope`.
    pub fn involving(&self, scope: &Scope, defaults: &[Scope]) -> Self {
        self.filtered(|entry| entry.is_involving(scope, defaults))
    }

    fn filtered(&self, keep: impl Fn(&ScopedDependency) -> bool) -> Self {
        Self {
            entries: self.entries.iter().filter(|&e| keep(e)).cloned().collect(),
            ..self.clone()
        }
    }

    /// The version to use for `module`: the provider's if any, else the inline one.
    pub fn effective_version(&self, module: &ModuleDependency) -> Option<Version> {
        self.version_provider
            .get(&module.module)
            .or(module.version.as_ref())
            .cloned()
    }

    /// Distinct module ids, in declaration order.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .filter_map(|e| e.dependency().as_module())
            .filter(|m| seen.insert(m.module.clone()))
            .map(|m| m.module.clone())
            .collect()
    }

    pub fn has_dynamic_versions(&self) -> bool {
        self.entries
            .iter()
            .filter_map(|e| e.dependency().as_module())
            .any(|m| self.effective_version(m).is_some_and(|v| v.is_dynamic()))
    }

    pub fn entries(&self) -> &[ScopedDependency] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScopedDependency> {
        self.entries.iter()
    }

    pub fn version_provider(&self) -> &VersionProvider {
        &self.version_provider
    }

    pub fn global_exclusions(&self) -> &[Exclusion] {
        &self.global_exclusions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a ScopedDependency;
    type IntoIter = std::slice::Iter<'a, ScopedDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
