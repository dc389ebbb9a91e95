use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jeka_util::errors::JekaError;
use jeka_util::process::CommandBuilder;
use serde::{Deserialize, Serialize};

use crate::dependency::{ComputedDependency, Dependency, Exclusion, FileDependency, ModuleDependency, Transitivity};
use crate::dependency_set::DependencySet;
use crate::scope::{Scope, ScopeMapping};
use crate::scoped_dependency::ScopedDependency;
use crate::version_provider::VersionProvider;
use crate::{local_libs, text};

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "jeka.toml";

/// The parsed representation of a `jeka.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Text description appended after the `[[dependency]]` entries.
    #[serde(default, rename = "dependencies-file")]
    pub dependencies_file: Option<String>,

    /// Local library directory scanned for jars.
    #[serde(default, rename = "local-libs")]
    pub local_libs: Option<String>,

    #[serde(default)]
    pub module: Option<ModuleSection>,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Queried in name order.
    #[serde(default)]
    pub repositories: BTreeMap<String, RepositoryEntry>,

    /// Forced versions: `"group:name" = "version"`.
    #[serde(default)]
    pub versions: BTreeMap<String, String>,

    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<DependencyEntry>,

    #[serde(default)]
    pub exclusions: ExclusionsConfig,
}

/// The module being resolved, from `[module]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSection {
    /// `group:name[:version]`
    pub id: String,
}

/// Resolution settings from `[resolution]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default, rename = "conflict-strategy")]
    pub conflict_strategy: Option<String>,
    #[serde(default = "default_true", rename = "force-direct-versions")]
    pub force_direct_versions: bool,
    #[serde(default = "default_scope_names", rename = "default-scopes")]
    pub default_scopes: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            conflict_strategy: None,
            force_direct_versions: true,
            default_scopes: default_scope_names(),
        }
    }
}

impl ResolutionConfig {
    pub fn default_scopes(&self) -> Vec<Scope> {
        self.default_scopes.iter().map(|s| Scope::by_name(s)).collect()
    }
}

fn default_true() -> bool {
    true
}

fn default_scope_names() -> Vec<String> {
    vec!["compile".to_string()]
}

/// A repository: a plain URL/path, or a table with credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepositoryEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default)]
        token: Option<String>,
    },
}

impl RepositoryEntry {
    pub fn url(&self) -> &str {
        match self {
            RepositoryEntry::Url(url) | RepositoryEntry::Detailed { url, .. } => url,
        }
    }
}

/// `[exclusions]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionsConfig {
    #[serde(default)]
    pub global: Vec<String>,
}

/// One `[[dependency]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyEntry {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub computed: Option<ComputedEntry>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// `{ compile = ["runtime"] }`
    #[serde(default)]
    pub mapping: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub transitivity: Option<Transitivity>,
    #[serde(default)]
    pub exclusions: Vec<String>,
}

/// `computed = { command, args, files, workdir }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedEntry {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub files: Vec<String>,
    #[serde(default)]
    pub workdir: Option<String>,
}

impl DependencyEntry {
    /// Convert to a scoped dependency. Relative paths resolve against `base_dir`.
    pub fn to_scoped(&self, base_dir: &Path) -> Result<ScopedDependency, JekaError> {
        let dependency = match (&self.module, &self.files, &self.computed) {
            (Some(coordinate), None, None) => {
                let mut module = ModuleDependency::parse(coordinate)?;
                if let Some(transitivity) = self.transitivity {
                    module = module.with_transitivity(transitivity);
                }
                for exclusion in &self.exclusions {
                    module = module.and_exclusion(Exclusion::parse(exclusion)?);
                }
                Dependency::Module(module)
            }
            (None, Some(files), None) => {
                Dependency::Files(FileDependency::of(files.iter().map(|f| base_dir.join(f))))
            }
            (None, None, Some(computed)) => {
                let workdir = computed
                    .workdir
                    .as_ref()
                    .map_or_else(|| base_dir.to_path_buf(), |w| base_dir.join(w));
                let command = CommandBuilder::new(&computed.command)
                    .args(computed.args.iter().cloned())
                    .cwd(workdir);
                let files: Vec<PathBuf> = computed.files.iter().map(|f| base_dir.join(f)).collect();
                Dependency::Computed(ComputedDependency::of_process(command, files))
            }
            _ => {
                return Err(JekaError::Config {
                    message: "each [[dependency]] needs exactly one of module, files or computed".to_string(),
                });
            }
        };
        if dependency.as_module().is_none() && (self.transitivity.is_some() || !self.exclusions.is_empty()) {
            tracing::warn!(%dependency, "transitivity and exclusions only apply to module dependencies");
        }

        let scopes: Vec<Scope> = self.scopes.iter().map(|s| Scope::by_name(s)).collect();
        let mapping = self.mapping.as_ref().map(|pairs| {
            pairs.iter().fold(ScopeMapping::empty(), |mapping, (from, to)| {
                let to: Vec<Scope> = to.iter().map(|s| Scope::by_name(s)).collect();
                mapping.and(&[Scope::by_name(from)], &to)
            })
        });
        ScopedDependency::new(dependency, &scopes, mapping)
    }
}

impl Manifest {
    /// Load and parse a `jeka.toml` file from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| JekaError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_str(&content)
    }

    /// Parse a `jeka.toml` from a string.
    pub fn from_str(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            JekaError::Config {
                message: format!("Failed to parse jeka.toml: {e}"),
            }
            .into()
        })
    }

    /// The module being resolved, if declared.
    pub fn module_holder(&self) -> Result<Option<ModuleDependency>, JekaError> {
        self.module
            .as_ref()
            .map(|m| ModuleDependency::parse(&m.id))
            .transpose()
    }

    /// Build the dependency set declared by this manifest.
    ///
    /// Order: `[[dependency]]` entries, then the text description file, then
    /// local libs. The `[versions]` table becomes the version provider.
    pub fn dependency_set(&self, base_dir: &Path) -> Result<DependencySet, JekaError> {
        let mut set = DependencySet::of();
        for entry in &self.dependencies {
            set = set.and_scoped(entry.to_scoped(base_dir)?);
        }
        if let Some(file) = &self.dependencies_file {
            set = set.merge(&text::parse_file(&base_dir.join(file))?);
        }
        if let Some(dir) = &self.local_libs {
            set = set.merge(&local_libs::scan(&base_dir.join(dir))?);
        }

        let exclusions = self
            .exclusions
            .global
            .iter()
            .map(|e| Exclusion::parse(e))
            .collect::<Result<Vec<_>, _>>()?;
        let provider = VersionProvider::from_pairs(
            self.versions.iter().map(|(module, version)| (module.as_str(), version.as_str())),
        )?;
        Ok(set.with_global_exclusions(exclusions).with_version_provider(provider))
    }
}
