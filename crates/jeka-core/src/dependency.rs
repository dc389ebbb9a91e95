use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use jeka_util::errors::JekaError;
use jeka_util::fs::missing_or_empty;
use jeka_util::process::CommandBuilder;
use jeka_util::progress;
use serde::{Deserialize, Serialize};

use crate::module_id::ModuleId;
use crate::version::Version;

/// Whether a module's own dependencies are pulled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transitivity {
    /// Only the module's own artifact.
    None,
    /// The module's compile-scope dependencies.
    Compile,
    /// The module's compile and runtime dependencies.
    #[default]
    Runtime,
}

/// A module to leave out of the transitive graph: a whole group or one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion {
    pub group: String,
    pub name: Option<String>,
}

impl Exclusion {
    pub fn of_group(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: None,
        }
    }

    pub fn of_module(module: &ModuleId) -> Self {
        Self {
            group: module.group().to_string(),
            name: Some(module.name().to_string()),
        }
    }

    /// Parse `group` or `group:name`.
    pub fn parse(input: &str) -> Result<Self, JekaError> {
        let input = input.trim();
        let (group, name) = match input.split_once(':') {
            Some((group, name)) => (group, Some(name)),
            None => (input, None),
        };
        if group.is_empty() || name.is_some_and(|n| n.is_empty() || n.contains(':')) {
            return Err(JekaError::Config {
                message: format!("invalid exclusion '{input}', expected group or group:name"),
            });
        }
        Ok(Self {
            group: group.to_string(),
            name: name.map(str::to_string),
        })
    }

    pub fn matches(&self, module: &ModuleId) -> bool {
        self.group == module.group() && self.name.as_deref().map_or(true, |n| n == module.name())
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}:{name}", self.group),
            None => f.write_str(&self.group),
        }
    }
}

/// A dependency on a published module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDependency {
    pub module: ModuleId,
    /// `None` until a version provider supplies one.
    pub version: Option<Version>,
    pub classifier: Option<String>,
    pub transitivity: Transitivity,
    pub exclusions: Vec<Exclusion>,
}

impl ModuleDependency {
    pub fn of(module: ModuleId, version: Option<Version>) -> Self {
        Self {
            module,
            version,
            classifier: None,
            transitivity: Transitivity::default(),
            exclusions: Vec::new(),
        }
    }

    /// Parse `group:name[:version[:classifier]]`.
    pub fn parse(coordinate: &str) -> Result<Self, JekaError> {
        let parts: Vec<&str> = coordinate.trim().split(':').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(JekaError::Config {
                message: format!(
                    "invalid module coordinate '{coordinate}', expected group:name[:version[:classifier]]"
                ),
            });
        }
        let module = ModuleId::new(parts[0], parts[1])?;
        let version = match parts.get(2) {
            Some(v) if !v.is_empty() => Some(Version::parse(v)?),
            _ => None,
        };
        let classifier = parts.get(3).filter(|c| !c.is_empty()).map(|c| c.to_string());
        Ok(Self {
            classifier,
            ..Self::of(module, version)
        })
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_transitivity(mut self, transitivity: Transitivity) -> Self {
        self.transitivity = transitivity;
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn and_exclusion(mut self, exclusion: Exclusion) -> Self {
        if !self.exclusions.contains(&exclusion) {
            self.exclusions.push(exclusion);
        }
        self
    }
}

impl fmt::Display for ModuleDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.module)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

/// A literal set of files placed on the classpath as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileDependency {
    pub files: Vec<PathBuf>,
}

impl FileDependency {
    pub fn of(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }
}

/// Produces the files of a [`ComputedDependency`].
pub type Generator = Arc<dyn Fn() -> Result<(), JekaError> + Send + Sync>;

/// Files produced on demand by a generator, typically the build of another project.
#[derive(Clone)]
pub struct ComputedDependency {
    description: String,
    files: Vec<PathBuf>,
    generator: Generator,
}

impl ComputedDependency {
    pub fn new(
        description: impl Into<String>,
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
        generator: impl Fn() -> Result<(), JekaError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            files: files.into_iter().map(Into::into).collect(),
            generator: Arc::new(generator),
        }
    }

    /// A computed dependency whose generator runs an external command.
    pub fn of_process(
        command: CommandBuilder,
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        let description = command.to_string();
        Self::new(description, files, move || command.exec_checked().map(|_| ()))
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared output files, whether or not they exist yet.
    pub fn declared_files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Declared files that are missing or are empty directories.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        missing_or_empty(&self.files)
    }

    /// Run the generator if any declared file is missing, then return the files.
    ///
    /// Fails with [`JekaError::MissingComputedDependencyOutput`] when the
    /// generator completes but some files are still absent.
    pub fn files(&self) -> Result<Vec<PathBuf>, JekaError> {
        if self.missing_files().is_empty() {
            return Ok(self.files.clone());
        }
        tracing::info!(dependency = %self.description, "running computed dependency generator");
        progress::status("Building", &self.description);
        (self.generator)()?;
        let missing = self.missing_files();
        if !missing.is_empty() {
            return Err(JekaError::MissingComputedDependencyOutput {
                dependency: self.description.clone(),
                missing: missing.iter().map(|p| p.display().to_string()).collect(),
            });
        }
        Ok(self.files.clone())
    }
}

impl fmt::Debug for ComputedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedDependency")
            .field("description", &self.description)
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ComputedDependency {
    fn eq(&self, other: &Self) -> bool {
        self.files == other.files
    }
}

impl Eq for ComputedDependency {}

/// A declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Module(ModuleDependency),
    Files(FileDependency),
    Computed(ComputedDependency),
}

/// What makes two declarations "the same dependency" for normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyKey {
    Module(ModuleId, Option<String>),
    Files(Vec<PathBuf>),
}

impl Dependency {
    /// Parse a module coordinate into a module dependency.
    pub fn module(coordinate: &str) -> Result<Self, JekaError> {
        ModuleDependency::parse(coordinate).map(Dependency::Module)
    }

    pub fn files(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Dependency::Files(FileDependency::of(files))
    }

    pub fn as_module(&self) -> Option<&ModuleDependency> {
        match self {
            Dependency::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn key(&self) -> DependencyKey {
        match self {
            Dependency::Module(m) => DependencyKey::Module(m.module.clone(), m.classifier.clone()),
            Dependency::Files(f) => DependencyKey::Files(f.files.clone()),
            Dependency::Computed(c) => DependencyKey::Files(c.files.clone()),
        }
    }
}

impl From<ModuleDependency> for Dependency {
    fn from(value: ModuleDependency) -> Self {
        Dependency::Module(value)
    }
}

impl From<FileDependency> for Dependency {
    fn from(value: FileDependency) -> Self {
        Dependency::Files(value)
    }
}

impl From<ComputedDependency> for Dependency {
    fn from(value: ComputedDependency) -> Self {
        Dependency::Computed(value)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Module(m) => write!(f, "{m}"),
            Dependency::Files(files) => {
                let names: Vec<String> = files.files.iter().map(|p| p.display().to_string()).collect();
                write!(f, "files [{}]", names.join(", "))
            }
            Dependency::Computed(c) => write!(f, "computed [{}]", c.description),
        }
    }
}
