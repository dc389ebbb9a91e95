use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_core::version;
use jeka_util::errors::JekaError;

use crate::descriptor::ModuleDescriptor;

/// A source of module versions, descriptors and artifact files.
///
/// Implementations must be usable from several resolutions at once.
/// I/O failures are reported as [`JekaError::RepositoryAccess`]; a module or
/// version the repository simply does not have is not an error.
pub trait RepositoryClient: Send + Sync {
    fn name(&self) -> &str;

    /// Concrete versions published for `module`, in any order.
    fn available_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError>;

    /// The descriptor of `module:version`, or `None` when unknown here.
    fn descriptor(&self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError>;

    /// Local paths of the artifact files of `module:version`.
    fn artifact_files(
        &self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError>;
}

/// Repositories queried in order.
#[derive(Default)]
pub struct RepositoryChain {
    repositories: Vec<Box<dyn RepositoryClient>>,
}

impl RepositoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, repository: impl RepositoryClient + 'static) -> Self {
        self.repositories.push(Box::new(repository));
        self
    }

    pub fn push(&mut self, repository: Box<dyn RepositoryClient>) {
        self.repositories.push(repository);
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name()).collect()
    }
}

impl RepositoryClient for RepositoryChain {
    fn name(&self) -> &str {
        "chain"
    }

    /// Union of every repository's listing, sorted ascending.
    fn available_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError> {
        let mut all: Vec<String> = Vec::new();
        for repository in &self.repositories {
            for v in repository.available_versions(module)? {
                if !all.contains(&v) {
                    all.push(v);
                }
            }
        }
        all.sort_by(|a, b| version::compare(a, b));
        Ok(all)
    }

    fn descriptor(&self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        for repository in &self.repositories {
            if let Some(descriptor) = repository.descriptor(module, version)? {
                tracing::debug!(%module, version, repository = repository.name(), "descriptor found");
                return Ok(Some(descriptor));
            }
        }
        Ok(None)
    }

    /// Files from the first repository that has any.
    fn artifact_files(
        &self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError> {
        for repository in &self.repositories {
            let files = repository.artifact_files(module, version, classifier)?;
            if !files.is_empty() {
                return Ok(files);
            }
        }
        Ok(Vec::new())
    }
}

impl<T: RepositoryClient + ?Sized> RepositoryClient for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn available_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError> {
        (**self).available_versions(module)
    }

    fn descriptor(&self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        (**self).descriptor(module, version)
    }

    fn artifact_files(
        &self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError> {
        (**self).artifact_files(module, version, classifier)
    }
}
