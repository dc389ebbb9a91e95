use std::collections::BTreeMap;
use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_util::errors::JekaError;

use crate::client::RepositoryClient;
use crate::descriptor::ModuleDescriptor;
use crate::layout;

/// An in-process repository populated through a builder.
///
/// Artifact files are reported under a virtual root following the Maven
/// layout unless explicit files were registered; they need not exist.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    name: String,
    root: PathBuf,
    descriptors: BTreeMap<(ModuleId, String), ModuleDescriptor>,
    files: BTreeMap<(ModuleId, String), Vec<PathBuf>>,
}

impl MemoryRepository {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            root: PathBuf::from("/memory").join(&name),
            name,
            descriptors: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Report artifact paths under `root` instead of `/memory/<name>`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_module(mut self, descriptor: ModuleDescriptor) -> Self {
        let key = (descriptor.module.clone(), descriptor.version.clone());
        self.descriptors.insert(key, descriptor);
        self
    }

    /// Override the artifact files of an already registered module version.
    pub fn with_files(mut self, module: ModuleId, version: impl Into<String>, files: Vec<PathBuf>) -> Self {
        self.files.insert((module, version.into()), files);
        self
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl RepositoryClient for MemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn available_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError> {
        Ok(self
            .descriptors
            .keys()
            .filter(|(m, _)| m == module)
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn descriptor(&self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        Ok(self
            .descriptors
            .get(&(module.clone(), version.to_string()))
            .cloned())
    }

    fn artifact_files(
        &self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError> {
        let key = (module.clone(), version.to_string());
        if let Some(files) = self.files.get(&key) {
            return Ok(files.clone());
        }
        match self.descriptors.get(&key) {
            Some(descriptor) if descriptor.has_artifact => {
                Ok(vec![self.root.join(layout::jar_path(module, version, classifier))])
            }
            _ => Ok(Vec::new()),
        }
    }
}
