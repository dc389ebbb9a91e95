//! Per-resolution memo of repository answers.
//!
//! A session lives for a single `resolve` call, so repeated occurrences of a
//! module hit the repository once. Nothing is shared across calls.

use std::collections::HashMap;
use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_repo::client::RepositoryClient;
use jeka_repo::descriptor::ModuleDescriptor;
use jeka_util::errors::JekaError;

pub struct ResolutionSession<'a> {
    repository: &'a dyn RepositoryClient,
    versions: HashMap<ModuleId, Vec<String>>,
    descriptors: HashMap<(ModuleId, String), Option<ModuleDescriptor>>,
    files: HashMap<(ModuleId, String, Option<String>), Vec<PathBuf>>,
}

impl<'a> ResolutionSession<'a> {
    pub fn new(repository: &'a dyn RepositoryClient) -> Self {
        Self {
            repository,
            versions: HashMap::new(),
            descriptors: HashMap::new(),
            files: HashMap::new(),
        }
    }

    pub fn available_versions(&mut self, module: &ModuleId) -> Result<&[String], JekaError> {
        if !self.versions.contains_key(module) {
            let listed = self.repository.available_versions(module)?;
            self.versions.insert(module.clone(), listed);
        }
        Ok(self.versions.get(module).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn descriptor(&mut self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        let key = (module.clone(), version.to_string());
        if let Some(cached) = self.descriptors.get(&key) {
            return Ok(cached.clone());
        }
        let descriptor = self.repository.descriptor(module, version)?;
        tracing::debug!(%module, version, found = descriptor.is_some(), "fetched descriptor");
        self.descriptors.insert(key, descriptor.clone());
        Ok(descriptor)
    }

    pub fn artifact_files(
        &mut self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError> {
        let key = (module.clone(), version.to_string(), classifier.map(str::to_string));
        if let Some(cached) = self.files.get(&key) {
            return Ok(cached.clone());
        }
        let files = self.repository.artifact_files(module, version, classifier)?;
        self.files.insert(key, files.clone());
        Ok(files)
    }
}
