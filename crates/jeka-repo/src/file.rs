//! A Maven-layout repository on the local filesystem (`~/.m2/repository` style).

use std::fs;
use std::path::{Path, PathBuf};

use jeka_core::module_id::ModuleId;
use jeka_util::errors::JekaError;

use crate::client::RepositoryClient;
use crate::descriptor::{self, ModuleDescriptor};
use crate::layout;
use crate::metadata;

#[derive(Debug, Clone)]
pub struct FileRepository {
    name: String,
    root: PathBuf,
}

impl FileRepository {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn access_error(&self, path: &Path, e: std::io::Error) -> JekaError {
        JekaError::RepositoryAccess {
            repository: self.name.clone(),
            message: format!("{}: {e}", path.display()),
        }
    }

    fn read(&self, relative: &str) -> Result<Option<String>, JekaError> {
        let path = self.root.join(relative);
        if !path.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| self.access_error(&path, e))
    }

    /// Version directories that contain a POM, for repositories without metadata files.
    fn listed_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError> {
        let dir = self.root.join(module.path());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir).map_err(|e| self.access_error(&dir, e))?;
        let mut versions: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|v| self.root.join(layout::pom_path(module, v)).is_file())
            .collect();
        versions.sort();
        Ok(versions)
    }
}

impl RepositoryClient for FileRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn available_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError> {
        let mut versions = Vec::new();
        for file in ["maven-metadata.xml", "maven-metadata-local.xml"] {
            let relative = format!("{}/{file}", module.path());
            if let Some(xml) = self.read(&relative)? {
                for v in metadata::parse_metadata(&xml)?.versions {
                    if !versions.contains(&v) {
                        versions.push(v);
                    }
                }
            }
        }
        for v in self.listed_versions(module)? {
            if !versions.contains(&v) {
                versions.push(v);
            }
        }
        tracing::debug!(%module, repository = %self.name, count = versions.len(), "listed versions");
        Ok(versions)
    }

    fn descriptor(&self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        let fetch = |relative: &str| self.read(relative);
        let pom = descriptor::load_effective_pom(module, version, &fetch)?;
        Ok(pom.map(|pom| ModuleDescriptor::from_pom(module.clone(), version, &pom)))
    }

    fn artifact_files(
        &self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError> {
        let jar = self.root.join(layout::jar_path(module, version, classifier));
        Ok(if jar.is_file() { vec![jar] } else { Vec::new() })
    }
}
