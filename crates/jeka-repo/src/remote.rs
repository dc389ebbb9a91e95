//! A remote HTTP Maven repository with a local download cache.
//!
//! Downloads are async (reqwest); the repository owns a current-thread tokio
//! runtime and blocks on it so that it can serve the synchronous
//! [`RepositoryClient`] trait. It must not be called from inside another
//! tokio runtime.

use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_util::errors::JekaError;
use jeka_util::progress;
use reqwest::Client;
use tokio::runtime::{Builder as RuntimeBuilder, Runtime};

use crate::cache::DownloadCache;
use crate::checksum;
use crate::client::RepositoryClient;
use crate::descriptor::{self, ModuleDescriptor};
use crate::download;
use crate::layout::{self, RepositorySpec};
use crate::metadata;

pub struct RemoteRepository {
    spec: RepositorySpec,
    client: Client,
    runtime: Runtime,
    cache: DownloadCache,
    verify_checksums: bool,
}

impl RemoteRepository {
    pub fn new(spec: RepositorySpec, cache: DownloadCache) -> Result<Self, JekaError> {
        let runtime = RuntimeBuilder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| JekaError::RepositoryAccess {
                repository: spec.name.clone(),
                message: format!("Failed to start I/O runtime: {e}"),
            })?;
        Ok(Self {
            client: download::build_client(&spec.name)?,
            spec,
            runtime,
            cache,
            verify_checksums: true,
        })
    }

    /// Skip checksum sidecar verification.
    pub fn without_checksums(mut self) -> Self {
        self.verify_checksums = false;
        self
    }

    pub fn spec(&self) -> &RepositorySpec {
        &self.spec
    }

    /// Download `relative`, verify it, and store it in the cache.
    fn download_to_cache(&self, relative: &str) -> Result<Option<PathBuf>, JekaError> {
        let url = self.spec.url_of(relative);
        let bytes = self.runtime.block_on(async {
            let Some(bytes) = download::download_bytes(&self.client, &self.spec, &url).await? else {
                return Ok(None);
            };
            if self.verify_checksums {
                checksum::verify(&self.client, &self.spec, &url, &bytes).await?;
            }
            Ok::<_, JekaError>(Some(bytes))
        })?;
        match bytes {
            Some(bytes) => Ok(Some(self.cache.put(relative, &bytes)?)),
            None => Ok(None),
        }
    }

    /// The cached file, downloading it first when absent.
    fn cached(&self, relative: &str) -> Result<Option<PathBuf>, JekaError> {
        if let Some(path) = self.cache.get(relative) {
            return Ok(Some(path));
        }
        self.download_to_cache(relative)
    }

    fn cached_text(&self, relative: &str) -> Result<Option<String>, JekaError> {
        match self.cached(relative)? {
            Some(path) => std::fs::read_to_string(&path)
                .map(Some)
                .map_err(|e| JekaError::RepositoryAccess {
                    repository: self.spec.name.clone(),
                    message: format!("Failed to read cached {}: {e}", path.display()),
                }),
            None => Ok(None),
        }
    }
}

impl RepositoryClient for RemoteRepository {
    fn name(&self) -> &str {
        &self.spec.name
    }

    /// Always read from the repository: listings change over time.
    fn available_versions(&self, module: &ModuleId) -> Result<Vec<String>, JekaError> {
        let url = self.spec.url_of(&layout::metadata_path(module));
        let xml = self
            .runtime
            .block_on(download::download_text(&self.client, &self.spec, &url))?;
        let versions = match xml {
            Some(xml) => metadata::parse_metadata(&xml)?.versions,
            None => Vec::new(),
        };
        tracing::debug!(%module, repository = %self.spec.name, count = versions.len(), "listed versions");
        Ok(versions)
    }

    fn descriptor(&self, module: &ModuleId, version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        let fetch = |relative: &str| self.cached_text(relative);
        let pom = descriptor::load_effective_pom(module, version, &fetch)?;
        Ok(pom.map(|pom| ModuleDescriptor::from_pom(module.clone(), version, &pom)))
    }

    fn artifact_files(
        &self,
        module: &ModuleId,
        version: &str,
        classifier: Option<&str>,
    ) -> Result<Vec<PathBuf>, JekaError> {
        let relative = layout::jar_path(module, version, classifier);
        if let Some(path) = self.cache.get(&relative) {
            return Ok(vec![path]);
        }
        progress::status("Downloading", &format!("{module}:{version}"));
        match self.download_to_cache(&relative)? {
            Some(path) => Ok(vec![path]),
            None => {
                tracing::debug!(%module, version, repository = %self.spec.name, "no jar published");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_cache_entry_names_the_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DownloadCache::new(tmp.path());
        let module = ModuleId::new("org.ex", "broken").unwrap();
        let relative = layout::pom_path(&module, "1.0");
        cache.put(&relative, &[0xff, 0xfe, 0x00]).unwrap();

        let spec = RepositorySpec::new("corp", "http://127.0.0.1:9/maven/");
        let repository = RemoteRepository::new(spec, cache).unwrap();
        match repository.descriptor(&module, "1.0") {
            Err(JekaError::RepositoryAccess { repository, message }) => {
                assert_eq!(repository, "corp");
                assert!(message.contains("broken-1.0.pom"), "got: {message}");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
