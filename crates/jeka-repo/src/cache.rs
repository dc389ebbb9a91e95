//! Local download cache mirroring the Maven repository layout.

use std::fs;
use std::path::{Path, PathBuf};

use jeka_util::errors::JekaError;

/// Downloaded POMs and artifacts, stored at `<root>/<repository-relative path>`.
#[derive(Debug, Clone)]
pub struct DownloadCache {
    root: PathBuf,
}

impl DownloadCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// The cached file, if present.
    pub fn get(&self, relative: &str) -> Option<PathBuf> {
        let path = self.path_of(relative);
        path.is_file().then_some(path)
    }

    /// The cached file's text, if present.
    pub fn read_text(&self, relative: &str) -> Result<Option<String>, JekaError> {
        match self.get(relative) {
            Some(path) => Ok(Some(fs::read_to_string(path)?)),
            None => Ok(None),
        }
    }

    /// Store `data`, creating directories as needed. The file appears
    /// atomically so concurrent readers never see a partial download.
    pub fn put(&self, relative: &str, data: &[u8]) -> Result<PathBuf, JekaError> {
        let path = self.path_of(relative);
        if let Some(dir) = path.parent() {
            jeka_util::fs::ensure_dir(dir)?;
        }
        let partial = path.with_extension(format!("part-{}", std::process::id()));
        fs::write(&partial, data)?;
        fs::rename(&partial, &path)?;
        Ok(path)
    }
}
