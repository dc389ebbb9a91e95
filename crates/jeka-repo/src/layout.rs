//! Maven repository layout and repository definitions.

use std::path::PathBuf;

use jeka_core::config::CredentialEntry;
use jeka_core::manifest::RepositoryEntry;
use jeka_core::module_id::ModuleId;

/// Maven Central base URL.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// A configured repository location with optional credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

impl RepositorySpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            name: name.into(),
            url: url.trim_end_matches('/').to_string(),
            username: None,
            password: None,
            token: None,
        }
    }

    /// Build from a manifest `[repositories]` entry.
    pub fn from_entry(name: &str, entry: &RepositoryEntry) -> Self {
        let spec = Self::new(name, entry.url());
        match entry {
            RepositoryEntry::Url(_) => spec,
            RepositoryEntry::Detailed {
                username,
                password,
                token,
                ..
            } => Self {
                username: username.clone(),
                password: password.clone(),
                token: token.clone(),
                ..spec
            },
        }
    }

    /// Fill missing credentials from the global configuration.
    pub fn with_credentials(mut self, credentials: Option<&CredentialEntry>) -> Self {
        if let Some(creds) = credentials {
            self.username = self.username.or_else(|| creds.username.clone());
            self.password = self.password.or_else(|| creds.password.clone());
            self.token = self.token.or_else(|| creds.token.clone());
        }
        self
    }

    pub fn maven_central() -> Self {
        Self::new("maven-central", MAVEN_CENTRAL_URL)
    }

    /// The local directory this repository points at, for `file://` URLs
    /// and plain paths.
    pub fn local_dir(&self) -> Option<PathBuf> {
        if let Some(path) = self.url.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            return None;
        }
        Some(jeka_util::fs::expand_home(&self.url))
    }

    pub fn has_auth(&self) -> bool {
        self.username.is_some() || self.password.is_some() || self.token.is_some()
    }

    /// Full URL of a file relative to the repository root.
    pub fn url_of(&self, relative: &str) -> String {
        format!("{}/{relative}", self.url)
    }
}

/// `org/slf4j/slf4j-api/1.7.25`
pub fn version_dir(module: &ModuleId, version: &str) -> String {
    format!("{}/{version}", module.path())
}

/// `org/slf4j/slf4j-api/1.7.25/slf4j-api-1.7.25.pom`
pub fn pom_path(module: &ModuleId, version: &str) -> String {
    format!("{}/{}-{version}.pom", version_dir(module, version), module.name())
}

/// `org/slf4j/slf4j-api/1.7.25/slf4j-api-1.7.25[-classifier].jar`
pub fn jar_path(module: &ModuleId, version: &str, classifier: Option<&str>) -> String {
    let name = module.name();
    let file = match classifier {
        Some(c) => format!("{name}-{version}-{c}.jar"),
        None => format!("{name}-{version}.jar"),
    };
    format!("{}/{file}", version_dir(module, version))
}

/// `org/slf4j/slf4j-api/maven-metadata.xml`
pub fn metadata_path(module: &ModuleId) -> String {
    format!("{}/maven-metadata.xml", module.path())
}

/// Path of a POM identified by raw coordinates, for parent and BOM lookups.
pub fn pom_path_of(group: &str, artifact: &str, version: &str) -> String {
    format!(
        "{}/{artifact}/{version}/{artifact}-{version}.pom",
        group.replace('.', "/")
    )
}
