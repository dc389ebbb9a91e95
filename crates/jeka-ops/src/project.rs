//! Loading a project and turning its configuration into a resolver.

use std::path::{Path, PathBuf};

use jeka_core::config::GlobalConfig;
use jeka_core::dependency_set::DependencySet;
use jeka_core::manifest::{Manifest, MANIFEST_FILE};
use jeka_core::scope::Scope;
use jeka_repo::cache::DownloadCache;
use jeka_repo::layout::{RepositorySpec, MAVEN_CENTRAL_URL};
use jeka_repo::{FileRepository, RemoteRepository, RepositoryChain};
use jeka_resolver::{ConflictStrategy, ResolveResult, Resolver, ResolverConfig};
use jeka_util::errors::JekaError;
use jeka_util::progress;

use crate::ResolveOptions;

/// A manifest together with the directory it was read from and the user's
/// global configuration.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: Manifest,
    global: GlobalConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, manifest: Manifest, global: GlobalConfig) -> Self {
        Self {
            root: root.into(),
            manifest,
            global,
        }
    }

    /// Load the manifest named in `opts`, or the nearest `jeka.toml` above
    /// the current directory.
    pub fn load(opts: &ResolveOptions) -> miette::Result<Self> {
        let manifest_path = match &opts.manifest {
            Some(path) => path.clone(),
            None => {
                let cwd = std::env::current_dir().map_err(JekaError::Io)?;
                let dir = jeka_util::fs::find_ancestor_with(&cwd, MANIFEST_FILE).ok_or_else(|| {
                    JekaError::Config {
                        message: format!("No {MANIFEST_FILE} found in {} or any parent directory", cwd.display()),
                    }
                })?;
                dir.join(MANIFEST_FILE)
            }
        };
        tracing::debug!(manifest = %manifest_path.display(), "loading project");
        let manifest = Manifest::from_path(&manifest_path)?;
        let root = manifest_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self::new(root, manifest, GlobalConfig::load()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn dependency_set(&self) -> Result<DependencySet, JekaError> {
        self.manifest.dependency_set(&self.root)
    }

    /// Repository definitions in query order: the manifest's (by name), the
    /// global configuration's, then Maven Central unless already present.
    pub fn repository_specs(&self) -> Vec<RepositorySpec> {
        let mut specs: Vec<RepositorySpec> = self
            .manifest
            .repositories
            .iter()
            .map(|(name, entry)| RepositorySpec::from_entry(name, entry))
            .collect();
        for (name, url) in &self.global.repositories {
            if !specs.iter().any(|s| &s.name == name) {
                specs.push(RepositorySpec::new(name, url));
            }
        }
        if !specs.iter().any(|s| s.url == MAVEN_CENTRAL_URL) {
            specs.push(RepositorySpec::maven_central());
        }
        specs
            .into_iter()
            .map(|spec| {
                let credentials = self.global.credentials.get(&spec.name);
                spec.with_credentials(credentials)
            })
            .collect()
    }

    /// Local directories become [`FileRepository`]s, URLs become
    /// [`RemoteRepository`]s sharing the global download cache.
    pub fn repositories(&self) -> Result<RepositoryChain, JekaError> {
        let cache = DownloadCache::new(self.global.cache.path());
        let mut chain = RepositoryChain::new();
        for spec in self.repository_specs() {
            match spec.local_dir() {
                Some(dir) => {
                    let dir = if dir.is_relative() { self.root.join(dir) } else { dir };
                    chain.push(Box::new(FileRepository::new(spec.name, dir)));
                }
                None => chain.push(Box::new(RemoteRepository::new(spec, cache.clone())?)),
            }
        }
        tracing::debug!(repositories = ?chain.names(), "repositories configured");
        Ok(chain)
    }

    /// Resolver settings from `[resolution]` and `[module]`; `strategy`
    /// overrides the manifest's conflict strategy.
    pub fn resolver_config(&self, strategy: Option<&str>) -> Result<ResolverConfig, JekaError> {
        let resolution = &self.manifest.resolution;
        let strategy = match strategy.or(resolution.conflict_strategy.as_deref()) {
            Some(name) => name.parse()?,
            None => ConflictStrategy::default(),
        };
        Ok(ResolverConfig {
            strategy,
            default_scopes: resolution.default_scopes(),
            force_direct_versions: resolution.force_direct_versions,
            module_holder: self.manifest.module_holder()?,
            ..ResolverConfig::default()
        })
    }

    pub fn resolver(&self, strategy: Option<&str>) -> Result<Resolver, JekaError> {
        let config = self.resolver_config(strategy)?;
        Ok(Resolver::new(self.repositories()?).with_config(config))
    }
}

/// `["compile+runtime", "test"]` into scopes.
pub fn parse_scopes(names: &[String]) -> Vec<Scope> {
    names.iter().flat_map(|n| Scope::parse_list(n)).collect()
}

/// Load the project and resolve it for the requested scopes.
pub fn resolve(opts: &ResolveOptions) -> miette::Result<ResolveResult> {
    let project = Project::load(opts)?;
    resolve_project(&project, opts)
}

pub fn resolve_project(project: &Project, opts: &ResolveOptions) -> miette::Result<ResolveResult> {
    let set = project.dependency_set()?;
    let resolver = project.resolver(opts.strategy.as_deref())?;
    let scopes = parse_scopes(&opts.scopes);

    progress::status("Resolving", &format!("{} declared dependencies", set.len()));
    let result = {
        let _spinner = progress::spinner("Resolving dependency graph...");
        resolver.resolve(&set, &scopes)?
    };

    let modules = result.dependency_tree().resolved_modules().len();
    progress::status("Resolved", &format!("{modules} modules, {} files", result.files().len()));
    for error in result.errors() {
        progress::status_warn("warning", &error.to_string());
    }
    Ok(result)
}
