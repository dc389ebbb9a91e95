//! Module descriptors: what a published module version depends on.

use jeka_core::dependency::Exclusion;
use jeka_core::module_id::ModuleId;
use jeka_util::errors::JekaError;

use crate::layout;
use crate::pom::{self, Pom, PomDependency};

const MAX_POM_DEPTH: usize = 16;

/// A dependency as declared in a module's own metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorDependency {
    pub module: ModuleId,
    /// Raw version text; may be a range. `None` when nothing manages it.
    pub version: Option<String>,
    /// Maven scope (`compile`, `runtime`, `provided`, `test`, `system`).
    pub scope: String,
    pub optional: bool,
    pub classifier: Option<String>,
    pub exclusions: Vec<Exclusion>,
}

impl DescriptorDependency {
    pub fn new(module: ModuleId, version: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            module,
            version: Some(version.into()),
            scope: scope.into(),
            optional: false,
            classifier: None,
            exclusions: Vec::new(),
        }
    }

    /// Parse `group:name:version` and attach a Maven scope.
    pub fn parse(coordinate: &str, scope: &str) -> Result<Self, JekaError> {
        let (module, version) = coordinate.rsplit_once(':').ok_or_else(|| JekaError::Config {
            message: format!("descriptor dependency '{coordinate}' must be group:name:version"),
        })?;
        Ok(Self::new(module.parse()?, version, scope))
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn excluding(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }
}

/// The transitive dependency declarations of one module version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub module: ModuleId,
    pub version: String,
    /// `false` for modules publishing no artifact (`pom` packaging).
    pub has_artifact: bool,
    pub dependencies: Vec<DescriptorDependency>,
}

impl ModuleDescriptor {
    pub fn new(module: ModuleId, version: impl Into<String>) -> Self {
        Self {
            module,
            version: version.into(),
            has_artifact: true,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, dependency: DescriptorDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn without_artifact(mut self) -> Self {
        self.has_artifact = false;
        self
    }

    /// Build from an effective POM (parents applied, properties resolved,
    /// BOMs imported). Missing versions and scopes come from dependency management.
    pub fn from_pom(module: ModuleId, version: &str, pom: &Pom) -> Self {
        let dependencies = pom
            .dependencies
            .iter()
            .filter_map(|dep| descriptor_dependency(pom, dep))
            .collect();
        Self {
            module,
            version: version.to_string(),
            has_artifact: !pom.is_pom_packaging(),
            dependencies,
        }
    }
}

fn descriptor_dependency(pom: &Pom, dep: &PomDependency) -> Option<DescriptorDependency> {
    let module = match ModuleId::new(&dep.group_id, &dep.artifact_id) {
        Ok(module) => module,
        Err(e) => {
            tracing::warn!(
                pom = pom.artifact_id.as_deref().unwrap_or("?"),
                "skipping unusable POM dependency: {e}"
            );
            return None;
        }
    };
    let managed = pom.managed(&dep.group_id, &dep.artifact_id);
    let mut exclusions: Vec<Exclusion> = dep
        .exclusions
        .iter()
        .chain(managed.iter().flat_map(|m| m.exclusions.iter()))
        .map(|(group, name)| Exclusion {
            group: group.clone(),
            name: name.clone(),
        })
        .collect();
    exclusions.dedup();
    Some(DescriptorDependency {
        module,
        version: dep
            .version
            .clone()
            .or_else(|| managed.and_then(|m| m.version.clone())),
        scope: dep
            .scope
            .clone()
            .or_else(|| managed.and_then(|m| m.scope.clone()))
            .unwrap_or_else(|| "compile".to_string()),
        optional: dep.optional,
        classifier: dep.classifier.clone(),
        exclusions,
    })
}

/// Load the effective POM of `module:version`, fetching parents and imported
/// BOMs through `fetch` (which maps a repository-relative path to its content).
pub fn load_effective_pom(
    module: &ModuleId,
    version: &str,
    fetch: &dyn Fn(&str) -> Result<Option<String>, JekaError>,
) -> Result<Option<Pom>, JekaError> {
    effective_pom(&layout::pom_path(module, version), fetch, 0)
}

fn effective_pom(
    path: &str,
    fetch: &dyn Fn(&str) -> Result<Option<String>, JekaError>,
    depth: usize,
) -> Result<Option<Pom>, JekaError> {
    if depth > MAX_POM_DEPTH {
        tracing::warn!(%path, "POM parent/import chain too deep, stopping");
        return Ok(None);
    }
    let Some(xml) = fetch(path)? else {
        return Ok(None);
    };
    let mut pom = pom::parse_pom(&xml).map_err(|e| JekaError::Generic {
        message: format!("{path}: {e}"),
    })?;

    if let Some(parent) = pom.parent.clone() {
        let parent_path = layout::pom_path_of(&parent.group_id, &parent.artifact_id, &parent.version);
        match effective_pom(&parent_path, fetch, depth + 1)? {
            Some(parent_pom) => pom.apply_parent(&parent_pom),
            None => tracing::warn!(parent = %parent_path, "parent POM not found"),
        }
    }
    pom.resolve_properties();

    for bom in pom.bom_imports() {
        let Some(bom_version) = bom.version.as_deref() else {
            continue;
        };
        let bom_path = layout::pom_path_of(&bom.group_id, &bom.artifact_id, bom_version);
        match effective_pom(&bom_path, fetch, depth + 1)? {
            Some(bom_pom) => pom.import_bom(&bom_pom),
            None => tracing::warn!(bom = %bom_path, "imported BOM not found"),
        }
    }
    Ok(Some(pom))
}
