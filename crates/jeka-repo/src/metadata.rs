//! `maven-metadata.xml` parsing for version discovery.

use jeka_util::errors::JekaError;

use crate::pom::read_tree;

/// Artifact-level Maven metadata listing available versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MavenMetadata {
    pub latest: Option<String>,
    pub release: Option<String>,
    pub versions: Vec<String>,
}

/// Parse an artifact-level `maven-metadata.xml`.
pub fn parse_metadata(xml: &str) -> Result<MavenMetadata, JekaError> {
    let root = read_tree(xml)?;
    if root.name != "metadata" {
        return Err(JekaError::Generic {
            message: format!("Failed to parse maven-metadata.xml: unexpected root <{}>", root.name),
        });
    }
    let Some(versioning) = root.child("versioning") else {
        return Ok(MavenMetadata::default());
    };
    let versions = versioning
        .child("versions")
        .map(|list| {
            list.children_named("version")
                .map(|v| v.text.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Ok(MavenMetadata {
        latest: versioning.text_of("latest"),
        release: versioning.text_of("release"),
        versions,
    })
}
