use std::collections::BTreeMap;

use jeka_util::errors::JekaError;

use crate::module_id::ModuleId;
use crate::version::Version;

/// Forced versions per module, applied over any inline declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionProvider {
    versions: BTreeMap<ModuleId, Version>,
}

impl VersionProvider {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(module: ModuleId, version: Version) -> Self {
        Self::empty().and(module, version)
    }

    /// Return a provider that also forces `module` to `version`.
    pub fn and(&self, module: ModuleId, version: Version) -> Self {
        let mut versions = self.versions.clone();
        versions.insert(module, version);
        Self { versions }
    }

    /// Build from `group:name -> version` string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, JekaError> {
        let mut versions = BTreeMap::new();
        for (module, version) in pairs {
            versions.insert(module.parse()?, Version::parse(version)?);
        }
        Ok(Self { versions })
    }

    pub fn get(&self, module: &ModuleId) -> Option<&Version> {
        self.versions.get(module)
    }

    /// Combine two providers; entries of `other` win.
    pub fn merge(&self, other: &VersionProvider) -> Self {
        let mut versions = self.versions.clone();
        versions.extend(other.versions.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { versions }
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &Version)> {
        self.versions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_other() {
        let guava: ModuleId = "com.google.guava:guava".parse().unwrap();
        let a = VersionProvider::of(guava.clone(), Version::exact("21.0"));
        let b = VersionProvider::of(guava.clone(), Version::exact("22.0"));
        assert_eq!(a.merge(&b).get(&guava).map(Version::as_str), Some("22.0"));
    }

    #[test]
    fn from_pairs_validates() {
        assert!(VersionProvider::from_pairs([("a:b", "1.0")]).is_ok());
        assert!(VersionProvider::from_pairs([("a:b", "1 .0")]).is_err());
        assert!(VersionProvider::from_pairs([("ab", "1.0")]).is_err());
    }
}
