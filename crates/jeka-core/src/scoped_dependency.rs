use std::collections::BTreeSet;
use std::fmt;

use jeka_util::errors::JekaError;

use crate::dependency::Dependency;
use crate::scope::{Scope, ScopeMapping};

/// How a dependency is attached to the consumer's classpaths: a plain set of
/// scopes, or a scope mapping. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// Empty means "the resolver's default scopes".
    Scopes(BTreeSet<Scope>),
    Mapping(ScopeMapping),
}

/// A dependency paired with its qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedDependency {
    dependency: Dependency,
    qualifier: Qualifier,
}

impl ScopedDependency {
    pub fn of_scopes(dependency: impl Into<Dependency>, scopes: &[Scope]) -> Self {
        Self {
            dependency: dependency.into(),
            qualifier: Qualifier::Scopes(scopes.iter().cloned().collect()),
        }
    }

    pub fn of_mapping(dependency: impl Into<Dependency>, mapping: ScopeMapping) -> Self {
        Self {
            dependency: dependency.into(),
            qualifier: Qualifier::Mapping(mapping),
        }
    }

    /// Build from both declaration styles; fails when both are given.
    pub fn new(
        dependency: impl Into<Dependency>,
        scopes: &[Scope],
        mapping: Option<ScopeMapping>,
    ) -> Result<Self, JekaError> {
        let dependency = dependency.into();
        match mapping {
            Some(mapping) if !scopes.is_empty() && !mapping.is_empty() => {
                Err(JekaError::ConflictingScopeDeclaration {
                    message: format!("{dependency} declares both scopes and a scope mapping"),
                })
            }
            Some(mapping) if !mapping.is_empty() => Ok(Self::of_mapping(dependency, mapping)),
            _ => Ok(Self::of_scopes(dependency, scopes)),
        }
    }

    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    pub fn with_dependency(&self, dependency: impl Into<Dependency>) -> Self {
        Self {
            dependency: dependency.into(),
            qualifier: self.qualifier.clone(),
        }
    }

    /// The declared scope set. Fails on a mapped dependency.
    pub fn scopes(&self) -> Result<&BTreeSet<Scope>, JekaError> {
        match &self.qualifier {
            Qualifier::Scopes(scopes) => Ok(scopes),
            Qualifier::Mapping(_) => Err(JekaError::ConflictingScopeDeclaration {
                message: format!("{} is declared with a scope mapping, not scopes", self.dependency),
            }),
        }
    }

    /// The declared scope mapping. Fails on a simply-scoped dependency.
    pub fn scope_mapping(&self) -> Result<&ScopeMapping, JekaError> {
        match &self.qualifier {
            Qualifier::Mapping(mapping) => Ok(mapping),
            Qualifier::Scopes(_) => Err(JekaError::ConflictingScopeDeclaration {
                message: format!("{} is declared with scopes, not a scope mapping", self.dependency),
            }),
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.qualifier, Qualifier::Mapping(_))
    }

    /// Scopes the dependency is declared for: its scope set (or `defaults`
    /// when empty), or the left-hand side of its mapping.
    pub fn declared_scopes(&self, defaults: &[Scope]) -> BTreeSet<Scope> {
        match &self.qualifier {
            Qualifier::Scopes(scopes) if scopes.is_empty() => defaults.iter().cloned().collect(),
            Qualifier::Scopes(scopes) => scopes.clone(),
            Qualifier::Mapping(mapping) => mapping.entries(),
        }
    }

    /// `true` if this dependency takes part in resolving `scope`.
    pub fn is_involving(&self, scope: &Scope, defaults: &[Scope]) -> bool {
        self.declared_scopes(defaults)
            .iter()
            .any(|declared| declared.is_in_or_inherited_by_any_of([scope]))
    }
}

impl fmt::Display for ScopedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Qualifier::Scopes(scopes) if scopes.is_empty() => write!(f, "{}", self.dependency),
            Qualifier::Scopes(scopes) => {
                let names: Vec<&str> = scopes.iter().map(Scope::name).collect();
                write!(f, "{} ({})", self.dependency, names.join(", "))
            }
            Qualifier::Mapping(mapping) => write!(f, "{} ({mapping})", self.dependency),
        }
    }
}
