//! Classpath partitions and the relations between them.
//!
//! A [`Scope`] names a classpath partition and lists the scopes it extends:
//! resolving `test` also pulls everything declared for `runtime` and
//! `provided`, and resolving `runtime` pulls everything declared for
//! `compile`. A [`ScopeMapping`] is a set of `(from, to)` pairs translating
//! the consumer's requested scope into scopes of the dependency's own
//! descriptor.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named classpath partition. Equality, ordering and hashing use the name only.
#[derive(Debug, Clone)]
pub struct Scope {
    name: String,
    extending: Vec<Scope>,
}

impl Scope {
    /// A custom scope extending nothing.
    pub fn of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extending: Vec::new(),
        }
    }

    /// Return a copy of this scope that also extends `parents`.
    pub fn extending(mut self, parents: &[Scope]) -> Self {
        for parent in parents {
            if !self.extending.contains(parent) {
                self.extending.push(parent.clone());
            }
        }
        self
    }

    pub fn compile() -> Self {
        Scope::of("compile")
    }

    pub fn runtime() -> Self {
        Scope::of("runtime").extending(&[Scope::compile()])
    }

    pub fn provided() -> Self {
        Scope::of("provided")
    }

    pub fn test() -> Self {
        Scope::of("test").extending(&[Scope::runtime(), Scope::provided()])
    }

    /// The standard scope with this name, or a custom scope when unknown.
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "compile" => Scope::compile(),
            "runtime" => Scope::runtime(),
            "provided" => Scope::provided(),
            "test" => Scope::test(),
            _ => Scope::of(name.trim()),
        }
    }

    /// Parse `compile+runtime` or `compile, runtime` into standard scopes.
    pub fn parse_list(input: &str) -> Vec<Scope> {
        input
            .split(['+', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Scope::by_name)
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scopes this one directly extends.
    pub fn extended_scopes(&self) -> &[Scope] {
        &self.extending
    }

    /// Every scope this one transitively extends, excluding itself.
    pub fn ancestors(&self) -> BTreeSet<Scope> {
        let mut out = BTreeSet::new();
        let mut stack: Vec<&Scope> = self.extending.iter().collect();
        while let Some(scope) = stack.pop() {
            if out.insert(scope.clone()) {
                stack.extend(scope.extending.iter());
            }
        }
        out
    }

    /// `true` if `self` transitively extends `other`.
    pub fn extends(&self, other: &Scope) -> bool {
        self.ancestors().contains(other)
    }

    /// `true` when `self` is one of `scopes`, or one of `scopes` transitively
    /// extends `self`. A dependency declared with scope D takes part in the
    /// resolution of R iff `D.is_in_or_inherited_by_any_of([R])`.
    pub fn is_in_or_inherited_by_any_of<'a>(&self, scopes: impl IntoIterator<Item = &'a Scope>) -> bool {
        scopes
            .into_iter()
            .any(|scope| scope == self || scope.extends(self))
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Scope::by_name(&raw))
    }
}

/// A relation from declaring scopes to target scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeMapping {
    pairs: BTreeSet<(Scope, Scope)>,
}

impl ScopeMapping {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map every scope of `from` to every scope of `to`.
    pub fn of(from: &[Scope], to: &[Scope]) -> Self {
        Self::empty().and(from, to)
    }

    /// Return a new mapping with the extra `from x to` pairs.
    pub fn and(&self, from: &[Scope], to: &[Scope]) -> Self {
        let mut pairs = self.pairs.clone();
        for f in from {
            for t in to {
                pairs.insert((f.clone(), t.clone()));
            }
        }
        Self { pairs }
    }

    /// The mapping applied to simply-scoped module dependencies.
    pub fn java_default() -> Self {
        Self::of(&[Scope::compile()], &[Scope::compile()])
            .and(&[Scope::runtime()], &[Scope::runtime()])
            .and(&[Scope::provided()], &[Scope::compile()])
            .and(&[Scope::test()], &[Scope::runtime()])
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Declaring (left-hand) scopes.
    pub fn entries(&self) -> BTreeSet<Scope> {
        self.pairs.iter().map(|(from, _)| from.clone()).collect()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&Scope, &Scope)> {
        self.pairs.iter().map(|(from, to)| (from, to))
    }

    /// `true` if some declaring scope takes part in resolving `scope`.
    pub fn is_involving(&self, scope: &Scope) -> bool {
        self.pairs
            .iter()
            .any(|(from, _)| from.is_in_or_inherited_by_any_of([scope]))
    }

    /// Targets of every pair whose declaring scope takes part in resolving `scope`.
    pub fn target_scopes(&self, scope: &Scope) -> BTreeSet<Scope> {
        self.pairs
            .iter()
            .filter(|(from, _)| from.is_in_or_inherited_by_any_of([scope]))
            .map(|(_, to)| to.clone())
            .collect()
    }
}

impl fmt::Display for ScopeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .pairs
            .iter()
            .map(|(from, to)| format!("{from}->{to}"))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}
