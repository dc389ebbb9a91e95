//! Core data types for the Jeka dependency engine.
//!
//! This crate defines the value model used to declare dependencies: module
//! identifiers, declared versions and the Maven version ordering, scopes and
//! scope mappings, module/file/computed dependencies, scoped dependencies and
//! the immutable dependency set built on top of them. It also reads the
//! project manifest (`jeka.toml`), the global configuration, plain text
//! dependency descriptions and local library directories.
//!
//! This crate is intentionally free of async code and network I/O.

pub mod config;
pub mod dependency;
pub mod dependency_set;
pub mod local_libs;
pub mod manifest;
pub mod module_id;
pub mod scope;
pub mod scoped_dependency;
pub mod text;
pub mod version;
pub mod version_provider;

pub use dependency::{ComputedDependency, Dependency, Exclusion, FileDependency, ModuleDependency, Transitivity};
pub use dependency_set::{DependencySet, DuplicateStrategy};
pub use module_id::ModuleId;
pub use scope::{Scope, ScopeMapping};
pub use scoped_dependency::{Qualifier, ScopedDependency};
pub use version::Version;
pub use version_provider::VersionProvider;
