//! Dependency resolution engine: builds the raw multi-version graph of a
//! dependency set, reconciles versions with a conflict strategy, and produces
//! the resolved dependency tree and the flattened classpath.

pub mod conflict;
pub mod graph;
pub mod resolver;
pub mod result;
pub mod session;
pub mod tree;

pub use conflict::{ConflictReport, ConflictStrategy, VersionConflict};
pub use resolver::{Resolver, ResolverConfig};
pub use result::{ResolutionError, ResolveResult};
pub use tree::{FileNodeInfo, ModuleNodeInfo, NodeInfo, ResolvedDependencyNode};
