//! Raw multi-version dependency graph, built before any version is reconciled.
//!
//! Every occurrence of a module gets its own node, so one module may appear
//! many times at different versions. Nodes are created in depth-first
//! pre-order; a node's index therefore doubles as its declaration order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_core::scope::Scope;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A module occurrence in the raw graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModule {
    pub module: ModuleId,
    pub classifier: Option<String>,
    /// Version as written where this occurrence was declared (possibly dynamic).
    pub declared_version: String,
    /// Concrete version this occurrence asks for.
    pub requested_version: String,
    /// Direct exact version that wins regardless of the transitive graph.
    pub forced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawKind {
    Root {
        module: Option<ModuleId>,
        version: Option<String>,
    },
    Module(RawModule),
    Files(Vec<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct RawNode {
    pub kind: RawKind,
    pub scopes: BTreeSet<Scope>,
    pub depth: usize,
}

impl RawNode {
    pub fn as_module(&self) -> Option<&RawModule> {
        match &self.kind {
            RawKind::Module(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for RawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RawKind::Root { module: Some(m), .. } => write!(f, "{m}"),
            RawKind::Root { module: None, .. } => write!(f, "<root>"),
            RawKind::Module(m) => write!(f, "{}:{}", m.module, m.requested_version),
            RawKind::Files(files) => write!(f, "{} file(s)", files.len()),
        }
    }
}

/// The raw dependency graph backed by petgraph. It is always a tree rooted at
/// the resolving module.
#[derive(Debug)]
pub struct RawGraph {
    graph: DiGraph<RawNode, ()>,
    root: NodeIndex,
}

impl RawGraph {
    pub fn new(module: Option<ModuleId>, version: Option<String>) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(RawNode {
            kind: RawKind::Root { module, version },
            scopes: BTreeSet::new(),
            depth: 0,
        });
        Self { graph, root }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Append `kind` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, kind: RawKind, scopes: BTreeSet<Scope>) -> NodeIndex {
        let depth = self.graph[parent].depth + 1;
        let idx = self.graph.add_node(RawNode { kind, scopes, depth });
        self.graph.add_edge(parent, idx, ());
        idx
    }

    pub fn node(&self, idx: NodeIndex) -> &RawNode {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Children in declaration order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        children.sort();
        children
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.source())
            .next()
    }

    /// Nodes from the root (excluded) down to `idx` (included).
    pub fn path_to(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![idx];
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            if parent == self.root {
                break;
            }
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// `a:b:1.0 > c:d:2.0` rendering of [`RawGraph::path_to`].
    pub fn describe_path(&self, idx: NodeIndex) -> String {
        self.path_to(idx)
            .into_iter()
            .map(|i| self.graph[i].to_string())
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Module nodes in pre-order.
    pub fn module_nodes(&self) -> impl Iterator<Item = (NodeIndex, &RawModule)> + '_ {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].as_module().map(|m| (idx, m)))
    }

    /// Nodes that take part in version election: every node whose ancestors
    /// are all kept. An evicted node still votes; its descendants do not.
    pub fn voters(&self, evicted: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        let mut voters = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(self.root).into_iter().rev().collect();
        while let Some(idx) = stack.pop() {
            voters.push(idx);
            if !evicted.contains(&idx) {
                stack.extend(self.children(idx).into_iter().rev());
            }
        }
        voters.sort();
        voters
    }
}
