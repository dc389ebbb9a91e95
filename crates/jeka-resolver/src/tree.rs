//! The resolved dependency tree: an immutable snapshot produced by one resolution.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

use jeka_core::module_id::ModuleId;
use jeka_core::scope::Scope;
use serde::Serialize;

/// What a node of the resolved tree stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeInfo {
    /// The resolving module itself.
    Root {
        module: Option<ModuleId>,
        version: Option<String>,
    },
    Module(ModuleNodeInfo),
    Files(FileNodeInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleNodeInfo {
    pub module: ModuleId,
    pub classifier: Option<String>,
    /// Scopes this node was reached through, as seen from its parent.
    pub declared_scopes: BTreeSet<Scope>,
    /// Version as declared; may be dynamic.
    pub declared_version: String,
    /// Concrete version this occurrence asked for.
    pub requested_version: String,
    /// Version kept for the module across the whole graph.
    pub resolved_version: String,
    pub evicted: bool,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNodeInfo {
    pub declared_scopes: BTreeSet<Scope>,
    pub files: Vec<PathBuf>,
}

impl ModuleNodeInfo {
    pub fn has_dynamic_declaration(&self) -> bool {
        self.declared_version != self.requested_version
    }
}

/// A node of the resolved tree, with its children in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependencyNode {
    #[serde(flatten)]
    info: NodeInfo,
    children: Vec<ResolvedDependencyNode>,
}

impl ResolvedDependencyNode {
    pub fn new(info: NodeInfo, children: Vec<ResolvedDependencyNode>) -> Self {
        Self { info, children }
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn children(&self) -> &[ResolvedDependencyNode] {
        &self.children
    }

    /// Direct children standing for `module`.
    pub fn children_of(&self, module: &ModuleId) -> Vec<&ResolvedDependencyNode> {
        self.children
            .iter()
            .filter(|c| c.module_id() == Some(module))
            .collect()
    }

    /// First descendant standing for `module`, depth-first pre-order.
    pub fn first(&self, module: &ModuleId) -> Option<&ResolvedDependencyNode> {
        self.descendants().find(|n| n.module_id() == Some(module))
    }

    /// Module details, `None` for the root and file nodes.
    pub fn module_info(&self) -> Option<&ModuleNodeInfo> {
        match &self.info {
            NodeInfo::Module(info) => Some(info),
            _ => None,
        }
    }

    pub fn module_id(&self) -> Option<&ModuleId> {
        self.module_info().map(|m| &m.module)
    }

    pub fn is_evicted(&self) -> bool {
        self.module_info().is_some_and(|m| m.evicted)
    }

    pub fn declared_scopes(&self) -> BTreeSet<Scope> {
        match &self.info {
            NodeInfo::Root { .. } => BTreeSet::new(),
            NodeInfo::Module(m) => m.declared_scopes.clone(),
            NodeInfo::Files(f) => f.declared_scopes.clone(),
        }
    }

    /// Files carried by this node itself.
    pub fn files(&self) -> &[PathBuf] {
        match &self.info {
            NodeInfo::Root { .. } => &[],
            NodeInfo::Module(m) => &m.files,
            NodeInfo::Files(f) => &f.files,
        }
    }

    /// All nodes below this one, depth-first pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = &ResolvedDependencyNode> {
        let mut stack: Vec<&ResolvedDependencyNode> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Nodes below this one that are neither evicted nor under an evicted
    /// node, depth-first pre-order.
    pub fn kept_descendants(&self) -> Vec<&ResolvedDependencyNode> {
        let mut kept = Vec::new();
        let mut stack: Vec<&ResolvedDependencyNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if node.is_evicted() {
                continue;
            }
            kept.push(node);
            stack.extend(node.children.iter().rev());
        }
        kept
    }

    /// Kept module ids with their version, in first-occurrence order.
    pub fn resolved_modules(&self) -> Vec<(&ModuleId, &str)> {
        let mut seen = HashSet::new();
        self.kept_descendants()
            .into_iter()
            .filter_map(ResolvedDependencyNode::module_info)
            .filter(|m| seen.insert(&m.module))
            .map(|m| (&m.module, m.resolved_version.as_str()))
            .collect()
    }

    /// The classpath: files of every kept node, pre-order, first occurrence
    /// of a path winning. Evicted subtrees contribute nothing.
    pub fn resolved_files(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for node in self.kept_descendants() {
            for file in node.files() {
                if seen.insert(file) {
                    files.push(file.clone());
                }
            }
        }
        files
    }

    /// Nodes from this one's child down to the first node standing for `module`.
    pub fn find_path(&self, module: &ModuleId) -> Option<Vec<&ResolvedDependencyNode>> {
        for child in &self.children {
            if child.module_id() == Some(module) {
                return Some(vec![child]);
            }
            if let Some(mut path) = child.find_path(module) {
                path.insert(0, child);
                return Some(path);
            }
        }
        None
    }

    /// One line describing this node, without indentation.
    pub fn label(&self) -> String {
        match &self.info {
            NodeInfo::Root {
                module: Some(module),
                version: Some(version),
            } => format!("{module}:{version}"),
            NodeInfo::Root {
                module: Some(module), ..
            } => module.to_string(),
            NodeInfo::Root { module: None, .. } => "<root>".to_string(),
            NodeInfo::Module(m) => {
                let mut label = format!("{}:{}", m.module, m.declared_version);
                if m.has_dynamic_declaration() {
                    label.push_str(&format!(" -> {}", m.requested_version));
                }
                if let Some(classifier) = &m.classifier {
                    label.push_str(&format!(" ({classifier})"));
                }
                push_scopes(&mut label, &m.declared_scopes);
                if m.evicted {
                    label.push_str(&format!(" (evicted by {})", m.resolved_version));
                }
                label
            }
            NodeInfo::Files(f) => {
                let names: Vec<String> = f.files.iter().map(|p| p.display().to_string()).collect();
                let mut label = format!("files: {}", names.join(", "));
                push_scopes(&mut label, &f.declared_scopes);
                label
            }
        }
    }

    /// One line per node, indented by depth, pre-order. `max_depth` limits
    /// how deep children are rendered; the root is depth 0.
    pub fn to_strings(&self, max_depth: Option<usize>) -> Vec<String> {
        let mut lines = vec![self.label()];
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render(&mut lines, "", i + 1 == count, 1, max_depth);
        }
        lines
    }

    pub fn to_string_tree(&self) -> String {
        let mut out = self.to_strings(None).join("\n");
        out.push('\n');
        out
    }

    fn render(&self, lines: &mut Vec<String>, prefix: &str, is_last: bool, depth: usize, max_depth: Option<usize>) {
        if max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{}", self.label()));
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render(lines, &child_prefix, i + 1 == count, depth + 1, max_depth);
        }
    }
}

fn push_scopes(label: &mut String, scopes: &BTreeSet<Scope>) {
    if scopes.is_empty() {
        return;
    }
    let names: Vec<&str> = scopes.iter().map(Scope::name).collect();
    label.push_str(&format!(" [{}]", names.join(", ")));
}

impl fmt::Display for ResolvedDependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_tree())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, version: &str, evicted_by: Option<&str>, children: Vec<ResolvedDependencyNode>) -> ResolvedDependencyNode {
        let module = ModuleId::new("org.ex", name).unwrap();
        let files = vec![PathBuf::from(format!("/repo/{name}-{version}.jar"))];
        ResolvedDependencyNode::new(
            NodeInfo::Module(ModuleNodeInfo {
                module,
                classifier: None,
                declared_scopes: BTreeSet::from([Scope::compile()]),
                declared_version: version.to_string(),
                requested_version: version.to_string(),
                resolved_version: evicted_by.unwrap_or(version).to_string(),
                evicted: evicted_by.is_some(),
                files: if evicted_by.is_some() { Vec::new() } else { files },
            }),
            children,
        )
    }

    fn sample() -> ResolvedDependencyNode {
        let shared = || module("shared", "2.0", None, vec![]);
        ResolvedDependencyNode::new(
            NodeInfo::Root {
                module: Some(ModuleId::new("org.app", "app").unwrap()),
                version: Some("1.0".to_string()),
            },
            vec![
                module("a", "1.0", None, vec![shared(), module("old", "0.9", Some("1.1"), vec![shared()])]),
                module("b", "1.0", None, vec![shared(), module("old", "1.1", None, vec![])]),
                ResolvedDependencyNode::new(
                    NodeInfo::Files(FileNodeInfo {
                        declared_scopes: BTreeSet::from([Scope::test()]),
                        files: vec![PathBuf::from("libs/x.jar")],
                    }),
                    vec![],
                ),
            ],
        )
    }

    #[test]
    fn first_is_pre_order() {
        let tree = sample();
        let old = ModuleId::new("org.ex", "old").unwrap();
        let first = tree.first(&old).unwrap().module_info().unwrap();
        assert_eq!(first.requested_version, "0.9");
        assert!(first.evicted);
        assert_eq!(tree.children()[1].children_of(&old).len(), 1);
        assert!(tree.children_of(&old).is_empty());
    }

    #[test]
    fn flattening_skips_evicted_and_duplicates() {
        let files = sample().resolved_files();
        let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "/repo/a-1.0.jar",
                "/repo/shared-2.0.jar",
                "/repo/b-1.0.jar",
                "/repo/old-1.1.jar",
                "libs/x.jar"
            ]
        );
    }

    #[test]
    fn resolved_modules_are_unique() {
        let tree = sample();
        let modules: Vec<String> = tree
            .resolved_modules()
            .into_iter()
            .map(|(m, v)| format!("{m}:{v}"))
            .collect();
        assert_eq!(modules, vec!["org.ex:a:1.0", "org.ex:shared:2.0", "org.ex:b:1.0", "org.ex:old:1.1"]);
    }

    #[test]
    fn rendering() {
        let expected = "\
org.app:app:1.0
├── org.ex:a:1.0 [compile]
│   ├── org.ex:shared:2.0 [compile]
│   └── org.ex:old:0.9 [compile] (evicted by 1.1)
│       └── org.ex:shared:2.0 [compile]
├── org.ex:b:1.0 [compile]
│   ├── org.ex:shared:2.0 [compile]
│   └── org.ex:old:1.1 [compile]
└── files: libs/x.jar [test]
";
        assert_eq!(sample().to_string_tree(), expected);
        assert_eq!(sample().to_strings(Some(1)).len(), 4);
    }

    #[test]
    fn path_to_module() {
        let tree = sample();
        let old = ModuleId::new("org.ex", "old").unwrap();
        let path: Vec<String> = tree.find_path(&old).unwrap().iter().map(|n| n.label()).collect();
        assert_eq!(path, vec!["org.ex:a:1.0 [compile]", "org.ex:old:0.9 [compile] (evicted by 1.1)"]);
        assert!(tree.find_path(&ModuleId::new("org.ex", "none").unwrap()).is_none());
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["kind"], "root");
        assert_eq!(json["module"], "org.app:app");
        assert_eq!(json["children"][0]["kind"], "module");
        assert_eq!(json["children"][0]["declared_scopes"][0], "compile");
        assert_eq!(json["children"][2]["kind"], "files");
    }
}
