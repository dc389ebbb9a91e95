//! Operation: display the resolved dependency tree.

use jeka_resolver::ResolveResult;
use jeka_util::errors::JekaError;

use crate::{project, ResolveOptions};

/// Options for `jeka tree`.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    pub resolve: ResolveOptions,
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Fail when the resolution collected errors.
    pub assert_no_error: bool,
    /// Print the tree as JSON instead of text.
    pub json: bool,
}

/// Resolve the project and print its tree, followed by collected errors.
pub fn tree(opts: &TreeOptions) -> miette::Result<()> {
    let result = project::resolve(&opts.resolve)?;
    println!("{}", render(&result, opts)?);
    if opts.assert_no_error {
        result.assert_no_error()?;
    }
    Ok(())
}

pub fn render(result: &ResolveResult, opts: &TreeOptions) -> Result<String, JekaError> {
    if opts.json {
        return serde_json::to_string_pretty(result.dependency_tree()).map_err(|e| JekaError::Generic {
            message: format!("Failed to serialise the dependency tree: {e}"),
        });
    }
    let mut lines = result.dependency_tree().to_strings(opts.depth);
    if result.has_errors() {
        lines.push(String::new());
        lines.push(format!("{} error(s):", result.errors().len()));
        lines.extend(result.errors().iter().map(|e| format!("  - {e}")));
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeka_core::dependency_set::DependencySet;
    use jeka_core::module_id::ModuleId;
    use jeka_core::scope::Scope;
    use jeka_repo::descriptor::{DescriptorDependency, ModuleDescriptor};
    use jeka_repo::memory::MemoryRepository;
    use jeka_resolver::Resolver;

    fn resolved() -> ResolveResult {
        let lib = ModuleId::new("org.ex", "lib").unwrap();
        let repository = MemoryRepository::new("mem")
            .with_module(
                ModuleDescriptor::new(ModuleId::new("org.ex", "app").unwrap(), "1.0")
                    .with_dependency(DescriptorDependency::new(lib.clone(), "1.0", "compile")),
            )
            .with_module(ModuleDescriptor::new(lib, "1.0"));
        let set = DependencySet::of()
            .and_module("org.ex:app:1.0", &[Scope::compile()])
            .unwrap()
            .and_module("org.ex:gone:2.0", &[Scope::compile()])
            .unwrap();
        Resolver::new(repository).resolve(&set, &[]).unwrap()
    }

    #[test]
    fn text_lists_tree_then_errors() {
        let text = render(&resolved(), &TreeOptions::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "<root>");
        assert_eq!(lines[1], "└── org.ex:app:1.0 [compile]");
        assert_eq!(lines[2], "    └── org.ex:lib:1.0 [compile]");
        assert_eq!(lines[4], "1 error(s):");
        assert!(lines[5].contains("org.ex:gone:2.0"));
    }

    #[test]
    fn depth_limits_rendering() {
        let opts = TreeOptions {
            depth: Some(1),
            ..TreeOptions::default()
        };
        let text = render(&resolved(), &opts).unwrap();
        assert!(text.contains("org.ex:app:1.0"));
        assert!(!text.contains("org.ex:lib:1.0"));
    }

    #[test]
    fn json_output() {
        let opts = TreeOptions {
            json: true,
            ..TreeOptions::default()
        };
        let text = render(&resolved(), &opts).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["kind"], "root");
        assert_eq!(value["children"][0]["module"], "org.ex:app");
    }
}
