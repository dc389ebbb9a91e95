//! Operation: explain why a module is part of the graph.

use jeka_core::module_id::ModuleId;
use jeka_resolver::ResolvedDependencyNode;

use crate::{project, ResolveOptions};

/// Options for `jeka why`.
#[derive(Debug, Clone, Default)]
pub struct WhyOptions {
    pub resolve: ResolveOptions,
    /// `group:name`
    pub module: String,
}

pub fn why(opts: &WhyOptions) -> miette::Result<()> {
    let module: ModuleId = opts.module.parse()?;
    let result = project::resolve(&opts.resolve)?;
    println!("{}", render(result.dependency_tree(), &module));
    Ok(())
}

/// The root-to-module path, one indented line per node.
pub fn render(tree: &ResolvedDependencyNode, module: &ModuleId) -> String {
    let Some(path) = tree.find_path(module) else {
        return format!("{module} is not part of the dependency tree.");
    };
    let mut lines = vec![format!("Path to {module}:"), format!("  {}", tree.label())];
    for (i, node) in path.iter().enumerate() {
        lines.push(format!("{}{}", "  ".repeat(i + 2), node.label()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jeka_core::dependency_set::DependencySet;
    use jeka_core::scope::Scope;
    use jeka_repo::descriptor::{DescriptorDependency, ModuleDescriptor};
    use jeka_repo::memory::MemoryRepository;
    use jeka_resolver::Resolver;

    #[test]
    fn renders_path_from_root() {
        let lib = ModuleId::new("org.ex", "lib").unwrap();
        let repository = MemoryRepository::new("mem")
            .with_module(
                ModuleDescriptor::new(ModuleId::new("org.ex", "app").unwrap(), "1.0")
                    .with_dependency(DescriptorDependency::new(lib.clone(), "1.0", "runtime")),
            )
            .with_module(ModuleDescriptor::new(lib.clone(), "1.0"));
        let set = DependencySet::of()
            .and_module("org.ex:app:1.0", &[Scope::runtime()])
            .unwrap();
        let result = Resolver::new(repository).resolve(&set, &[]).unwrap();

        let text = render(result.dependency_tree(), &lib);
        assert_eq!(
            text,
            "Path to org.ex:lib:\n  <root>\n    org.ex:app:1.0 [runtime]\n      org.ex:lib:1.0 [runtime]"
        );
        let unknown = ModuleId::new("org.ex", "nope").unwrap();
        assert_eq!(
            render(result.dependency_tree(), &unknown),
            "org.ex:nope is not part of the dependency tree."
        );
    }
}
