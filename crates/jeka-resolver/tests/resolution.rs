use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jeka_core::dependency::{ComputedDependency, ModuleDependency, Transitivity};
use jeka_core::dependency_set::DependencySet;
use jeka_core::module_id::ModuleId;
use jeka_core::scope::{Scope, ScopeMapping};
use jeka_repo::client::RepositoryClient;
use jeka_repo::descriptor::{DescriptorDependency, ModuleDescriptor};
use jeka_repo::memory::MemoryRepository;
use jeka_resolver::{ConflictStrategy, ResolutionError, Resolver, ResolverConfig};
use jeka_util::errors::JekaError;

fn id(name: &str) -> ModuleId {
    ModuleId::new("org.ex", name).unwrap()
}

/// `name:version` depending on `name:version` entries with a Maven scope.
fn module(coordinate: &str, dependencies: &[(&str, &str)]) -> ModuleDescriptor {
    let (name, version) = coordinate.split_once(':').unwrap();
    dependencies
        .iter()
        .fold(ModuleDescriptor::new(id(name), version), |descriptor, (dep, scope)| {
            let coordinate = format!("org.ex:{dep}");
            descriptor.with_dependency(DescriptorDependency::parse(&coordinate, scope).unwrap())
        })
}

fn dep(coordinate: &str) -> ModuleDependency {
    ModuleDependency::parse(&format!("org.ex:{coordinate}")).unwrap()
}

fn compile() -> [Scope; 1] {
    [Scope::compile()]
}

/// a:1.0 -> lib:1.0, b:1.0 -> lib:2.0
fn diamond() -> MemoryRepository {
    MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[("lib:1.0", "compile")]))
        .with_module(module("b:1.0", &[("lib:2.0", "compile")]))
        .with_module(module("lib:1.0", &[]))
        .with_module(module("lib:2.0", &[]))
}

fn diamond_set() -> DependencySet {
    DependencySet::of()
        .and(dep("a:1.0"), &compile())
        .and(dep("b:1.0"), &compile())
}

#[test]
fn latest_wins_evicts_older_occurrence() {
    let result = Resolver::new(diamond()).resolve(&diamond_set(), &[]).unwrap();
    let tree = result.dependency_tree();
    let old = tree.children()[0].children()[0].module_info().unwrap();
    assert_eq!(old.requested_version, "1.0");
    assert_eq!(old.resolved_version, "2.0");
    assert!(old.evicted);
    assert!(old.files.is_empty());
    assert!(tree.to_string_tree().contains("org.ex:lib:1.0 [compile] (evicted by 2.0)"));

    let files: Vec<String> = result.files().iter().map(|p| p.display().to_string()).collect();
    assert!(files.iter().any(|f| f.ends_with("lib-2.0.jar")));
    assert!(!files.iter().any(|f| f.ends_with("lib-1.0.jar")));
    assert!(result.errors().is_empty());
}

#[test]
fn strict_reports_conflicts_and_keeps_a_tree() {
    let result = Resolver::new(diamond())
        .with_strategy(ConflictStrategy::Strict)
        .resolve(&diamond_set(), &[])
        .unwrap();
    assert_eq!(result.errors().len(), 1);
    match &result.errors()[0] {
        ResolutionError::VersionConflict { module, versions, paths } => {
            assert_eq!(module, &id("lib"));
            assert_eq!(versions, &vec!["1.0".to_string(), "2.0".to_string()]);
            assert_eq!(
                paths,
                &vec![
                    "org.ex:a:1.0 > org.ex:lib:1.0".to_string(),
                    "org.ex:b:1.0 > org.ex:lib:2.0".to_string()
                ]
            );
        }
        other => panic!("unexpected error {other:?}"),
    }
    let err = result.assert_no_error().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("1.0") && message.contains("2.0"));
    assert_eq!(result.dependency_tree().children().len(), 2);
}

#[test]
fn strict_without_conflict_is_clean() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[("lib:1.0", "compile")]))
        .with_module(module("b:1.0", &[("lib:1.0", "compile")]))
        .with_module(module("lib:1.0", &[]));
    let result = Resolver::new(repository)
        .with_strategy(ConflictStrategy::Strict)
        .resolve(&diamond_set(), &[])
        .unwrap();
    assert!(result.assert_no_error().is_ok());
    assert!(result.conflicts().is_empty());
}

/// p -> a:1.0 -> y:5.0 ; q -> a:2.0 ; r -> y:1.0
fn evicted_parent() -> (MemoryRepository, DependencySet) {
    let repository = MemoryRepository::new("mem")
        .with_module(module("p:1.0", &[("a:1.0", "compile")]))
        .with_module(module("q:1.0", &[("a:2.0", "compile")]))
        .with_module(module("r:1.0", &[("y:1.0", "compile")]))
        .with_module(module("a:1.0", &[("y:5.0", "compile")]))
        .with_module(module("a:2.0", &[]))
        .with_module(module("y:1.0", &[]))
        .with_module(module("y:5.0", &[]));
    let set = DependencySet::of()
        .and(dep("p:1.0"), &compile())
        .and(dep("q:1.0"), &compile())
        .and(dep("r:1.0"), &compile());
    (repository, set)
}

#[test]
fn nodes_below_evicted_modules_do_not_vote() {
    let (repository, set) = evicted_parent();
    let result = Resolver::new(repository).resolve(&set, &[]).unwrap();

    let kept: Vec<String> = result
        .dependency_tree()
        .resolved_modules()
        .into_iter()
        .map(|(m, v)| format!("{}:{v}", m.name()))
        .collect();
    assert_eq!(kept, vec!["p:1.0", "q:1.0", "a:2.0", "r:1.0", "y:1.0"]);
    assert_eq!(result.conflicts().len(), 1, "y:5.0 does not vote");
}

#[test]
fn strict_reports_conflicts_below_evicted_nodes() {
    let (repository, set) = evicted_parent();
    let result = Resolver::new(repository)
        .with_strategy(ConflictStrategy::Strict)
        .resolve(&set, &[])
        .unwrap();

    let reported: Vec<(String, Vec<String>, Vec<String>)> = result
        .errors()
        .iter()
        .map(|e| match e {
            ResolutionError::VersionConflict { module, versions, paths } => {
                (module.name().to_string(), versions.clone(), paths.clone())
            }
            other => panic!("unexpected error {other:?}"),
        })
        .collect();
    assert_eq!(reported.len(), 2);
    assert_eq!(reported[0].0, "a");
    assert_eq!(reported[0].1, vec!["1.0", "2.0"]);
    assert_eq!(reported[1].0, "y");
    assert_eq!(reported[1].1, vec!["1.0", "5.0"]);
    assert_eq!(
        reported[1].2,
        vec!["org.ex:r:1.0 > org.ex:y:1.0", "org.ex:p:1.0 > org.ex:a:1.0 > org.ex:y:5.0"]
    );
    assert_eq!(result.conflicts().len(), 2);
    assert!(result.assert_no_error().is_err());
}

#[test]
fn graph_size_is_bounded() {
    let resolve = |max_graph_nodes: usize| {
        let config = ResolverConfig {
            max_graph_nodes,
            ..ResolverConfig::default()
        };
        Resolver::new(diamond()).with_config(config).resolve(&diamond_set(), &[])
    };
    // root, a, lib:1.0, b, lib:2.0
    assert!(resolve(5).is_ok());
    let err = resolve(4).unwrap_err();
    assert!(matches!(err, JekaError::Resolution { .. }));
    assert!(err.to_string().contains("org.ex:lib:2.0 (path org.ex:b)"), "got: {err}");
}

#[test]
fn forcing_direct_versions_can_be_disabled() {
    let repository = diamond().with_module(module("lib:0.5", &[]));
    let set = diamond_set().and(dep("lib:0.5"), &compile());

    let forced = Resolver::new(repository.clone()).resolve(&set, &[]).unwrap();
    let direct = forced.dependency_tree().children_of(&id("lib"))[0].module_info().unwrap();
    assert_eq!(direct.resolved_version, "0.5");
    assert!(!direct.evicted);

    let config = ResolverConfig {
        force_direct_versions: false,
        ..ResolverConfig::default()
    };
    let latest = Resolver::new(repository).with_config(config).resolve(&set, &[]).unwrap();
    let direct = latest.dependency_tree().children_of(&id("lib"))[0].module_info().unwrap();
    assert_eq!(direct.resolved_version, "2.0");
    assert!(direct.evicted);
}

#[test]
fn transitivity_limits_expansion() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[("c:1.0", "compile"), ("r:1.0", "runtime")]))
        .with_module(module("c:1.0", &[]))
        .with_module(module("r:1.0", &[]));
    let resolver = Resolver::new(repository);

    let none = DependencySet::of().and(dep("a:1.0").with_transitivity(Transitivity::None), &[Scope::runtime()]);
    let result = resolver.resolve(&none, &[]).unwrap();
    assert!(result.dependency_tree().children()[0].children().is_empty());
    assert_eq!(result.files().len(), 1);

    let compile_only = DependencySet::of().and(dep("a:1.0").with_transitivity(Transitivity::Compile), &[Scope::runtime()]);
    let result = resolver.resolve(&compile_only, &[]).unwrap();
    let names: Vec<&str> = result.dependency_tree().children()[0]
        .children()
        .iter()
        .filter_map(|n| n.module_id().map(ModuleId::name))
        .collect();
    assert_eq!(names, vec!["c"]);

    let full = DependencySet::of().and(dep("a:1.0"), &[Scope::runtime()]);
    let result = resolver.resolve(&full, &[]).unwrap();
    assert_eq!(result.dependency_tree().children()[0].children().len(), 2);
}

#[test]
fn runtime_resolution_follows_runtime_dependencies_of_compile_modules() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("app:1.0", &[("api:1.0", "compile"), ("driver:1.0", "runtime")]))
        .with_module(module("api:1.0", &[]))
        .with_module(module("driver:1.0", &[]));
    let set = DependencySet::of().and(dep("app:1.0"), &compile());
    let resolver = Resolver::new(repository);
    let jars = |scope: Scope| -> Vec<String> {
        let result = resolver.resolve(&set, &[scope]).unwrap();
        result
            .files()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    };

    assert_eq!(jars(Scope::compile()), vec!["app-1.0.jar", "api-1.0.jar"]);
    assert_eq!(jars(Scope::runtime()), vec!["app-1.0.jar", "api-1.0.jar", "driver-1.0.jar"]);
    assert_eq!(jars(Scope::test()), vec!["app-1.0.jar", "api-1.0.jar", "driver-1.0.jar"]);

    let result = resolver.resolve(&set, &[Scope::runtime()]).unwrap();
    let driver = result.dependency_tree().first(&id("driver")).unwrap();
    assert_eq!(driver.declared_scopes().into_iter().collect::<Vec<_>>(), vec![Scope::runtime()]);
}

#[test]
fn scope_mapping_selects_pulled_scopes() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[("c:1.0", "compile"), ("r:1.0", "runtime")]))
        .with_module(module("c:1.0", &[]))
        .with_module(module("r:1.0", &[]));
    let resolver = Resolver::new(repository);

    let to_compile = DependencySet::of().and_mapped(dep("a:1.0"), ScopeMapping::of(&[Scope::compile()], &[Scope::compile()]));
    let result = resolver.resolve(&to_compile, &[Scope::compile()]).unwrap();
    let node = &result.dependency_tree().children()[0];
    assert_eq!(node.declared_scopes().into_iter().collect::<Vec<_>>(), vec![Scope::compile()]);
    assert_eq!(node.children().len(), 1);

    let to_runtime = DependencySet::of().and_mapped(dep("a:1.0"), ScopeMapping::of(&[Scope::compile()], &[Scope::runtime()]));
    let result = resolver.resolve(&to_runtime, &[Scope::compile()]).unwrap();
    assert_eq!(result.dependency_tree().children()[0].children().len(), 2);

    let unrelated = resolver.resolve(&to_runtime, &[Scope::of("tooling")]).unwrap();
    assert!(unrelated.dependency_tree().children().is_empty());
}

#[test]
fn unscoped_dependencies_use_default_scopes() {
    let repository = MemoryRepository::new("mem").with_module(module("a:1.0", &[]));
    let set = DependencySet::of().and(dep("a:1.0"), &[]);
    let resolver = Resolver::new(repository);

    let result = resolver.resolve(&set, &[Scope::compile()]).unwrap();
    assert_eq!(result.dependency_tree().children()[0].declared_scopes().len(), 1);
    let result = resolver.resolve(&set, &[Scope::provided()]).unwrap();
    assert!(result.dependency_tree().children().is_empty());
}

#[test]
fn duplicate_direct_declarations_merge() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[]))
        .with_module(module("a:2.0", &[]));
    let set = DependencySet::of()
        .and(dep("a:1.0"), &[Scope::compile()])
        .and(dep("a:2.0"), &[Scope::test()]);
    let result = Resolver::new(repository).resolve(&set, &[]).unwrap();
    let tree = result.dependency_tree();
    assert_eq!(tree.children().len(), 1);
    let info = tree.children()[0].module_info().unwrap();
    assert_eq!(info.requested_version, "1.0");
    assert_eq!(info.declared_scopes.len(), 2);
}

#[test]
fn cycles_are_cut() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[("b:1.0", "compile")]))
        .with_module(module("b:1.0", &[("a:1.0", "compile")]));
    let set = DependencySet::of().and(dep("a:1.0"), &compile());
    let result = Resolver::new(repository).resolve(&set, &[]).unwrap();
    let a = &result.dependency_tree().children()[0];
    assert_eq!(a.children().len(), 1);
    assert!(a.children()[0].children().is_empty());
    assert_eq!(result.files().len(), 2);
}

#[test]
fn unresolvable_modules_are_collected() {
    let repository = MemoryRepository::new("mem")
        .with_module(module("a:1.0", &[("ghost:1.0", "compile")]))
        .with_module(module("b:1.0", &[("ghost:1.0", "compile")]));
    let set = diamond_set().and(dep("missing:3.0"), &compile());
    let result = Resolver::new(repository).resolve(&set, &[]).unwrap();

    assert_eq!(result.dependency_tree().children().len(), 2);
    assert_eq!(result.errors().len(), 2, "the same missing module is reported once");
    assert!(matches!(
        &result.errors()[0],
        ResolutionError::UnresolvableModule { module, version: Some(v), .. } if module == &id("ghost") && v == "1.0"
    ));
    assert_eq!(result.errors()[1].module(), &id("missing"));
    assert!(result.assert_no_error().is_err());
}

#[test]
fn file_dependencies_are_leaves_and_deduplicated() {
    let repository = MemoryRepository::new("mem").with_module(module("a:1.0", &[]));
    let set = DependencySet::of()
        .and_files(["libs/x.jar", "libs/y.jar"], &compile())
        .and(dep("a:1.0"), &compile())
        .and_files(["libs/y.jar"], &[Scope::runtime()]);
    let result = Resolver::new(repository).resolve(&set, &[]).unwrap();
    let files: Vec<String> = result.files().iter().map(|p| p.display().to_string()).collect();
    assert_eq!(
        files,
        vec![
            "libs/x.jar",
            "libs/y.jar",
            "/memory/mem/org/ex/a/1.0/a-1.0.jar"
        ]
    );
    assert_eq!(result.dependency_tree().children().len(), 3);
}

#[test]
fn computed_dependencies_run_their_generator() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("build/core.jar");
    let runs = Arc::new(AtomicUsize::new(0));

    let target = output.clone();
    let counter = Arc::clone(&runs);
    let computed = ComputedDependency::new("core project", [output.clone()], move || {
        counter.fetch_add(1, Ordering::SeqCst);
        fs::create_dir_all(target.parent().unwrap())?;
        fs::write(&target, b"jar")?;
        Ok(())
    });
    let set = DependencySet::of().and_computed(computed, &compile());
    let resolver = Resolver::new(MemoryRepository::new("mem"));

    let result = resolver.resolve(&set, &[]).unwrap();
    assert_eq!(result.files(), [output.clone()]);
    resolver.resolve(&set, &[]).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1, "existing outputs are reused");
}

#[test]
fn computed_dependency_without_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let computed = ComputedDependency::new("broken project", [dir.path().join("never.jar")], || Ok(()));
    let set = DependencySet::of().and_computed(computed, &compile());
    let err = Resolver::new(MemoryRepository::new("mem")).resolve(&set, &[]).unwrap_err();
    assert!(matches!(err, JekaError::MissingComputedDependencyOutput { .. }));
}

struct Unreachable;

impl RepositoryClient for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn available_versions(&self, _module: &ModuleId) -> Result<Vec<String>, JekaError> {
        Err(self.error())
    }

    fn descriptor(&self, _module: &ModuleId, _version: &str) -> Result<Option<ModuleDescriptor>, JekaError> {
        Err(self.error())
    }

    fn artifact_files(&self, _module: &ModuleId, _version: &str, _classifier: Option<&str>) -> Result<Vec<PathBuf>, JekaError> {
        Err(self.error())
    }
}

impl Unreachable {
    fn error(&self) -> JekaError {
        JekaError::RepositoryAccess {
            repository: "unreachable".to_string(),
            message: "connection refused".to_string(),
        }
    }
}

#[test]
fn repository_failures_abort_resolution() {
    let set = DependencySet::of().and(dep("a:1.0"), &compile());
    let err = Resolver::new(Unreachable).resolve(&set, &[]).unwrap_err();
    assert!(matches!(err, JekaError::RepositoryAccess { .. }));
}

#[test]
fn root_shows_the_module_holder() {
    let holder = ModuleDependency::parse("org.app:app:1.0-SNAPSHOT").unwrap();
    let result = Resolver::new(diamond())
        .with_module_holder(holder)
        .resolve(&diamond_set(), &[])
        .unwrap();
    let tree = result.dependency_tree();
    assert_eq!(tree.label(), "org.app:app:1.0-SNAPSHOT");
    assert!(tree.module_info().is_none());

    let json = serde_json::to_value(tree).unwrap();
    assert_eq!(json["module"], "org.app:app");
    assert_eq!(json["children"][0]["children"][0]["evicted"], true);
    assert_eq!(json["children"][1]["children"][0]["resolved_version"], "2.0");
}
