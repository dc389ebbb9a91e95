use std::collections::BTreeSet;

use jeka_core::dependency::{Dependency, Transitivity};
use jeka_core::manifest::{Manifest, RepositoryEntry};
use jeka_core::module_id::ModuleId;
use jeka_core::scope::Scope;
use jeka_core::scoped_dependency::Qualifier;

const MANIFEST: &str = r#"
dependencies-file = "deps.txt"

[module]
id = "org.example:app:1.0"

[resolution]
conflict-strategy = "strict"

[repositories]
central = "https://repo1.maven.org/maven2"
internal = { url = "https://repo.example.com/maven2", username = "u", password = "p" }

[versions]
"com.google.guava:guava" = "22.0"

[[dependency]]
module = "org.springframework.boot:spring-boot-starter-web:1.5.3.RELEASE"
scopes = ["compile", "runtime"]
exclusions = ["commons-logging"]

[[dependency]]
module = "com.google.guava:guava"
transitivity = "none"

[[dependency]]
module = "org.example:mapped:2.0"
mapping = { compile = ["runtime"] }

[[dependency]]
files = ["lib/a.jar"]
scopes = ["test"]

[exclusions]
global = ["org.slf4j:slf4j-log4j12"]
"#;

#[test]
fn test_parse_manifest_sections() {
    let manifest = Manifest::from_str(MANIFEST).unwrap();
    assert_eq!(manifest.resolution.conflict_strategy.as_deref(), Some("strict"));
    assert!(manifest.resolution.force_direct_versions);
    assert_eq!(manifest.resolution.default_scopes(), vec![Scope::compile()]);
    assert_eq!(manifest.dependencies.len(), 4);
    assert!(matches!(manifest.repositories["internal"], RepositoryEntry::Detailed { .. }));
    assert_eq!(manifest.repositories["central"].url(), "https://repo1.maven.org/maven2");

    let holder = manifest.module_holder().unwrap().unwrap();
    assert_eq!(holder.to_string(), "org.example:app:1.0");
}

#[test]
fn test_dependency_set_from_manifest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("deps.txt"), "- TEST\njunit:junit:4.12\n").unwrap();
    let manifest = Manifest::from_str(MANIFEST).unwrap();
    let set = manifest.dependency_set(dir.path()).unwrap();

    assert_eq!(set.len(), 5);
    assert_eq!(set.global_exclusions().len(), 1);

    let guava: ModuleId = "com.google.guava:guava".parse().unwrap();
    assert_eq!(set.version_provider().get(&guava).map(|v| v.to_string()), Some("22.0".into()));

    let Dependency::Module(web) = set.entries()[0].dependency() else {
        panic!("expected module dependency");
    };
    assert_eq!(web.exclusions.len(), 1);

    let Dependency::Module(guava_dep) = set.entries()[1].dependency() else {
        panic!("expected module dependency");
    };
    assert_eq!(guava_dep.transitivity, Transitivity::None);
    assert!(matches!(set.entries()[1].qualifier(), Qualifier::Scopes(s) if s.is_empty()));

    assert!(set.entries()[2].is_mapped());

    let Dependency::Files(files) = set.entries()[3].dependency() else {
        panic!("expected file dependency");
    };
    assert_eq!(files.files, vec![dir.path().join("lib/a.jar")]);

    assert_eq!(
        set.entries()[4].declared_scopes(&[]),
        BTreeSet::from([Scope::test()])
    );
}

#[test]
fn test_scopes_and_mapping_conflict() {
    let manifest = Manifest::from_str(
        r#"
[[dependency]]
module = "a:b:1.0"
scopes = ["compile"]
mapping = { compile = ["runtime"] }
"#,
    )
    .unwrap();
    let err = manifest.dependency_set(std::path::Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("Conflicting scope declaration"));
}

#[test]
fn test_entry_needs_exactly_one_kind() {
    let manifest = Manifest::from_str(
        r#"
[[dependency]]
module = "a:b:1.0"
files = ["x.jar"]
"#,
    )
    .unwrap();
    assert!(manifest.dependency_set(std::path::Path::new(".")).is_err());
}

#[test]
fn test_computed_entry() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = Manifest::from_str(
        r#"
[[dependency]]
computed = { command = "sh", args = ["-c", "mkdir -p out && echo jar > out/sub.jar"], files = ["out/sub.jar"] }
scopes = ["compile"]
"#,
    )
    .unwrap();
    let set = manifest.dependency_set(dir.path()).unwrap();
    let Dependency::Computed(computed) = set.entries()[0].dependency() else {
        panic!("expected computed dependency");
    };
    assert_eq!(computed.missing_files(), vec![dir.path().join("out/sub.jar")]);
    if cfg!(unix) {
        assert_eq!(computed.files().unwrap(), vec![dir.path().join("out/sub.jar")]);
        assert!(computed.missing_files().is_empty());
    }
}

#[test]
fn test_malformed_manifest() {
    assert!(Manifest::from_str("[[dependency]\n").is_err());
}
