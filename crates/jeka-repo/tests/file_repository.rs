use std::fs;
use std::path::Path;

use jeka_core::module_id::ModuleId;
use jeka_repo::cache::DownloadCache;
use jeka_repo::{FileRepository, MemoryRepository, ModuleDescriptor, RemoteRepository, RepositoryChain, RepositoryClient, RepositorySpec};
use jeka_util::errors::JekaError;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn pom(group: &str, artifact: &str, version: &str, deps: &str) -> String {
    format!(
        "<project><groupId>{group}</groupId><artifactId>{artifact}</artifactId>\
         <version>{version}</version><dependencies>{deps}</dependencies></project>"
    )
}

fn populate(root: &Path) {
    write(
        root,
        "org/ex/app/1.0/app-1.0.pom",
        &pom(
            "org.ex",
            "app",
            "1.0",
            "<dependency><groupId>org.ex</groupId><artifactId>lib</artifactId><version>[1.0,2.0)</version></dependency>\
             <dependency><groupId>junit</groupId><artifactId>junit</artifactId><version>4.12</version><scope>test</scope></dependency>",
        ),
    );
    write(root, "org/ex/app/1.0/app-1.0.jar", "jar");
    write(root, "org/ex/lib/1.0/lib-1.0.pom", &pom("org.ex", "lib", "1.0", ""));
    write(root, "org/ex/lib/1.5/lib-1.5.pom", &pom("org.ex", "lib", "1.5", ""));
    write(root, "org/ex/lib/1.5/lib-1.5.jar", "jar");
    write(
        root,
        "org/ex/lib/maven-metadata.xml",
        "<metadata><versioning><versions><version>1.0</version><version>1.2</version></versions></versioning></metadata>",
    );
}

#[test]
fn test_file_repository_versions_merge_metadata_and_listing() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let repo = FileRepository::new("local", dir.path());
    let lib = ModuleId::new("org.ex", "lib").unwrap();

    let mut versions = repo.available_versions(&lib).unwrap();
    versions.sort();
    assert_eq!(versions, vec!["1.0", "1.2", "1.5"]);

    let unknown = ModuleId::new("org.ex", "unknown").unwrap();
    assert!(repo.available_versions(&unknown).unwrap().is_empty());
}

#[test]
fn test_file_repository_descriptor_and_files() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let repo = FileRepository::new("local", dir.path());
    let app = ModuleId::new("org.ex", "app").unwrap();

    let descriptor = repo.descriptor(&app, "1.0").unwrap().unwrap();
    assert_eq!(descriptor.dependencies.len(), 2);
    assert_eq!(descriptor.dependencies[0].version.as_deref(), Some("[1.0,2.0)"));
    assert_eq!(descriptor.dependencies[1].scope, "test");

    assert_eq!(
        repo.artifact_files(&app, "1.0", None).unwrap(),
        vec![dir.path().join("org/ex/app/1.0/app-1.0.jar")]
    );
    assert!(repo.descriptor(&app, "2.0").unwrap().is_none());

    let lib = ModuleId::new("org.ex", "lib").unwrap();
    assert!(repo.artifact_files(&lib, "1.0", None).unwrap().is_empty());
}

#[test]
fn test_chain_falls_through_to_file_repository() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let app = ModuleId::new("org.ex", "app").unwrap();
    let chain = RepositoryChain::new()
        .with(MemoryRepository::new("empty"))
        .with(FileRepository::new("local", dir.path()));

    assert!(chain.descriptor(&app, "1.0").unwrap().is_some());
    assert_eq!(chain.artifact_files(&app, "1.0", None).unwrap().len(), 1);
}

#[test]
fn test_malformed_pom_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "org/ex/bad/1.0/bad-1.0.pom", "<project><groupId>x</project>");
    let repo = FileRepository::new("local", dir.path());
    let bad = ModuleId::new("org.ex", "bad").unwrap();
    assert!(repo.descriptor(&bad, "1.0").is_err());
}

#[test]
fn test_memory_descriptor_round_trip_through_chain() {
    let module = ModuleId::new("org.ex", "mem").unwrap();
    let chain = RepositoryChain::new().with(MemoryRepository::new("mem").with_module(ModuleDescriptor::new(module.clone(), "3.0")));
    assert_eq!(chain.available_versions(&module).unwrap(), vec!["3.0"]);
}

#[test]
fn test_unreachable_remote_reports_repository_access() {
    let cache = tempfile::tempdir().unwrap();
    let spec = RepositorySpec::new("dead", "http://127.0.0.1:9");
    let repo = RemoteRepository::new(spec, DownloadCache::new(cache.path()))
        .unwrap()
        .without_checksums();
    let module = ModuleId::new("org.ex", "lib").unwrap();
    let err = repo.available_versions(&module).unwrap_err();
    assert!(matches!(err, JekaError::RepositoryAccess { ref repository, .. } if repository == "dead"));
}

#[test]
fn test_remote_serves_cached_pom_without_network() {
    let cache = tempfile::tempdir().unwrap();
    write(cache.path(), "org/ex/lib/1.0/lib-1.0.pom", &pom("org.ex", "lib", "1.0", ""));
    write(cache.path(), "org/ex/lib/1.0/lib-1.0.jar", "jar");
    let spec = RepositorySpec::new("dead", "http://127.0.0.1:9");
    let repo = RemoteRepository::new(spec, DownloadCache::new(cache.path())).unwrap();
    let module = ModuleId::new("org.ex", "lib").unwrap();

    assert!(repo.descriptor(&module, "1.0").unwrap().is_some());
    assert_eq!(repo.artifact_files(&module, "1.0", None).unwrap().len(), 1);
}
