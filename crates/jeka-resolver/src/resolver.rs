//! Core resolution algorithm.
//!
//! Resolution runs in two passes. The first expands every declared
//! dependency depth-first into a raw graph where each occurrence of a module
//! keeps the version it asked for. The second elects one version per module
//! with the conflict strategy, marks the losers evicted, and builds the
//! resolved tree and classpath. Eviction is global over the graph built for
//! the requested scopes: occurrences reached through different scopes compete
//! with each other.

use std::collections::{BTreeSet, HashMap, HashSet};

use jeka_core::dependency::{Dependency, Exclusion, ModuleDependency, Transitivity};
use jeka_core::dependency_set::{DependencySet, DuplicateStrategy};
use jeka_core::module_id::ModuleId;
use jeka_core::scope::{Scope, ScopeMapping};
use jeka_core::scoped_dependency::{Qualifier, ScopedDependency};
use jeka_core::version::{self, Version};
use jeka_repo::client::RepositoryClient;
use jeka_util::errors::JekaError;
use petgraph::graph::NodeIndex;

use crate::conflict::{ConflictReport, ConflictStrategy, Occurrence, VersionConflict};
use crate::graph::{RawGraph, RawKind, RawModule};
use crate::result::{ResolutionError, ResolveResult};
use crate::session::ResolutionSession;
use crate::tree::{FileNodeInfo, ModuleNodeInfo, NodeInfo, ResolvedDependencyNode};

/// Descriptor scopes never followed transitively.
const NON_TRANSITIVE_SCOPES: [&str; 3] = ["test", "provided", "system"];

/// Settings passed to the resolver at call time.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub strategy: ConflictStrategy,
    /// Scopes of dependencies declared without any.
    pub default_scopes: Vec<Scope>,
    /// Direct exact versions win over transitive ones.
    pub force_direct_versions: bool,
    /// The resolving module, shown as the tree root.
    pub module_holder: Option<ModuleDependency>,
    /// Every occurrence gets its own node, so shared subtrees are expanded
    /// once per path. Resolution fails past this many nodes.
    pub max_graph_nodes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy: ConflictStrategy::default(),
            default_scopes: vec![Scope::compile()],
            force_direct_versions: true,
            module_holder: None,
            max_graph_nodes: 200_000,
        }
    }
}

/// Resolves dependency sets against a repository.
///
/// A resolver holds no state between calls; `resolve` may run concurrently
/// from several threads when the repository allows it.
pub struct Resolver {
    repository: Box<dyn RepositoryClient>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(repository: impl RepositoryClient + 'static) -> Self {
        Self {
            repository: Box::new(repository),
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn with_module_holder(mut self, holder: ModuleDependency) -> Self {
        self.config.module_holder = Some(holder);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn repository(&self) -> &dyn RepositoryClient {
        self.repository.as_ref()
    }

    /// Resolve `set` for `scopes`; no scope at all means every declared scope.
    ///
    /// Graph problems (unknown modules, strict conflicts) are collected on the
    /// result. Repository I/O failures and computed dependencies that fail to
    /// produce their files abort the resolution.
    pub fn resolve(&self, set: &DependencySet, scopes: &[Scope]) -> Result<ResolveResult, JekaError> {
        tracing::debug!(
            strategy = %self.config.strategy,
            scopes = ?scopes.iter().map(Scope::name).collect::<Vec<_>>(),
            dependencies = set.len(),
            "resolving"
        );
        let set = set.normalised(DuplicateStrategy::KeepFirst);
        let mut run = Run::new(self.repository.as_ref(), &self.config, &set, scopes);
        run.expand_direct()?;
        let election = run.reconcile();
        let result = run.finish(&election)?;
        tracing::debug!(
            modules = result.dependency_tree().resolved_modules().len(),
            files = result.files().len(),
            errors = result.errors().len(),
            "resolution finished"
        );
        Ok(result)
    }
}

/// A direct dependency after scope filtering and merging.
struct DirectRequest<'s> {
    dependency: &'s Dependency,
    /// Participating declared scopes; shown on the node.
    declared: BTreeSet<Scope>,
    /// Scopes of the dependency's own metadata to pull transitively.
    targets: BTreeSet<Scope>,
}

/// A module occurrence waiting to be expanded.
struct ModuleRequest<'a> {
    module: &'a ModuleId,
    classifier: Option<&'a str>,
    version: Option<Version>,
    declared: BTreeSet<Scope>,
    targets: BTreeSet<Scope>,
    transitivity: Transitivity,
    exclusions: &'a [Exclusion],
    direct: bool,
}

/// Outcome of version election.
struct Election {
    winners: HashMap<ModuleId, String>,
    evicted: HashSet<NodeIndex>,
    voters: Vec<NodeIndex>,
}

/// State of a single `resolve` call.
struct Run<'r> {
    session: ResolutionSession<'r>,
    config: &'r ResolverConfig,
    set: &'r DependencySet,
    scopes: &'r [Scope],
    /// `scopes`, or every scope declared in the set when none is requested.
    reach: Vec<Scope>,
    graph: RawGraph,
    errors: Vec<ResolutionError>,
}

impl<'r> Run<'r> {
    fn new(
        repository: &'r dyn RepositoryClient,
        config: &'r ResolverConfig,
        set: &'r DependencySet,
        scopes: &'r [Scope],
    ) -> Self {
        let holder = config.module_holder.as_ref();
        let graph = RawGraph::new(
            holder.map(|h| h.module.clone()),
            holder.and_then(|h| h.version.as_ref()).map(Version::to_string),
        );
        let reach = if scopes.is_empty() {
            let mut all: Vec<Scope> = Vec::new();
            for scope in set.iter().flat_map(|e| e.declared_scopes(&config.default_scopes)) {
                if !all.contains(&scope) {
                    all.push(scope);
                }
            }
            all
        } else {
            scopes.to_vec()
        };
        Self {
            session: ResolutionSession::new(repository),
            config,
            set,
            scopes,
            reach,
            graph,
            errors: Vec::new(),
        }
    }

    fn error(&mut self, error: ResolutionError) {
        if !self.errors.contains(&error) {
            tracing::debug!(%error, "resolution error");
            self.errors.push(error);
        }
    }

    /// Scopes `entry` takes part with and the scopes it pulls, or `None`
    /// when it is not part of the requested scopes.
    fn qualify(&self, entry: &ScopedDependency) -> Option<(BTreeSet<Scope>, BTreeSet<Scope>)> {
        let declared = entry.declared_scopes(&self.config.default_scopes);
        let participating: BTreeSet<Scope> = if self.scopes.is_empty() {
            declared
        } else {
            declared
                .into_iter()
                .filter(|d| d.is_in_or_inherited_by_any_of(self.scopes))
                .collect()
        };
        if participating.is_empty() {
            return None;
        }
        let targets: BTreeSet<Scope> = match entry.qualifier() {
            Qualifier::Mapping(mapping) => mapping
                .pairs()
                .filter(|(from, _)| participating.contains(*from))
                .map(|(_, to)| to.clone())
                .collect(),
            Qualifier::Scopes(_) => participating
                .iter()
                .flat_map(|d| pulled_targets(d, &self.reach))
                .collect(),
        };
        Some((participating, targets))
    }

    /// Filter the set by scope and merge direct modules declared more than once.
    fn direct_requests(&self) -> Vec<DirectRequest<'r>> {
        let set = self.set;
        let mut requests: Vec<DirectRequest<'r>> = Vec::new();
        let mut modules: HashMap<(&ModuleId, Option<&str>), usize> = HashMap::new();
        for entry in set.entries() {
            let Some((declared, targets)) = self.qualify(entry) else {
                continue;
            };
            let dependency = entry.dependency();
            if let Dependency::Module(m) = dependency {
                let key = (&m.module, m.classifier.as_deref());
                if let Some(&slot) = modules.get(&key) {
                    let kept = &mut requests[slot];
                    if let Some(first) = kept.dependency.as_module() {
                        if first.version != m.version {
                            tracing::warn!(
                                module = %m.module,
                                kept = ?first.version.as_ref().map(Version::as_str),
                                ignored = ?m.version.as_ref().map(Version::as_str),
                                "module declared twice with different versions, keeping the first"
                            );
                        }
                    }
                    kept.declared.extend(declared);
                    kept.targets.extend(targets);
                    continue;
                }
                modules.insert(key, requests.len());
            }
            requests.push(DirectRequest {
                dependency,
                declared,
                targets,
            });
        }
        requests
    }

    /// First pass: build the raw graph below the root.
    fn expand_direct(&mut self) -> Result<(), JekaError> {
        let root = self.graph.root();
        for request in self.direct_requests() {
            match request.dependency {
                Dependency::Module(m) => {
                    let mut path = Vec::new();
                    self.expand_module(
                        root,
                        ModuleRequest {
                            module: &m.module,
                            classifier: m.classifier.as_deref(),
                            version: m.version.clone(),
                            declared: request.declared,
                            targets: request.targets,
                            transitivity: m.transitivity,
                            exclusions: &m.exclusions,
                            direct: true,
                        },
                        &mut path,
                        &[],
                    )?;
                }
                Dependency::Files(f) => {
                    self.graph.add_child(root, RawKind::Files(f.files.clone()), request.declared);
                }
                Dependency::Computed(c) => {
                    let files = c.files()?;
                    self.graph.add_child(root, RawKind::Files(files), request.declared);
                }
            }
        }
        Ok(())
    }

    /// The concrete version `request` resolves to, or the error to collect.
    fn pick_version(&mut self, request: &ModuleRequest<'_>) -> Result<Result<(Version, String), ResolutionError>, JekaError> {
        let module = request.module;
        let version = self
            .set
            .version_provider()
            .get(module)
            .cloned()
            .or_else(|| request.version.clone());
        let Some(version) = version else {
            return Ok(Err(ResolutionError::UnresolvableModule {
                module: module.clone(),
                version: None,
                reason: "no version declared or provided".to_string(),
            }));
        };
        if !version.is_dynamic() {
            let exact = version.as_str().to_string();
            return Ok(Ok((version, exact)));
        }
        let available = self.session.available_versions(module)?;
        match version.select(available) {
            Some(selected) => {
                let selected = selected.to_string();
                tracing::debug!(%module, declared = %version, %selected, "dynamic version selected");
                Ok(Ok((version, selected)))
            }
            None => {
                let reason = format!("no published version matches ({} available)", available.len());
                Ok(Err(ResolutionError::UnresolvableModule {
                    module: module.clone(),
                    version: Some(version.to_string()),
                    reason,
                }))
            }
        }
    }

    fn expand_module(
        &mut self,
        parent: NodeIndex,
        request: ModuleRequest<'_>,
        path: &mut Vec<ModuleId>,
        inherited_exclusions: &[Exclusion],
    ) -> Result<(), JekaError> {
        let (version, concrete) = match self.pick_version(&request)? {
            Ok(picked) => picked,
            Err(error) => {
                self.error(error);
                return Ok(());
            }
        };
        let module = request.module;
        let Some(descriptor) = self.session.descriptor(module, &concrete)? else {
            self.error(ResolutionError::UnresolvableModule {
                module: module.clone(),
                version: Some(concrete),
                reason: "not found in any repository".to_string(),
            });
            return Ok(());
        };

        if self.graph.node_count() >= self.config.max_graph_nodes {
            return Err(JekaError::Resolution {
                message: format!(
                    "dependency graph exceeds {} nodes while expanding {module}:{concrete} (path {})",
                    self.config.max_graph_nodes,
                    describe_modules(path),
                ),
            });
        }
        let forced = request.direct && self.config.force_direct_versions && !version.is_dynamic();
        let idx = self.graph.add_child(
            parent,
            RawKind::Module(RawModule {
                module: module.clone(),
                classifier: request.classifier.map(str::to_string),
                declared_version: version.to_string(),
                requested_version: concrete,
                forced,
            }),
            request.declared,
        );

        let targets = match request.transitivity {
            Transitivity::None => return Ok(()),
            Transitivity::Compile => BTreeSet::from([Scope::compile()]),
            Transitivity::Runtime => request.targets,
        };
        let exclusions: Vec<Exclusion> = inherited_exclusions
            .iter()
            .chain(request.exclusions)
            .cloned()
            .collect();

        path.push(module.clone());
        for dependency in &descriptor.dependencies {
            if dependency.optional || NON_TRANSITIVE_SCOPES.contains(&dependency.scope.as_str()) {
                continue;
            }
            let child = &dependency.module;
            if path.contains(child) {
                tracing::debug!(module = %child, via = %module, "dependency cycle, not expanding");
                continue;
            }
            let excluded = exclusions
                .iter()
                .chain(self.set.global_exclusions())
                .any(|e| e.matches(child));
            if excluded {
                continue;
            }
            let scope = Scope::by_name(&dependency.scope);
            let child_targets: BTreeSet<Scope> = targets
                .iter()
                .filter(|t| scope.is_in_or_inherited_by_any_of([*t]))
                .cloned()
                .collect();
            if child_targets.is_empty() {
                continue;
            }
            let child_version = match dependency.version.as_deref().map(Version::parse).transpose() {
                Ok(v) => v,
                Err(e) => {
                    self.error(ResolutionError::UnresolvableModule {
                        module: child.clone(),
                        version: dependency.version.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            self.expand_module(
                idx,
                ModuleRequest {
                    module: child,
                    classifier: dependency.classifier.as_deref(),
                    version: child_version,
                    declared: child_targets.clone(),
                    targets: child_targets,
                    transitivity: Transitivity::Runtime,
                    exclusions: &dependency.exclusions,
                    direct: false,
                },
                path,
                &exclusions,
            )?;
        }
        path.pop();
        Ok(())
    }

    /// Second pass: elect one version per module until eviction is stable.
    fn reconcile(&self) -> Election {
        let mut evicted: HashSet<NodeIndex> = HashSet::new();
        let limit = self.graph.node_count() + 1;
        let mut round = 0;
        loop {
            round += 1;
            let voters = self.graph.voters(&evicted);
            let winners = self.elect(&voters);
            let next: HashSet<NodeIndex> = self
                .graph
                .module_nodes()
                .filter(|(_, m)| winners.get(&m.module).is_some_and(|w| *w != m.requested_version))
                .map(|(idx, _)| idx)
                .collect();
            let stable = next == evicted;
            if stable || round >= limit {
                if !stable {
                    tracing::warn!(rounds = round, "version election did not settle, keeping the last round");
                }
                return Election {
                    winners,
                    evicted: next,
                    voters,
                };
            }
            evicted = next;
        }
    }

    fn elect(&self, voters: &[NodeIndex]) -> HashMap<ModuleId, String> {
        let mut occurrences: HashMap<&ModuleId, Vec<Occurrence<'_>>> = HashMap::new();
        for &idx in voters {
            let node = self.graph.node(idx);
            if let Some(m) = node.as_module() {
                occurrences.entry(&m.module).or_default().push(Occurrence {
                    version: &m.requested_version,
                    depth: node.depth,
                    order: idx.index(),
                    forced: m.forced,
                });
            }
        }
        occurrences
            .into_iter()
            .filter_map(|(module, occ)| {
                self.config
                    .strategy
                    .select(&occ)
                    .map(|winner| (module.clone(), winner.to_string()))
            })
            .collect()
    }

    /// Conflicts in first-occurrence order: among voting occurrences, or
    /// among every occurrence in the graph under the strict strategy.
    fn conflicts(&mut self, election: &Election) -> ConflictReport {
        let occurrences: Vec<NodeIndex> = if self.config.strategy.is_strict() {
            self.graph.module_nodes().map(|(idx, _)| idx).collect()
        } else {
            election.voters.clone()
        };
        let mut versions: Vec<(ModuleId, Vec<(String, NodeIndex)>)> = Vec::new();
        for idx in occurrences {
            let Some(m) = self.graph.node(idx).as_module() else {
                continue;
            };
            let slot = match versions.iter().position(|(module, _)| module == &m.module) {
                Some(slot) => slot,
                None => {
                    versions.push((m.module.clone(), Vec::new()));
                    versions.len() - 1
                }
            };
            let seen = &mut versions[slot].1;
            if !seen.iter().any(|(v, _)| *v == m.requested_version) {
                seen.push((m.requested_version.clone(), idx));
            }
        }

        let mut report = ConflictReport::new();
        for (module, mut seen) in versions {
            if seen.len() < 2 {
                continue;
            }
            seen.sort_by(|(a, _), (b, _)| version::compare(a, b));
            let requested: Vec<String> = seen.iter().map(|(v, _)| v.clone()).collect();
            if self.config.strategy.is_strict() {
                let paths = seen.iter().map(|(_, idx)| self.graph.describe_path(*idx)).collect();
                self.error(ResolutionError::VersionConflict {
                    module: module.clone(),
                    versions: requested.clone(),
                    paths,
                });
            }
            let resolved = election.winners.get(&module).cloned().unwrap_or_default();
            report.add(VersionConflict {
                module,
                requested,
                resolved,
                strategy: self.config.strategy,
            });
        }
        report
    }

    fn finish(mut self, election: &Election) -> Result<ResolveResult, JekaError> {
        let conflicts = self.conflicts(election);
        let voters: HashSet<NodeIndex> = election.voters.iter().copied().collect();
        let tree = self.build_node(self.graph.root(), election, &voters)?;
        Ok(ResolveResult::new(tree, self.errors, conflicts))
    }

    fn build_node(
        &mut self,
        idx: NodeIndex,
        election: &Election,
        voters: &HashSet<NodeIndex>,
    ) -> Result<ResolvedDependencyNode, JekaError> {
        let node = self.graph.node(idx).clone();
        let info = match node.kind {
            RawKind::Root { module, version } => NodeInfo::Root { module, version },
            RawKind::Files(files) => NodeInfo::Files(FileNodeInfo {
                declared_scopes: node.scopes,
                files,
            }),
            RawKind::Module(m) => {
                let evicted = election.evicted.contains(&idx);
                let files = if evicted || !voters.contains(&idx) {
                    Vec::new()
                } else {
                    self.session
                        .artifact_files(&m.module, &m.requested_version, m.classifier.as_deref())?
                };
                let resolved_version = election
                    .winners
                    .get(&m.module)
                    .cloned()
                    .unwrap_or_else(|| m.requested_version.clone());
                NodeInfo::Module(ModuleNodeInfo {
                    module: m.module,
                    classifier: m.classifier,
                    declared_scopes: node.scopes,
                    declared_version: m.declared_version,
                    requested_version: m.requested_version,
                    resolved_version,
                    evicted,
                    files,
                })
            }
        };
        let mut children = Vec::new();
        for child in self.graph.children(idx) {
            children.push(self.build_node(child, election, voters)?);
        }
        Ok(ResolvedDependencyNode::new(info, children))
    }
}

/// Scopes of a module's own metadata pulled by a simple scope declaration.
fn default_targets(scope: &Scope) -> BTreeSet<Scope> {
    let mapping = ScopeMapping::java_default();
    let exact: BTreeSet<Scope> = mapping
        .pairs()
        .filter(|(from, _)| *from == scope)
        .map(|(_, to)| to.clone())
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    let inherited = mapping.target_scopes(scope);
    if inherited.is_empty() {
        BTreeSet::from([Scope::runtime()])
    } else {
        inherited
    }
}

fn describe_modules(path: &[ModuleId]) -> String {
    if path.is_empty() {
        return "direct".to_string();
    }
    path.iter().map(ToString::to_string).collect::<Vec<_>>().join(" > ")
}

/// Targets of `declared`, widened by the targets of every reached scope that
/// extends it: a `runtime` resolve through a `compile` declaration also pulls
/// the module's runtime dependencies.
fn pulled_targets(declared: &Scope, reach: &[Scope]) -> BTreeSet<Scope> {
    let mut targets = default_targets(declared);
    for scope in reach.iter().filter(|s| *s != declared && s.extends(declared)) {
        targets.extend(default_targets(scope));
    }
    targets
}
