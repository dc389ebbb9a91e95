//! POM parsing: dependencies, dependency management, parent reference,
//! properties and packaging.
//!
//! The XML is first read into a small element tree, then the few parts of the
//! project model that matter for resolution are picked out of it.

use std::collections::BTreeMap;

use jeka_util::errors::JekaError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// A parsed POM.
#[derive(Debug, Clone, Default)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependencies: Vec<PomDependency>,
    pub dependency_management: Vec<PomDependency>,
}

/// Reference to a parent POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// A `<dependency>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
    pub optional: bool,
    pub classifier: Option<String>,
    pub type_: Option<String>,
    /// `(groupId, artifactId)`; `*` artifact ids are stored as `None`.
    pub exclusions: Vec<(String, Option<String>)>,
}

impl PomDependency {
    fn same_module(&self, other: &PomDependency) -> bool {
        self.group_id == other.group_id && self.artifact_id == other.artifact_id
    }

    /// `true` for `<scope>import</scope><type>pom</type>` entries.
    pub fn is_bom_import(&self) -> bool {
        self.scope.as_deref() == Some("import") && self.type_.as_deref() == Some("pom")
    }
}

impl Pom {
    /// Group id, falling back to the parent's.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Version, falling back to the parent's.
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or(self.parent.as_ref().map(|p| p.version.as_str()))
    }

    /// `true` when the module publishes no jar.
    pub fn is_pom_packaging(&self) -> bool {
        self.packaging.as_deref() == Some("pom")
    }

    /// Replace `${...}` references with property values. Unknown references
    /// are left untouched.
    pub fn interpolate(&self, input: &str) -> String {
        let mut result = input.to_string();
        for _ in 0..20 {
            let Some(start) = result.find("${") else {
                break;
            };
            let Some(len) = result[start..].find('}') else {
                break;
            };
            let key = &result[start + 2..start + len];
            let Some(value) = self.property(key) else {
                break;
            };
            result = format!("{}{value}{}", &result[..start], &result[start + len + 1..]);
        }
        result
    }

    fn property(&self, key: &str) -> Option<String> {
        let key = key.strip_prefix("pom.").map_or_else(|| key.to_string(), |k| format!("project.{k}"));
        match key.as_str() {
            "project.groupId" => self.effective_group_id().map(str::to_string),
            "project.artifactId" => self.artifact_id.clone(),
            "project.version" => self.effective_version().map(str::to_string),
            "project.parent.groupId" => self.parent.as_ref().map(|p| p.group_id.clone()),
            "project.parent.version" => self.parent.as_ref().map(|p| p.version.clone()),
            other => self.properties.get(other).cloned(),
        }
    }

    /// Interpolate coordinates and versions of every dependency entry.
    pub fn resolve_properties(&mut self) {
        let snapshot = self.clone();
        let all = self.dependencies.iter_mut().chain(self.dependency_management.iter_mut());
        for dep in all {
            dep.group_id = snapshot.interpolate(&dep.group_id);
            dep.artifact_id = snapshot.interpolate(&dep.artifact_id);
            dep.version = dep.version.as_deref().map(|v| snapshot.interpolate(v));
            dep.scope = dep.scope.as_deref().map(|s| snapshot.interpolate(s));
        }
    }

    /// Inherit properties, coordinates, dependencies and dependency
    /// management from an (already effective) parent.
    pub fn apply_parent(&mut self, parent: &Pom) {
        for (k, v) in &parent.properties {
            self.properties.entry(k.clone()).or_insert_with(|| v.clone());
        }
        if self.group_id.is_none() {
            self.group_id = parent.effective_group_id().map(str::to_string);
        }
        if self.version.is_none() {
            self.version = parent.effective_version().map(str::to_string);
        }
        merge_missing(&mut self.dependency_management, &parent.dependency_management);
        merge_missing(&mut self.dependencies, &parent.dependencies);
    }

    /// Append managed entries of an imported BOM that are not yet managed here.
    pub fn import_bom(&mut self, bom: &Pom) {
        merge_missing(&mut self.dependency_management, &bom.dependency_management);
    }

    /// Managed version of `group:artifact`, if any.
    pub fn managed(&self, group_id: &str, artifact_id: &str) -> Option<&PomDependency> {
        self.dependency_management
            .iter()
            .filter(|d| !d.is_bom_import())
            .find(|d| d.group_id == group_id && d.artifact_id == artifact_id)
    }

    /// BOM imports declared in dependency management.
    pub fn bom_imports(&self) -> Vec<PomDependency> {
        self.dependency_management
            .iter()
            .filter(|d| d.is_bom_import())
            .cloned()
            .collect()
    }
}

fn merge_missing(target: &mut Vec<PomDependency>, source: &[PomDependency]) {
    for dep in source {
        if !target.iter().any(|d| d.same_module(dep)) {
            target.push(dep.clone());
        }
    }
}

/// A parsed XML element with its text and child elements.
#[derive(Debug, Default)]
pub(crate) struct Element {
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) children: Vec<Element>,
}

impl Element {
    pub(crate) fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub(crate) fn text_of(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.trim().to_string())
    }

    pub(crate) fn path(&self, names: &[&str]) -> Option<&Element> {
        names.iter().try_fold(self, |el, name| el.child(name))
    }
}

/// Read an XML document into its root element.
pub(crate) fn read_tree(xml: &str) -> Result<Element, JekaError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = vec![Element::default()];
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element {
                name: local_name(e.name().as_ref()),
                ..Element::default()
            }),
            Ok(Event::Empty(e)) => {
                let element = Element {
                    name: local_name(e.name().as_ref()),
                    ..Element::default()
                };
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(element);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let done = stack.pop();
                match (done, stack.last_mut()) {
                    (Some(done), Some(parent)) => parent.children.push(done),
                    _ => return Err(malformed("unbalanced end tag")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(&e.to_string())),
            _ => {}
        }
    }
    let mut document = stack.pop().ok_or_else(|| malformed("empty document"))?;
    if !stack.is_empty() {
        return Err(malformed("unclosed element"));
    }
    if document.children.is_empty() {
        return Err(malformed("no root element"));
    }
    Ok(document.children.swap_remove(0))
}

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.to_string(),
    }
}

fn malformed(reason: &str) -> JekaError {
    JekaError::Generic {
        message: format!("Failed to parse XML: {reason}"),
    }
}

/// Parse a POM XML document.
pub fn parse_pom(xml: &str) -> Result<Pom, JekaError> {
    let project = read_tree(xml)?;
    if project.name != "project" {
        return Err(malformed(&format!("expected <project>, found <{}>", project.name)));
    }

    let parent = project.child("parent").map(|p| ParentRef {
        group_id: p.text_of("groupId").unwrap_or_default(),
        artifact_id: p.text_of("artifactId").unwrap_or_default(),
        version: p.text_of("version").unwrap_or_default(),
    });
    let properties = project
        .child("properties")
        .map(|props| {
            props
                .children
                .iter()
                .map(|p| (p.name.clone(), p.text.trim().to_string()))
                .collect()
        })
        .unwrap_or_default();

    Ok(Pom {
        group_id: project.text_of("groupId"),
        artifact_id: project.text_of("artifactId"),
        version: project.text_of("version"),
        packaging: project.text_of("packaging"),
        parent,
        properties,
        dependencies: dependencies_in(project.child("dependencies")),
        dependency_management: dependencies_in(project.path(&["dependencyManagement", "dependencies"])),
    })
}

fn dependencies_in(list: Option<&Element>) -> Vec<PomDependency> {
    let Some(list) = list else {
        return Vec::new();
    };
    list.children_named("dependency")
        .map(|d| PomDependency {
            group_id: d.text_of("groupId").unwrap_or_default(),
            artifact_id: d.text_of("artifactId").unwrap_or_default(),
            version: d.text_of("version").filter(|v| !v.is_empty()),
            scope: d.text_of("scope").filter(|s| !s.is_empty()),
            optional: d.text_of("optional").as_deref() == Some("true"),
            classifier: d.text_of("classifier").filter(|c| !c.is_empty()),
            type_: d.text_of("type").filter(|t| !t.is_empty()),
            exclusions: d
                .child("exclusions")
                .map(|ex| {
                    ex.children_named("exclusion")
                        .map(|e| {
                            let artifact = e.text_of("artifactId").filter(|a| a != "*");
                            (e.text_of("groupId").unwrap_or_default(), artifact)
                        })
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}
