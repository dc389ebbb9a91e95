//! Plain text dependency descriptions.
//!
//! ```text
//! - COMPILE+RUNTIME
//! org.springframework.boot:spring-boot-starter-web:1.5.3.RELEASE
//! - TEST
//! junit:junit:4.12   # unit tests
//! ```
//!
//! A `- ` line switches the scopes applied to the coordinates that follow.
//! Lines before any header, and lines under an unknown header, are
//! `compile` + `runtime`.

use std::path::Path;

use jeka_util::errors::JekaError;

use crate::dependency_set::DependencySet;
use crate::scope::Scope;

const KNOWN_SCOPES: [&str; 4] = ["compile", "runtime", "provided", "test"];

/// Parse a text description into a dependency set.
pub fn parse(description: &str) -> Result<DependencySet, JekaError> {
    let mut set = DependencySet::of();
    let mut scopes = compile_and_runtime();
    for (number, raw) in description.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('-') {
            scopes = header_scopes(header);
            continue;
        }
        set = set.and_module(line, &scopes).map_err(|e| JekaError::Config {
            message: format!("line {}: {e}", number + 1),
        })?;
    }
    Ok(set)
}

/// Read and parse a text description file.
pub fn parse_file(path: &Path) -> Result<DependencySet, JekaError> {
    let content = std::fs::read_to_string(path)?;
    parse(&content).map_err(|e| JekaError::Config {
        message: format!("{}: {e}", path.display()),
    })
}

fn header_scopes(header: &str) -> Vec<Scope> {
    let names: Vec<String> = header
        .split('+')
        .map(|s| s.trim().to_lowercase())
        .collect();
    if names.iter().all(|n| KNOWN_SCOPES.contains(&n.as_str())) {
        names.iter().map(|n| Scope::by_name(n)).collect()
    } else {
        tracing::debug!(header = header.trim(), "unknown scope header, using compile+runtime");
        compile_and_runtime()
    }
}

fn compile_and_runtime() -> Vec<Scope> {
    vec![Scope::compile(), Scope::runtime()]
}
