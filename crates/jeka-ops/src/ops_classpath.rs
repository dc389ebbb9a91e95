//! Operation: print the flattened classpath.

use std::path::PathBuf;

use crate::{project, ResolveOptions};

/// Options for `jeka classpath`.
#[derive(Debug, Clone, Default)]
pub struct ClasspathOptions {
    pub resolve: ResolveOptions,
    /// Joins the entries; the platform path separator when absent.
    pub separator: Option<String>,
}

pub fn classpath(opts: &ClasspathOptions) -> miette::Result<()> {
    let result = project::resolve(&opts.resolve)?;
    println!("{}", join(result.files(), opts.separator.as_deref()));
    Ok(())
}

pub fn join(files: &[PathBuf], separator: Option<&str>) -> String {
    let default = if cfg!(windows) { ";" } else { ":" };
    files
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(separator.unwrap_or(default))
}
