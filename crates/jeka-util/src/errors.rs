use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Jeka operations.
#[derive(Debug, Error, Diagnostic)]
pub enum JekaError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A version string could not be parsed.
    #[error("Invalid version format '{input}': {reason}")]
    #[diagnostic(help("Use an exact version (1.2.3), a dynamic one (1.2.+) or a Maven range ([1.0,2.0)"))]
    InvalidVersionFormat { input: String, reason: String },

    /// A dependency was declared with both a scope set and a scope mapping,
    /// or was accessed through the qualifier style it does not use.
    #[error("Conflicting scope declaration: {message}")]
    ConflictingScopeDeclaration { message: String },

    /// A repository could not be reached or returned unusable data.
    #[error("Repository '{repository}' unavailable: {message}")]
    RepositoryAccess { repository: String, message: String },

    /// A computed dependency ran its generator but some declared files are still missing.
    #[error("Computed dependency {dependency} did not produce {}", .missing.join(", "))]
    #[diagnostic(help("Check that the generator writes every file declared on the dependency"))]
    MissingComputedDependencyOutput {
        dependency: String,
        missing: Vec<String>,
    },

    /// Dependency resolution finished with errors and the caller asked for none.
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// Invalid or malformed configuration (jeka.toml, global config, text description).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your jeka.toml for syntax errors"))]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type JekaResult<T> = miette::Result<T>;
