use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::errors::JekaError;

/// Builder for constructing and executing external processes.
///
/// Computed dependencies use it to run the build of another project
/// before depending on its output files.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for the child process.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Execute the command and return its output.
    pub fn exec(&self) -> Result<Output, JekaError> {
        tracing::debug!(command = %self, cwd = ?self.cwd, "running");
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        cmd.output().map_err(JekaError::from)
    }

    /// Execute the command and fail unless it exits successfully.
    pub fn exec_checked(&self) -> Result<Output, JekaError> {
        let output = self.exec()?;
        if output.status.success() {
            return Ok(output);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!(command = %self, status = %output.status, "command failed");
        Err(JekaError::Generic {
            message: format!("`{self}` exited with {}: {}", output.status, stderr.trim()),
        })
    }
}

impl fmt::Display for CommandBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
