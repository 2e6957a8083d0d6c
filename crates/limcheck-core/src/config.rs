//! Configuration types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{ConstantName, ConstantPair};

/// Environment variable consulted for the default compiler
pub const CC_ENV: &str = "CC";

/// Compiler used when neither `--cc` nor `$CC` is given
pub const DEFAULT_CC: &str = "cc";

/// A C compiler path plus flags, as one shell word list (e.g. `gcc -m32`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerCommand(String);

impl CompilerCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self(command.into().trim().to_string())
    }

    /// `$CC` if set and non-empty, otherwise `cc`
    pub fn from_env() -> Self {
        match std::env::var(CC_ENV) {
            Ok(cc) if !cc.trim().is_empty() => Self::new(cc),
            _ => Self::new(DEFAULT_CC),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CompilerCommand {
    fn default() -> Self {
        Self::from_env()
    }
}

impl fmt::Display for CompilerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// limcheck configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Compiler used for every extraction
    pub compiler: CompilerCommand,

    /// Kernel header that defines the reference constants
    pub kernel_header: String,

    /// C library header that mirrors them
    pub library_header: String,

    /// Constants to compare, kernel spelling first
    pub pairs: Vec<ConstantPair>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerCommand::default(),
            kernel_header: "linux/limits.h".into(),
            library_header: "bits/stdlib_lim.h".into(),
            pairs: vec![ConstantPair {
                kernel: ConstantName::trusted("PATH_MAX"),
                library: ConstantName::trusted("__PATH_MAX"),
            }],
        }
    }
}

impl CheckConfig {
    /// Replace the compiler, keeping everything else
    pub fn with_compiler(mut self, compiler: CompilerCommand) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.compiler.is_empty() {
            return Err(Error::Config("compiler command is empty".into()));
        }
        if self.kernel_header.trim().is_empty() {
            return Err(Error::Config("kernel header is empty".into()));
        }
        if self.library_header.trim().is_empty() {
            return Err(Error::Config("library header is empty".into()));
        }
        Ok(())
    }
}
