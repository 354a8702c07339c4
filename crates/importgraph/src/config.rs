//! Configuration for graph construction.
//!
//! Settings come from an optional YAML file (`importgraph.yaml` by default)
//! and can be overridden by command-line flags. Every field has a default, so
//! an empty file is a valid configuration.
//!
//! ```yaml
//! search_paths: [src, vendor]
//! stub_root: typeshed/stdlib
//! parallel: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::FileKind;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "importgraph.yaml";

/// Graph construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Roots searched, in order, for absolute imports
    pub search_paths: Vec<PathBuf>,
    /// Location of stub-only packages (searched last, `.pyi` only)
    pub stub_root: Option<PathBuf>,
    /// Extensions of files whose imports are followed
    pub source_extensions: Vec<String>,
    /// Extensions of stub files
    pub stub_extensions: Vec<String>,
    /// Extensions of compiled extension modules
    pub compiled_extensions: Vec<String>,
    /// Scan independent files on a thread pool
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            stub_root: None,
            source_extensions: vec!["py".to_string()],
            stub_extensions: vec!["pyi".to_string()],
            compiled_extensions: vec!["so".to_string(), "pyd".to_string()],
            parallel: true,
        }
    }
}

impl Config {
    /// Parse a configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed YAML or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file.
    ///
    /// Relative `search_paths` and `stub_root` are taken relative to the
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Load `importgraph.yaml` from `dir` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] when the file exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(config = %path.display(), "Loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default().relative_to(dir))
        }
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))
    }

    /// Make relative paths absolute against `base`.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        for path in &mut self.search_paths {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(stub_root) = &mut self.stub_root
            && stub_root.is_relative()
        {
            *stub_root = base.join(&*stub_root);
        }
        self
    }

    /// Whether traversal expands this file, going by its extension.
    #[must_use]
    pub fn file_kind(&self, path: &Path) -> FileKind {
        if has_extension(path, &self.source_extensions) {
            FileKind::Source
        } else {
            FileKind::TargetOnly
        }
    }
}

pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|candidate| candidate == ext))
}
