//! Import resolution for Python source files.
//!
//! Maps an import specifier to the file that provides it. "Not found" is an
//! ordinary answer (`Resolution::Unresolved`); only real I/O failures come
//! back as errors.
//!
//! ## Lookup order
//!
//! 1. For `from m import x`, the submodule `m.x` is tried before `m` itself
//! 2. Relative imports are looked up next to the importing file (one dot) or
//!    in its ancestors (more dots)
//! 3. Absolute imports try each search path in order, then the stub root
//! 4. In each directory: `name.py`, `name/__init__.py`, `name.pyi`,
//!    `name/__init__.pyi`, then compiled `name.so` / `name.*.so`
//!
//! Under the stub root only stub files count.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::{Config, has_extension};
use crate::error::Result;
use crate::types::{Import, Resolution};

/// Maps import specifiers to files.
///
/// Implementations are shared across worker threads during traversal.
pub trait ImportResolver: Send + Sync {
    /// Resolve `import` as written in `importer`.
    ///
    /// # Errors
    ///
    /// Only for failures other than "not found" (for example permission
    /// errors while probing the search path). A missing module is
    /// `Ok(Resolution::Unresolved)`.
    fn resolve(&self, importer: &Path, import: &Import) -> Result<Resolution>;
}

/// Which file kinds a lookup may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Any,
    StubsOnly,
}

/// Resolves Python imports against search paths and a stub location.
#[derive(Debug, Clone)]
pub struct PythonResolver {
    search_paths: Vec<PathBuf>,
    stub_root: Option<PathBuf>,
    source_extensions: Vec<String>,
    stub_extensions: Vec<String>,
    compiled_extensions: Vec<String>,
}

impl PythonResolver {
    /// Build a resolver from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            search_paths: config.search_paths.clone(),
            stub_root: config.stub_root.clone(),
            source_extensions: config.source_extensions.clone(),
            stub_extensions: config.stub_extensions.clone(),
            compiled_extensions: config.compiled_extensions.clone(),
        }
    }

    /// Candidate module paths for an import, most specific first.
    fn candidates(import: &Import) -> Vec<Vec<String>> {
        let module: Vec<String> = import
            .module
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let mut out = Vec::with_capacity(2);
        if let Some(member) = &import.member
            && !import.is_wildcard
        {
            let mut submodule = module.clone();
            submodule.push(member.clone());
            out.push(submodule);
        }
        // a bare `from . import x` falls back to the package itself
        if !module.is_empty() || import.is_relative() {
            out.push(module);
        }
        out
    }

    /// Directory a relative import is anchored at.
    fn relative_base(importer: &Path, level: u32) -> Option<PathBuf> {
        let mut base = importer.parent()?;
        for _ in 1..level {
            base = base.parent()?;
        }
        Some(base.to_path_buf())
    }

    /// Look for a module under one root.
    fn find_module(&self, root: &Path, segments: &[String], lookup: Lookup) -> Result<Option<PathBuf>> {
        let Some((name, parents)) = segments.split_last() else {
            return self.find_package_init(root, lookup);
        };
        let mut dir = root.to_path_buf();
        dir.extend(parents);
        let package = dir.join(name);

        if lookup == Lookup::Any {
            for ext in &self.source_extensions {
                if let Some(found) = probe(&dir.join(format!("{name}.{ext}")))? {
                    return Ok(Some(found));
                }
                if let Some(found) = probe(&package.join(format!("__init__.{ext}")))? {
                    return Ok(Some(found));
                }
            }
        }

        for ext in &self.stub_extensions {
            if let Some(found) = probe(&dir.join(format!("{name}.{ext}")))? {
                return Ok(Some(found));
            }
            if let Some(found) = probe(&package.join(format!("__init__.{ext}")))? {
                return Ok(Some(found));
            }
        }

        if lookup == Lookup::Any {
            return self.find_compiled(&dir, name);
        }
        Ok(None)
    }

    /// `__init__` of the package rooted at `dir`.
    fn find_package_init(&self, dir: &Path, lookup: Lookup) -> Result<Option<PathBuf>> {
        let sources: &[String] = match lookup {
            Lookup::Any => &self.source_extensions,
            Lookup::StubsOnly => &[],
        };
        for ext in sources.iter().chain(&self.stub_extensions) {
            if let Some(found) = probe(&dir.join(format!("__init__.{ext}")))? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Compiled extension module: `name.so` or a tagged `name.cpython-312-x86_64-linux-gnu.so`.
    fn find_compiled(&self, dir: &Path, name: &str) -> Result<Option<PathBuf>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if is_missing(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{name}.");
        let mut matches = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_match = path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f.starts_with(&prefix));
            if is_match && has_extension(&path, &self.compiled_extensions) && path.is_file() {
                matches.push(path);
            }
        }
        // read_dir order is platform-defined
        matches.sort();
        let first = matches.into_iter().next().map(absolute).transpose()?;
        Ok(first)
    }
}

impl ImportResolver for PythonResolver {
    fn resolve(&self, importer: &Path, import: &Import) -> Result<Resolution> {
        let candidates = Self::candidates(import);

        if import.is_relative() {
            let Some(base) = Self::relative_base(importer, import.level) else {
                return Ok(Resolution::Unresolved);
            };
            for segments in &candidates {
                if let Some(found) = self.find_module(&base, segments, Lookup::Any)? {
                    return Ok(Resolution::Resolved(found));
                }
            }
            return Ok(Resolution::Unresolved);
        }

        for segments in &candidates {
            for root in &self.search_paths {
                if let Some(found) = self.find_module(root, segments, Lookup::Any)? {
                    return Ok(Resolution::Resolved(found));
                }
            }
            if let Some(stub_root) = &self.stub_root
                && let Some(found) = self.find_module(stub_root, segments, Lookup::StubsOnly)?
            {
                return Ok(Resolution::Resolved(found));
            }
        }

        Ok(Resolution::Unresolved)
    }
}

/// `Some(absolute path)` if `path` is an existing file.
fn probe(path: &Path) -> Result<Option<PathBuf>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(absolute(path.to_path_buf())?)),
        Ok(_) => Ok(None),
        Err(e) if is_missing(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_missing(error: &std::io::Error) -> bool {
    matches!(error.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// Absolute without resolving symlinks: linked paths stay distinct files.
fn absolute(path: PathBuf) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        std::path::absolute(path)
    }
}
