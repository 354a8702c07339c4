//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use importgraph::{
    Config, Error, Import, ImportGraph, ImportResolver, ImportScanner, Resolution, ScanError,
};
use tempfile::TempDir;

/// A temporary Python project on disk.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Create a workspace with the given `(relative path, content)` files.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let workspace = Self { dir };
        for (path, content) in files {
            workspace.write(path, content);
        }
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let full_path = self.path(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("should create parent dirs");
        }
        fs::write(&full_path, content).expect("should write file");
        full_path
    }

    /// Config searching `src/` for absolute imports, with `stubs/` as the
    /// stub root.
    pub fn config(&self) -> Config {
        Config {
            search_paths: vec![self.path("src")],
            stub_root: Some(self.path("stubs")),
            ..Config::default()
        }
    }

    pub fn graph(&self) -> ImportGraph {
        ImportGraph::new(self.config()).expect("should create import graph")
    }
}

/// Path of a fake module under `/virtual`.
pub fn virtual_file(module: &str) -> PathBuf {
    PathBuf::from("/virtual").join(format!("{}.py", module.replace('.', "/")))
}

/// Scanner that answers from a table instead of reading files.
#[derive(Default)]
pub struct FakeScanner {
    imports: HashMap<PathBuf, Vec<Import>>,
    failing: HashSet<PathBuf>,
    cancel_on: Option<(PathBuf, Arc<AtomicBool>)>,
}

impl FakeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `module` imports each of `targets`.
    pub fn imports(mut self, module: &str, targets: &[&str]) -> Self {
        self.imports.insert(
            virtual_file(module),
            targets.iter().map(|t| Import::module(t)).collect(),
        );
        self
    }

    /// Scanning `module` fails with an I/O error.
    pub fn failing(mut self, module: &str) -> Self {
        self.failing.insert(virtual_file(module));
        self
    }

    /// Scanning `module` raises `flag`.
    pub fn cancelling_at(mut self, module: &str, flag: Arc<AtomicBool>) -> Self {
        self.cancel_on = Some((virtual_file(module), flag));
        self
    }
}

impl ImportScanner for FakeScanner {
    fn scan(&self, path: &Path) -> Result<Vec<Import>, ScanError> {
        if let Some((at, flag)) = &self.cancel_on
            && at == path
        {
            flag.store(true, Ordering::SeqCst);
        }
        if self.failing.contains(path) {
            let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
            return Err(ScanError::read_failed(path.to_path_buf(), &error));
        }
        Ok(self.imports.get(path).cloned().unwrap_or_default())
    }
}

/// Resolver mapping `a.b` to `/virtual/a/b.py`.
#[derive(Default)]
pub struct FakeResolver {
    missing: HashSet<String>,
    failing: HashSet<String>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `module` resolves to nothing.
    pub fn missing(mut self, module: &str) -> Self {
        self.missing.insert(module.to_string());
        self
    }

    /// Resolving `module` fails with an I/O error.
    pub fn failing(mut self, module: &str) -> Self {
        self.failing.insert(module.to_string());
        self
    }
}

impl ImportResolver for FakeResolver {
    fn resolve(&self, _importer: &Path, import: &Import) -> importgraph::Result<Resolution> {
        if self.failing.contains(&import.module) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "search path not readable",
            )));
        }
        if self.missing.contains(&import.module) {
            return Ok(Resolution::Unresolved);
        }
        Ok(Resolution::Resolved(virtual_file(&import.module)))
    }
}

/// Graph over the fake collaborators, scanning serially.
pub fn fake_graph(scanner: FakeScanner, resolver: FakeResolver) -> ImportGraph {
    let config = Config {
        parallel: false,
        ..Config::default()
    };
    ImportGraph::with_collaborators(config, scanner, resolver)
}

/// Build units as lists of file names, for compact assertions.
pub fn unit_names(graph: &mut ImportGraph) -> Vec<Vec<String>> {
    graph
        .build_units()
        .expect("collapsed graph should sequence")
        .iter()
        .map(|unit| {
            unit.files()
                .iter()
                .map(|p| {
                    p.file_name()
                        .expect("file name")
                        .to_string_lossy()
                        .into_owned()
                })
                .collect()
        })
        .collect()
}
