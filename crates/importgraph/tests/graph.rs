//! End-to-end graph tests over real Python trees on disk.

mod common;

use std::collections::BTreeSet;

use common::{FakeResolver, FakeScanner, Workspace, fake_graph, unit_names, virtual_file};
use importgraph::{Config, FileKind, ImportGraph, Node};

fn names(units: &[&[&str]]) -> Vec<Vec<String>> {
    units
        .iter()
        .map(|unit| unit.iter().map(|s| (*s).to_string()).collect())
        .collect()
}

// === Ordering scenarios ===

#[test]
fn chain_orders_dependencies_first() {
    let ws = Workspace::with_files(&[
        ("src/a.py", "import b\n"),
        ("src/b.py", "import c\n"),
        ("src/c.py", "x = 1\n"),
    ]);
    let mut graph = ws.graph();

    let stats = graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("traversal should succeed");

    assert_eq!(stats.files_scanned, 3);
    assert_eq!(stats.edges_added, 2);
    assert_eq!(
        unit_names(&mut graph),
        names(&[&["c.py"], &["b.py"], &["a.py"]])
    );
}

#[test]
fn mutual_imports_become_one_unit() {
    let ws = Workspace::with_files(&[("src/a.py", "import b\n"), ("src/b.py", "import a\n")]);
    let mut graph = ws.graph();

    graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("traversal should succeed");

    let units = graph.build_units().expect("should sequence");
    assert_eq!(units.len(), 1);
    assert!(units[0].is_cycle());
    assert_eq!(
        units[0].files(),
        &[ws.path("src/a.py"), ws.path("src/b.py")]
    );
}

#[test]
fn unresolved_import_is_recorded_without_edge() {
    let ws = Workspace::with_files(&[("src/a.py", "import pkg.missing\n")]);
    let mut graph = ws.graph();

    let stats = graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("traversal should succeed");

    assert_eq!(stats.broken_imports, 1);
    assert_eq!(graph.graph().edge_count(), 0);

    let broken = graph.broken_dependencies();
    assert_eq!(broken.len(), 1);
    assert_eq!(
        broken.get(&ws.path("src/a.py")),
        Some(&BTreeSet::from(["pkg.missing".to_string()]))
    );
    assert_eq!(unit_names(&mut graph), names(&[&["a.py"]]));
}

#[test]
fn stub_only_target_gets_edge_but_no_unit() {
    let ws = Workspace::with_files(&[
        ("src/a.py", "import b\n"),
        ("stubs/b.pyi", "def f() -> int: ...\n"),
    ]);
    let mut graph = ws.graph();

    let stats = graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("traversal should succeed");

    let a = graph.graph().file_id(&ws.path("src/a.py")).expect("a node");
    let b = graph.graph().file_id(&ws.path("stubs/b.pyi")).expect("b node");
    assert!(graph.graph().has_edge(a, b));
    assert_eq!(stats.files_scanned, 1, "stub must not be scanned");
    assert_eq!(stats.target_only, 1);
    assert!(matches!(
        graph.graph().node(b),
        Node::File(file) if file.kind == FileKind::TargetOnly
    ));
    assert_eq!(unit_names(&mut graph), names(&[&["a.py"]]));
}

#[test]
fn nested_cycles_collapse_into_one_unit() {
    let ws = Workspace::with_files(&[
        ("src/a.py", "import b\n"),
        ("src/b.py", "import a\nimport c\n"),
        ("src/c.py", "import a\n"),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("traversal should succeed");

    assert_eq!(graph.collapse_cycles(), 2);

    let live = graph.graph().nodes();
    assert_eq!(live.len(), 1);
    assert_eq!(
        graph.graph().flatten(live[0]),
        vec![ws.path("src/a.py"), ws.path("src/b.py"), ws.path("src/c.py")]
    );
    assert_eq!(graph.formatter().format(live[0]), "[[a.py->b.py]->c.py]");
    assert_eq!(unit_names(&mut graph), names(&[&["a.py", "b.py", "c.py"]]));
}

#[test]
fn cycle_unit_sits_between_its_dependencies_and_dependents() {
    let ws = Workspace::with_files(&[
        ("src/main.py", "import a\n"),
        ("src/a.py", "import b\n"),
        ("src/b.py", "import a\nimport util\n"),
        ("src/util.py", ""),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/main.py"))
        .expect("traversal should succeed");

    assert_eq!(
        unit_names(&mut graph),
        names(&[&["util.py"], &["a.py", "b.py"], &["main.py"]])
    );
}

// === Resolution ===

#[test]
fn relative_and_package_imports_resolve() {
    let ws = Workspace::with_files(&[
        ("src/main.py", "from pkg import a\n"),
        ("src/pkg/__init__.py", ""),
        ("src/pkg/a.py", "from . import b\nfrom .sub import c\n"),
        ("src/pkg/b.py", "from .. import main\n"),
        ("src/pkg/sub/c.py", "from ..b import helper\n"),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/main.py"))
        .expect("traversal should succeed");

    let g = graph.graph();
    let id = |rel: &str| g.file_id(&ws.path(rel)).expect("node should exist");
    assert!(g.has_edge(id("src/main.py"), id("src/pkg/a.py")));
    assert!(g.has_edge(id("src/pkg/a.py"), id("src/pkg/b.py")));
    assert!(g.has_edge(id("src/pkg/a.py"), id("src/pkg/sub/c.py")));
    assert!(g.has_edge(id("src/pkg/b.py"), id("src/main.py")));
    assert!(g.has_edge(id("src/pkg/sub/c.py"), id("src/pkg/b.py")));
    assert!(
        !g.contains_file(&ws.path("src/pkg/__init__.py")),
        "submodule should win over the package"
    );
    assert!(graph.broken_dependencies().is_empty());
}

#[test]
fn from_import_of_name_falls_back_to_module() {
    let ws = Workspace::with_files(&[
        ("src/main.py", "from tools import helper\n"),
        ("src/tools/__init__.py", "def helper(): ...\n"),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/main.py"))
        .expect("traversal should succeed");

    let g = graph.graph();
    let main = g.file_id(&ws.path("src/main.py")).expect("main node");
    let init = g
        .file_id(&ws.path("src/tools/__init__.py"))
        .expect("package node");
    assert!(g.has_edge(main, init));
}

#[test]
fn compiled_module_is_target_only() {
    let ws = Workspace::with_files(&[("src/main.py", "import fast\n")]);
    ws.write("src/fast.cpython-312-x86_64-linux-gnu.so", [0x7f, b'E', b'L', b'F']);
    let mut graph = ws.graph();

    let stats = graph
        .add_file_recursive(&ws.path("src/main.py"))
        .expect("traversal should succeed");

    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.target_only, 1);
    assert!(stats.errors.is_empty());
    assert_eq!(graph.graph().edge_count(), 1);
    assert_eq!(unit_names(&mut graph), names(&[&["main.py"]]));
}

#[test]
fn future_imports_are_not_dependencies() {
    let ws = Workspace::with_files(&[(
        "src/main.py",
        "from __future__ import annotations\nimport os\n",
    )]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/main.py"))
        .expect("traversal should succeed");

    let broken = graph
        .broken_dependencies()
        .get(&ws.path("src/main.py"))
        .expect("os is not in the workspace");
    assert_eq!(broken, &BTreeSet::from(["os".to_string()]));
}

// === Traversal ===

#[test]
fn shared_dependency_is_scanned_once() {
    let ws = Workspace::with_files(&[
        ("src/main.py", "import left\nimport right\n"),
        ("src/left.py", "import shared\n"),
        ("src/right.py", "import shared\n"),
        ("src/shared.py", ""),
    ]);
    let mut graph = ws.graph();

    let stats = graph
        .add_file_recursive(&ws.path("src/main.py"))
        .expect("traversal should succeed");

    assert_eq!(stats.files_scanned, 4);
    assert_eq!(stats.edges_added, 4);
    assert_eq!(graph.graph().node_count(), 4);
}

#[test]
fn add_file_does_not_follow_imports() {
    let ws = Workspace::with_files(&[("src/a.py", "import b\n"), ("src/b.py", "import c\n")]);
    let mut graph = ws.graph();

    let stats = graph
        .add_file(&ws.path("src/a.py"))
        .expect("scan should succeed");

    assert_eq!(stats.files_scanned, 1);
    assert!(graph.graph().contains_file(&ws.path("src/b.py")));
    assert!(!graph.graph().contains_file(&ws.path("src/c.py")));
}

#[test]
fn rescanning_a_seed_is_a_no_op() {
    let ws = Workspace::with_files(&[("src/a.py", "import b\nimport nowhere\n"), ("src/b.py", "")]);
    let mut graph = ws.graph();

    graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("first traversal should succeed");
    let again = graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("second traversal should succeed");

    assert_eq!(again.files_scanned, 0);
    assert_eq!(again.broken_imports, 0);
    assert_eq!(graph.graph().edge_count(), 1);
    assert_eq!(graph.broken_dependencies().len(), 1);
}

#[test]
fn parallel_and_serial_traversals_agree() {
    let files = [
        ("src/main.py", "import a\nimport b\nimport c\nimport gone\n"),
        ("src/a.py", "import b\nimport d\n"),
        ("src/b.py", "import a\nimport e\n"),
        ("src/c.py", "import e\nimport missing.mod\n"),
        ("src/d.py", "import c\n"),
        ("src/e.py", ""),
    ];
    let ws = Workspace::with_files(&files);

    let run = |parallel: bool| {
        let config = Config {
            parallel,
            ..ws.config()
        };
        let mut graph = ImportGraph::new(config).expect("should create graph");
        graph
            .add_file_recursive(&ws.path("src/main.py"))
            .expect("traversal should succeed");
        let edges: Vec<_> = graph
            .graph()
            .edges()
            .into_iter()
            .map(|(from, to)| {
                (
                    graph.graph().key(from).to_path_buf(),
                    graph.graph().key(to).to_path_buf(),
                )
            })
            .collect();
        let broken = graph.broken_dependencies().clone();
        let units = graph.build_units().expect("should sequence");
        (edges, broken, units)
    };

    assert_eq!(run(true), run(false));
}

#[test]
fn add_file_then_recursive_expands_the_seed() {
    let scanner = FakeScanner::new().imports("a", &["b"]).imports("b", &["c"]);
    let mut graph = fake_graph(scanner, FakeResolver::new());

    graph.add_file(&virtual_file("a")).expect("scan should succeed");
    let stats = graph
        .add_file_recursive(&virtual_file("a"))
        .expect("traversal should succeed");

    assert_eq!(stats.files_scanned, 2, "b and c");
    assert!(graph.graph().contains_file(&virtual_file("c")));
    assert_eq!(unit_names(&mut graph), names(&[&["c.py"], &["b.py"], &["a.py"]]));
}

#[test]
fn shallow_file_reached_later_is_expanded() {
    let scanner = FakeScanner::new()
        .imports("main", &["a"])
        .imports("a", &["b"])
        .imports("b", &["c"]);
    let mut graph = fake_graph(scanner, FakeResolver::new());

    graph.add_file(&virtual_file("a")).expect("scan should succeed");
    let stats = graph
        .add_file_recursive(&virtual_file("main"))
        .expect("traversal should succeed");

    assert_eq!(stats.files_scanned, 3, "main, b and c");
    assert_eq!(
        unit_names(&mut graph),
        names(&[&["c.py"], &["b.py"], &["a.py"], &["main.py"]])
    );
}

#[test]
fn traversal_after_collapse_keeps_cycle_ahead_of_new_importer() {
    let scanner = FakeScanner::new()
        .imports("a", &["b"])
        .imports("b", &["a"])
        .imports("z", &["a"]);
    let mut graph = fake_graph(scanner, FakeResolver::new());
    graph
        .add_file_recursive(&virtual_file("a"))
        .expect("traversal should succeed");
    assert_eq!(unit_names(&mut graph), names(&[&["a.py", "b.py"]]));

    let stats = graph
        .add_file_recursive(&virtual_file("z"))
        .expect("traversal should succeed");

    assert_eq!(stats.edges_added, 1);
    let z = graph.graph().file_id(&virtual_file("z")).expect("z node");
    let a = graph.graph().file_id(&virtual_file("a")).expect("a node");
    assert!(graph.graph().has_edge(z, a));
    assert!(graph.graph().node(graph.graph().dependencies(z)[0]).is_cycle());
    assert_eq!(unit_names(&mut graph), names(&[&["a.py", "b.py"], &["z.py"]]));
}

#[test]
fn stub_passed_as_seed_becomes_a_source_file() {
    let ws = Workspace::with_files(&[
        ("src/a.py", "import b
"),
        ("stubs/b.pyi", "import c
"),
        ("src/c.py", ""),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/a.py"))
        .expect("traversal should succeed");
    assert_eq!(unit_names(&mut graph), names(&[&["a.py"]]));

    let stats = graph
        .add_file_recursive(&ws.path("stubs/b.pyi"))
        .expect("traversal should succeed");

    assert_eq!(stats.files_scanned, 2, "b.pyi and c.py");
    assert_eq!(
        unit_names(&mut graph),
        names(&[&["c.py"], &["b.pyi"], &["a.py"]])
    );
}

// === Root ===

#[test]
fn root_is_common_directory_of_importers() {
    let ws = Workspace::with_files(&[
        ("src/app/main.py", "import lib.util\n"),
        ("src/lib/util.py", "import app.helpers\n"),
        ("src/app/helpers.py", ""),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/app/main.py"))
        .expect("traversal should succeed");

    assert_eq!(graph.root(), ws.path("src"));
    assert_eq!(graph.formatter().format_path(&ws.path("src/lib/util.py")), "lib/util.py");
}

#[test]
fn find_root_recalculates_on_request() {
    let ws = Workspace::with_files(&[
        ("src/app/main.py", "import app.helpers\n"),
        ("src/app/helpers.py", ""),
        ("src/lib/util.py", "import app.helpers\n"),
    ]);
    let mut graph = ws.graph();
    graph
        .add_file_recursive(&ws.path("src/app/main.py"))
        .expect("traversal should succeed");
    assert_eq!(graph.root(), ws.path("src/app"));

    graph
        .add_file_recursive(&ws.path("src/lib/util.py"))
        .expect("traversal should succeed");
    assert_eq!(graph.find_root(false), ws.path("src/app"), "cached");
    assert_eq!(graph.find_root(true), ws.path("src"));
}
