//! Integration tests for the pipeline module.

use std::fs;
use std::path::{Path, PathBuf};

use primgen_cli::pipeline::{PipelineOptions, check, load_session, resolve, select_types, template};
use primgen_config::flatten;
use primgen_model::{LoadState, TypeRegistry};
use tempfile::TempDir;

const GRAPH: &str = r#"
[[module]]
name = "Map"
dual = true
features = ["copy"]

[[module]]
name = "List"
features = ["stream"]

[[module]]
name = "Stream"

[[requirement]]
from = "List.stream"
to = "Stream"
shape = "key"
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn resolves_decisions_from_files() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "graph.toml", GRAPH);
    let settings = write(
        dir.path(),
        "settings.json",
        r#"{
            "Map": {"Enabled": false},
            "int": {"long": {"Map": {"Enabled": true}}}
        }"#,
    );
    let options = PipelineOptions::new(&graph)
        .with_settings(&settings)
        .with_types(["int", "long"]);

    let report = resolve(&options).unwrap();

    assert_eq!(report.decisions.len(), 4);
    assert!(!report.has_conflicts());
    let int_long = report.decisions_for("int-long").unwrap();
    assert_eq!(int_long.is_enabled("Map"), Some(true));
    assert_eq!(int_long.is_enabled("Map.copy"), Some(true));
    let int_int = report.decisions_for("int-int").unwrap();
    assert_eq!(int_int.is_enabled("Map"), Some(false));
    assert_eq!(int_int.is_enabled("List.stream"), Some(true));
}

#[test]
fn check_reports_conflicts_once() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "graph.toml", GRAPH);
    let settings = write(
        dir.path(),
        "settings.toml",
        "[int.List]\nstream = true\n\n[int.Stream]\nEnabled = false\n",
    );
    let options = PipelineOptions::new(&graph)
        .with_settings(&settings)
        .with_types(["int", "long", "double"]);

    let diagnostics = check(&options).unwrap();

    insta::assert_snapshot!(diagnostics.join("\n"), @"[int-List-stream] Requires [int-Stream] but it has been specifically disabled!");
}

#[test]
fn opt_in_fallback_disables_undecided_nodes() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "graph.toml", GRAPH);
    let settings = write(dir.path(), "settings.toml", "[int.List]\nstream = true\n");
    let options = PipelineOptions::new(&graph)
        .with_settings(&settings)
        .with_types(["int"])
        .with_fallback(LoadState::Rejected);

    let report = resolve(&options).unwrap();

    let decisions = report.decisions_for("int-int").unwrap();
    assert_eq!(decisions.is_enabled("List.stream"), Some(true));
    assert_eq!(decisions.is_enabled("List"), Some(true));
    assert_eq!(decisions.is_enabled("Stream"), Some(true));
    assert_eq!(decisions.is_enabled("Map"), Some(false));
    assert_eq!(decisions.is_enabled("Map.copy"), Some(false));
}

#[test]
fn template_round_trips_through_flattening() {
    let dir = TempDir::new().unwrap();
    let graph = write(dir.path(), "graph.toml", GRAPH);
    let options = PipelineOptions::new(&graph).with_types(["int"]);

    let tree = template(&options).unwrap();
    let config = flatten(&tree).unwrap();

    insta::assert_snapshot!(serde_json::to_string_pretty(&config).unwrap(), @r#"
    {
      "int-List": "required",
      "int-List-stream": "required",
      "int-Stream": "required",
      "int-int-Map": "required",
      "int-int-Map-copy": "required"
    }
    "#);
}

#[test]
fn unknown_types_are_rejected() {
    let registry = TypeRegistry::with_primitives();
    let err = select_types(&registry, &["int".to_string(), "string".to_string()]).unwrap_err();
    assert_eq!(err.to_string(), r#"unknown type "string""#);

    let selected = select_types(&registry, &["long".to_string(), "int".to_string()]).unwrap();
    let paths: Vec<&str> = selected.iter().map(|ty| ty.path()).collect();
    assert_eq!(paths, ["int", "long"]);
}

#[test]
fn missing_graph_names_the_step() {
    let dir = TempDir::new().unwrap();
    let options = PipelineOptions::new(dir.path().join("graph.toml"));

    let err = load_session(&options).unwrap_err();
    assert!(err.to_string().starts_with("load graph descriptor"));
    assert!(format!("{err:#}").contains("graph.toml"));
}
