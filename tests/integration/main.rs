//! Integration tests for mindmap
//!
//! These tests verify that the crates and the CLI work together.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use mindmap_core::{
    load_document, save_document, Catalog, Diagram, DiagramOptions, RootVisual, ROOT_ID,
};
use mindmap_export::{ExportOptions, Exporter};
use tempfile::TempDir;

const CATALOG_CSV: &str = "\
Serviço,Categoria,Descrição
EC2,Compute,Virtual servers
Lambda,Compute,Functions
S3,Storage,Object storage
RDS,Database,
";

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("catalog.csv"), CATALOG_CSV).unwrap();
    dir
}

fn diagram_from(dir: &Path) -> Diagram {
    let catalog = Catalog::load_csv(&dir.join("catalog.csv")).unwrap();
    let options = DiagramOptions { seed: Some(11), ..Default::default() };
    Diagram::new(catalog, RootVisual::locate(dir), options)
}

fn mindmap() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mindmap"));
    cmd.env_remove("MINDMAP_CATALOG").env_remove("MINDMAP_SEED");
    cmd
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = mindmap().arg("--help").output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("mind-map"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("export"));
}

/// Build a map, save it, reload it into a fresh session
#[test]
fn test_save_and_reload_through_files() {
    let dir = workspace();
    let mut diagram = diagram_from(dir.path());
    assert!(diagram.add_category("comp").is_success());
    diagram.select("Lambda");
    assert!(diagram.add_custom("Cold starts", "Notes", "").is_success());

    let path = dir.path().join("map.json");
    save_document(&diagram.document(), &path).unwrap();
    let loaded = load_document(&path).unwrap();
    assert!(loaded.warnings.is_empty());
    assert_eq!(loaded.snapshot.nodes.len(), 4);

    let mut restored = diagram_from(dir.path());
    let json = std::fs::read_to_string(&path).unwrap();
    assert!(restored.load_str(&json).unwrap().is_success());
    assert_eq!(restored.document(), diagram.document());
    let note = restored.store().get("Cold starts").unwrap();
    assert_eq!(note.parent_id.as_deref(), Some("Lambda"));
    assert_eq!(restored.selection().current(), Some(ROOT_ID));
}

/// Export produces a PDF and leaves the view as it was
#[tokio::test]
async fn test_export_of_built_map() {
    let dir = workspace();
    let mut diagram = diagram_from(dir.path());
    diagram.add_category("Compute");
    diagram.add_entry("S3");
    let view = diagram.viewport().rect();

    let exporter = Exporter::new(ExportOptions { title: "Services".to_string(), settle: Duration::ZERO });
    let pdf = exporter.export(&mut diagram).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(diagram.viewport().rect(), view);
}

/// The CLI checks a catalog and a saved document
#[test]
fn test_cli_check() {
    let dir = workspace();
    let mut diagram = diagram_from(dir.path());
    diagram.add_entry("EC2");
    let doc_path = dir.path().join("map.json");
    save_document(&diagram.document(), &doc_path).unwrap();

    let output = mindmap()
        .current_dir(dir.path())
        .args(["check", "--document", "map.json"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Catalog: 4 entries in 3 categories"), "{stdout}");
    assert!(stdout.contains("2 nodes, 0 repaired"), "{stdout}");
}

/// The CLI exports a saved document headlessly
#[test]
fn test_cli_export() {
    let dir = workspace();
    let mut diagram = diagram_from(dir.path());
    diagram.add_entry("RDS");
    save_document(&diagram.document(), &dir.path().join("map.json")).unwrap();
    std::fs::write(dir.path().join("mindmap.toml"), "settle_ms = 0\ntitle = \"Data\"\n").unwrap();

    let output = mindmap()
        .current_dir(dir.path())
        .args(["export", "--document", "map.json", "--output", "map.pdf"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let pdf = std::fs::read(dir.path().join("map.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

/// A malformed document is rejected with a non-zero exit
#[test]
fn test_cli_rejects_malformed_document() {
    let dir = workspace();
    std::fs::write(dir.path().join("bad.json"), r#"{"nodes":[{"id":"a","name":"A"}]}"#).unwrap();

    let output = mindmap()
        .current_dir(dir.path())
        .args(["check", "--document", "bad.json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
