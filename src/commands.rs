//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::Context;
use mindmap_core::{Catalog, CatalogEntry, Diagram, DiagramOptions, RootVisual, Severity};
use mindmap_export::{export_file_name, Exporter};
use mindmap_server::{MindmapServer, ServerConfig};
use serde_json::Value;

use crate::config::AppConfig;

fn load_catalog(config: &AppConfig, required: bool) -> anyhow::Result<Catalog> {
    if !required && !config.catalog.exists() {
        tracing::warn!("Catalog {} not found; continuing without one", config.catalog.display());
        return Ok(Catalog::new(Vec::<CatalogEntry>::new()));
    }
    let catalog = Catalog::load_csv(&config.catalog)
        .with_context(|| format!("loading catalog {}", config.catalog.display()))?;
    tracing::info!("Loaded {} catalog entries from {}", catalog.len(), config.catalog.display());
    Ok(catalog)
}

fn build_diagram(config: &AppConfig, catalog: Catalog) -> Diagram {
    let visual = RootVisual::locate(&config.asset_dir);
    let options = DiagramOptions {
        root_label: config.root_label.clone(),
        seed: config.seed,
        ..Default::default()
    };
    Diagram::new(catalog, visual, options)
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub async fn serve(config: AppConfig, open: bool) -> anyhow::Result<()> {
    tracing::info!("Starting mindmap server on {}:{}", config.host, config.port);

    let diagram = build_diagram(&config, load_catalog(&config, true)?);
    let exporter = Exporter::new(config.export_options());
    let server_config = ServerConfig { host: config.host.clone(), port: config.port };
    let server = MindmapServer::new(diagram, exporter, server_config);

    if open {
        let url = format!("http://{}", server.address()?);
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser at {}: {}", url, e);
        }
    }

    server.start().await
}

/// Export a saved document to PDF without starting the server.
pub async fn export(config: AppConfig, document: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut diagram = build_diagram(&config, load_catalog(&config, false)?);
    let value = read_document(&document)?;
    let notice = diagram.load(&value, |_| true)?;
    if let Some(notice) = notice.filter(|n| n.severity != Severity::Success) {
        tracing::warn!("{}", notice.message);
    }

    let exporter = Exporter::new(config.export_options());
    let pdf = exporter.export(&mut diagram).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(export_file_name(chrono::Local::now().date_naive())));
    std::fs::write(&output, &pdf).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {} ({} bytes, {} nodes)", output.display(), pdf.len(), diagram.stats().nodes);
    Ok(())
}

/// Validate the catalog and, optionally, a saved document.
pub fn check(config: AppConfig, document: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = load_catalog(&config, true)?;
    println!("Catalog: {} entries in {} categories", catalog.len(), catalog.categories().len());
    for (category, entries) in catalog.grouped() {
        println!("  {category}: {}", entries.len());
    }

    let Some(path) = document else {
        return Ok(());
    };
    let diagram = build_diagram(&config, catalog);
    let loaded = diagram.validate(&read_document(&path)?)?;
    for warning in &loaded.warnings {
        println!("warning: {warning}");
    }
    println!(
        "Document {}: {} nodes, {} repaired",
        path.display(),
        loaded.snapshot.nodes.len(),
        loaded.warnings.len()
    );
    Ok(())
}
