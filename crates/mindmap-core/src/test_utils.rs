//! Test utilities for mindmap-core

use crate::asset::RootVisual;
use crate::catalog::{Catalog, CatalogEntry};
use crate::diagram::{Diagram, DiagramOptions};
use crate::graph::GraphStore;
use std::fs;
use tempfile::TempDir;

/// Seed used by sessions built here.
pub const TEST_SEED: u64 = 7;

/// CSV with the header spelling of a Portuguese export.
pub const SAMPLE_CSV: &str = "\
Nome do Serviço,Categoria,Descrição
EC2,Compute,Virtual servers in the cloud
Lambda,Compute,Run code without servers
S3,Storage,Object storage
EBS,Storage,Block storage volumes
DynamoDB,Database,Managed NoSQL tables
RDS,Database,
";

/// A small catalog spanning three categories.
pub fn sample_catalog() -> Catalog {
    Catalog::new([
        CatalogEntry::new("EC2", "Compute", "Virtual servers in the cloud"),
        CatalogEntry::new("Lambda", "Compute", "Run code without servers"),
        CatalogEntry::new("S3", "Storage", "Object storage"),
        CatalogEntry::new("EBS", "Storage", "Block storage volumes"),
        CatalogEntry::new("DynamoDB", "Database", "Managed NoSQL tables"),
        CatalogEntry::new("RDS", "Database", ""),
    ])
}

/// A seeded session over [`sample_catalog`].
pub fn sample_diagram() -> Diagram {
    Diagram::new(
        sample_catalog(),
        RootVisual::default(),
        DiagramOptions { seed: Some(TEST_SEED), ..Default::default() },
    )
}

/// Every non-root node points at an existing node and no node points at itself.
pub fn assert_no_dangling_parents(store: &GraphStore) {
    for node in store.all().filter(|n| !n.is_root()) {
        let parent = node
            .parent_id
            .as_deref()
            .unwrap_or_else(|| panic!("{} has no parent", node.id));
        assert_ne!(parent, node.id, "{} is its own parent", node.id);
        assert!(store.contains(parent), "{} points at missing {}", node.id, parent);
    }
}

/// Create a temporary directory with a specific file structure.
pub fn create_dir_with_files(structure: &[(&str, &[u8])]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_csv_matches_sample_catalog() {
        let dir = create_dir_with_files(&[("data/catalog.csv", SAMPLE_CSV.as_bytes())]);
        let parsed = Catalog::load_csv(&dir.path().join("data/catalog.csv")).unwrap();
        assert_eq!(parsed, sample_catalog());
    }
}
