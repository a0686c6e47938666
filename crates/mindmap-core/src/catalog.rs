//! Catalog of selectable entries, loaded from CSV

use crate::error::{DiagramError, Result};
use crate::model::FALLBACK_CATEGORY;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A selectable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub service: String,
    pub category: String,
    pub description: String,
}

impl CatalogEntry {
    pub fn new(
        service: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        CatalogEntry {
            service: service.into(),
            category: category.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Service,
    Category,
    Description,
}

/// Map a raw CSV header to a known column, ignoring case, surrounding
/// whitespace and the accents used by Portuguese exports.
fn classify_header(header: &str) -> Option<Column> {
    let key = header.trim().to_lowercase().replace('ç', "c").replace('ã', "a");
    match key.as_str() {
        "service" | "servico" | "nome do servico" => Some(Column::Service),
        "category" | "categoria" => Some(Column::Category),
        "description" | "descricao" => Some(Column::Description),
        k if k.contains("descric") => Some(Column::Description),
        _ => None,
    }
}

/// Ordered, de-duplicated collection of catalog entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog: services are trimmed, blank services dropped,
    /// duplicate services removed (first wins), blank categories become
    /// the fallback category.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .filter_map(|mut e| {
                e.service = e.service.trim().to_string();
                if e.service.is_empty() || !seen.insert(e.service.clone()) {
                    return None;
                }
                if e.category.trim().is_empty() {
                    e.category = FALLBACK_CATEGORY.to_string();
                }
                Some(e)
            })
            .collect();
        Catalog { entries }
    }

    /// Load a catalog from a CSV file.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!("Loaded {} catalog entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse CSV with a header row.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let mut columns: [Option<usize>; 3] = [None; 3];
        for (i, header) in headers.iter().enumerate() {
            if let Some(col) = classify_header(header) {
                columns[col as usize].get_or_insert(i);
            }
        }

        let required = [("Service", Column::Service), ("Category", Column::Category), ("Description", Column::Description)];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, col)| columns[*col as usize].is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            let found: Vec<&str> = headers.iter().collect();
            return Err(DiagramError::Validation(format!(
                "catalog must contain columns {missing:?}; found {found:?}"
            )));
        }

        let field = |record: &csv::StringRecord, col: Column| -> String {
            columns[col as usize]
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            entries.push(CatalogEntry {
                service: field(&record, Column::Service),
                category: field(&record, Column::Category),
                description: field(&record, Column::Description),
            });
        }
        debug!("Parsed {} catalog rows", entries.len());
        Ok(Catalog::new(entries))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by service name.
    pub fn find(&self, service: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.service == service)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut cats: Vec<&str> = self.entries.iter().map(|e| e.category.as_str()).collect();
        cats.sort_unstable();
        cats.dedup();
        cats
    }

    /// Entries grouped by category, each group sorted by service.
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&CatalogEntry>> {
        let mut groups: BTreeMap<&str, Vec<&CatalogEntry>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(entry.category.as_str()).or_default().push(entry);
        }
        for group in groups.values_mut() {
            group.sort_by(|a, b| a.service.cmp(&b.service));
        }
        groups
    }

    /// Entries of one category, in catalog order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Resolve user input to a category: a 1-based index into
    /// [`Catalog::categories`], or else the first category containing the
    /// input case-insensitively.
    pub fn resolve_category(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let categories = self.categories();
        if let Ok(n) = input.parse::<usize>() {
            if (1..=categories.len()).contains(&n) {
                return Some(categories[n - 1]);
            }
        }
        let needle = input.to_lowercase();
        categories.into_iter().find(|c| c.to_lowercase().contains(&needle))
    }
}
