//! The JSON interchange document
//!
//! Written once by the fetcher and read by either emitter:
//!
//! ```json
//! {
//!   "categories": { "CR 0-2": [ ... ], ..., "CR 21-30": [ ... ] },
//!   "total_fetched": 80,
//!   "stats": { "CR 0-2": 12, ..., "CR 21-30": 9 }
//! }
//! ```
//!
//! `total_fetched` and `stats` are derived from `categories` when saving.

use crate::band::Band;
use crate::error::Result;
use crate::types::Monster;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Monsters bucketed by band
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    categories: BTreeMap<Band, Vec<Monster>>,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    categories: &'a BTreeMap<Band, Vec<Monster>>,
    total_fetched: usize,
    stats: BTreeMap<Band, usize>,
}

#[derive(Deserialize)]
struct DocumentIn {
    #[serde(default)]
    categories: BTreeMap<Band, Vec<Monster>>,
    #[serde(default)]
    total_fetched: Option<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document with all six bands present and empty
    pub fn new() -> Self {
        Self {
            categories: Band::ALL.into_iter().map(|b| (b, Vec::new())).collect(),
        }
    }

    /// Append a monster to a band
    pub fn push(&mut self, band: Band, monster: Monster) {
        self.categories.entry(band).or_default().push(monster);
    }

    /// Monsters of one band, in insertion order
    pub fn band(&self, band: Band) -> &[Monster] {
        self.categories.get(&band).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All bands in ascending order, including empty ones
    pub fn bands(&self) -> impl Iterator<Item = (Band, &[Monster])> {
        Band::ALL.into_iter().map(|b| (b, self.band(b)))
    }

    /// Total number of monsters across all bands
    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Per-band monster counts
    pub fn stats(&self) -> BTreeMap<Band, usize> {
        self.bands().map(|(b, m)| (b, m.len())).collect()
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        let out = DocumentOut {
            categories: &self.categories,
            total_fetched: self.total(),
            stats: self.stats(),
        };
        Ok(serde_json::to_string_pretty(&out)?)
    }

    /// Parse a document; bands missing from the input are treated as empty
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: DocumentIn = serde_json::from_str(raw)?;
        let mut doc = Document::new();
        for (band, monsters) in parsed.categories {
            doc.categories.insert(band, monsters);
        }

        if let Some(recorded) = parsed.total_fetched
            && recorded != doc.total()
        {
            warn!(
                recorded,
                actual = doc.total(),
                "document total_fetched disagrees with its categories"
            );
        }

        Ok(doc)
    }

    /// Load a document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let doc = Self::from_json(&raw)?;
        debug!(path = %path.display(), total = doc.total(), "loaded document");
        Ok(doc)
    }

    /// Write the document to disk, replacing any previous content
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), total = self.total(), "saved document");
        Ok(())
    }
}
