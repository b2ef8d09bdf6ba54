//! Translation of labels and textual cell values

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::PortationResult;

/// Text translation seam. Unknown texts must be returned unchanged.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

/// Returns every text as is
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Dictionary-backed translator
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.entries.insert(source.into(), target.into());
    }

    pub fn with(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(source, target);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a flat `source: target` YAML mapping
    pub fn from_file(path: &Path) -> PortationResult<Self> {
        let content = fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_yaml::from_str(&content)?;
        Ok(Self::from(entries))
    }
}

impl From<BTreeMap<String, String>> for Catalog {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl Translator for Catalog {
    fn translate(&self, text: &str) -> String {
        self.entries
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
