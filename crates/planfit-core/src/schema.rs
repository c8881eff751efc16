//! Tool argument schemas
//!
//! A schema is the ordered set of argument keys that decide whether two
//! invocations of the same tool are equal. The catalog is built once per
//! analysis run and passed by reference to every analyzer.

use std::collections::BTreeMap;

/// Lookup of significant argument keys per (domain, tool)
pub trait ToolSchemaCatalog: Send + Sync {
    /// Significant argument keys for a tool; empty when the tool is unknown
    fn tool_schema(&self, domain: &str, tool_name: &str) -> &[String];

    /// Tools known for a domain, sorted
    fn domain_tools(&self, domain: &str) -> Vec<&str>;

    /// Whether a schema entry exists for the tool
    fn has_tool(&self, domain: &str, tool_name: &str) -> bool;

    /// Domains with at least one schema entry, sorted
    fn domains(&self) -> Vec<&str>;
}

/// In-memory schema catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSchemaCatalog {
    schemas: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl StaticSchemaCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key set for a tool, replacing any previous entry
    pub fn insert<I, S>(&mut self, domain: impl Into<String>, tool_name: impl Into<String>, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            if !ordered.contains(&key) {
                ordered.push(key);
            }
        }
        self.schemas
            .entry(domain.into())
            .or_default()
            .insert(tool_name.into(), ordered);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_tool<I, S>(
        mut self,
        domain: impl Into<String>,
        tool_name: impl Into<String>,
        keys: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(domain, tool_name, keys);
        self
    }

    /// Number of (domain, tool) entries
    pub fn len(&self) -> usize {
        self.schemas.values().map(BTreeMap::len).sum()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ToolSchemaCatalog for StaticSchemaCatalog {
    fn tool_schema(&self, domain: &str, tool_name: &str) -> &[String] {
        self.schemas
            .get(domain)
            .and_then(|tools| tools.get(tool_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn domain_tools(&self, domain: &str) -> Vec<&str> {
        self.schemas
            .get(domain)
            .map(|tools| tools.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn has_tool(&self, domain: &str, tool_name: &str) -> bool {
        self.schemas
            .get(domain)
            .is_some_and(|tools| tools.contains_key(tool_name))
    }

    fn domains(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }
}
