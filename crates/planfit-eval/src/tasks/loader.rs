//! Domain task loading
//!
//! Reads `<tau2>/data/tau2/domains/<domain>/tasks.json` for every domain and
//! indexes the expected plan of each task together with the argument schema
//! of each tool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planfit_core::{StaticSchemaCatalog, ToolInvocation, ToolSchemaCatalog};
use walkdir::WalkDir;

use super::task::TaskDefinition;

/// Name of the task definition file inside each domain directory
pub const TASKS_FILE: &str = "tasks.json";

/// Schema catalog derived from domain task definitions.
///
/// For each domain the first action that names a tool defines its key set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSchemaCatalog {
    inner: StaticSchemaCatalog,
}

impl DomainSchemaCatalog {
    /// Register the tools of a domain's tasks, keeping existing entries
    pub fn extend_from_tasks(&mut self, domain: &str, tasks: &[TaskDefinition]) {
        for action in tasks.iter().flat_map(TaskDefinition::actions) {
            if action.name.is_empty() || self.inner.has_tool(domain, &action.name) {
                continue;
            }
            if let Some(keys) = action.schema_keys() {
                self.inner.insert(domain, action.name.as_str(), keys);
            }
        }
    }

    /// Number of (domain, tool) entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ToolSchemaCatalog for DomainSchemaCatalog {
    fn tool_schema(&self, domain: &str, tool_name: &str) -> &[String] {
        self.inner.tool_schema(domain, tool_name)
    }

    fn domain_tools(&self, domain: &str) -> Vec<&str> {
        self.inner.domain_tools(domain)
    }

    fn has_tool(&self, domain: &str, tool_name: &str) -> bool {
        self.inner.has_tool(domain, tool_name)
    }

    fn domains(&self) -> Vec<&str> {
        self.inner.domains()
    }
}

/// Expected plans and tool schemas for every loaded domain
#[derive(Debug, Clone, Default)]
pub struct DomainTasks {
    plans: BTreeMap<String, BTreeMap<String, Vec<ToolInvocation>>>,
    catalog: DomainSchemaCatalog,
}

impl DomainTasks {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the tasks of one domain
    pub fn insert_domain(&mut self, domain: impl Into<String>, tasks: &[TaskDefinition]) {
        let domain = domain.into();
        self.catalog.extend_from_tasks(&domain, tasks);

        let plans = self.plans.entry(domain).or_default();
        for task in tasks {
            plans.insert(task.task_id(), task.plan());
        }
    }

    /// Expected plan of a task; empty when the task is unknown
    pub fn task_tools(&self, domain: &str, task_id: &str) -> &[ToolInvocation] {
        self.plans
            .get(domain)
            .and_then(|tasks| tasks.get(task_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a task is known
    pub fn has_task(&self, domain: &str, task_id: &str) -> bool {
        self.plans
            .get(domain)
            .is_some_and(|tasks| tasks.contains_key(task_id))
    }

    /// Number of tasks loaded for a domain
    pub fn task_count(&self, domain: &str) -> usize {
        self.plans.get(domain).map_or(0, BTreeMap::len)
    }

    /// Total number of tasks loaded
    pub fn total_tasks(&self) -> usize {
        self.plans.values().map(BTreeMap::len).sum()
    }

    /// Loaded domains, sorted
    pub fn domains(&self) -> Vec<&str> {
        self.plans.keys().map(String::as_str).collect()
    }

    /// Tool schemas derived from the loaded tasks
    pub fn catalog(&self) -> &DomainSchemaCatalog {
        &self.catalog
    }
}

/// Loader for benchmark domain tasks
pub struct DomainTaskLoader {
    /// Root of the benchmark checkout
    tau2_path: PathBuf,
}

impl DomainTaskLoader {
    /// Create a loader for the given benchmark checkout
    pub fn new(tau2_path: impl AsRef<Path>) -> Self {
        Self {
            tau2_path: tau2_path.as_ref().to_path_buf(),
        }
    }

    /// Directory holding one sub-directory per domain
    pub fn domains_dir(&self) -> PathBuf {
        self.tau2_path.join("data").join("tau2").join("domains")
    }

    /// Load every domain. Unreadable domains are skipped with a warning.
    pub fn load_all(&self) -> DomainTasks {
        let mut index = DomainTasks::new();
        let domains_dir = self.domains_dir();

        if !domains_dir.is_dir() {
            tracing::warn!("Domains directory not found: {}", domains_dir.display());
            return index;
        }

        let mut domain_dirs: Vec<PathBuf> = WalkDir::new(&domains_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        domain_dirs.sort();

        for dir in domain_dirs {
            let Some(domain) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let tasks_file = dir.join(TASKS_FILE);
            if !tasks_file.is_file() {
                tracing::warn!("No {} found for domain: {}", TASKS_FILE, domain);
                continue;
            }

            match load_tasks_file(&tasks_file) {
                Ok(tasks) => {
                    tracing::info!("Loaded {} tasks for domain: {}", tasks.len(), domain);
                    index.insert_domain(domain, &tasks);
                }
                Err(e) => {
                    tracing::warn!("Failed to load tasks for domain {}: {:#}", domain, e);
                }
            }
        }

        tracing::debug!(
            "Total tasks loaded: {} ({} tool schemas)",
            index.total_tasks(),
            index.catalog().len()
        );
        index
    }
}

/// Parse a `tasks.json` file
pub fn load_tasks_file(path: &Path) -> Result<Vec<TaskDefinition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tasks file: {:?}", path))?;
    load_tasks_from_json(&content).with_context(|| format!("Failed to parse tasks file: {:?}", path))
}

/// Parse task definitions from a JSON string
pub fn load_tasks_from_json(json: &str) -> Result<Vec<TaskDefinition>> {
    let tasks: Vec<TaskDefinition> = serde_json::from_str(json)?;
    Ok(tasks)
}
