//! Domain task definitions and tool schemas
//!
//! The ground-truth plan of every task and the significant argument keys of
//! every tool come from the benchmark's per-domain `tasks.json` files.

mod loader;
mod task;

pub use loader::{
    DomainSchemaCatalog, DomainTaskLoader, DomainTasks, TASKS_FILE, load_tasks_file,
    load_tasks_from_json,
};
pub use task::{ActionSpec, EvaluationCriteria, TaskDefinition, value_to_id};
