//! Domain tool schema listing

use std::path::Path;

use anyhow::Result;
use planfit_core::ToolSchemaCatalog;
use planfit_eval::{DomainTaskLoader, DomainTasks};

/// List the tools and significant argument keys of each domain
pub async fn list(tau2_path: &Path, domain: Option<&str>) -> Result<()> {
    let loader = DomainTaskLoader::new(tau2_path);
    let tasks = tokio::task::spawn_blocking(move || loader.load_all()).await?;

    print!("{}", format_schemas(&tasks, domain));
    Ok(())
}

fn format_schemas(tasks: &DomainTasks, domain: Option<&str>) -> String {
    let catalog = tasks.catalog();
    let domains: Vec<&str> = tasks
        .domains()
        .into_iter()
        .filter(|d| domain.is_none_or(|wanted| wanted == *d))
        .collect();

    if domains.is_empty() {
        return "No domains found.\n".to_string();
    }

    let mut output = String::new();
    for name in &domains {
        output.push_str(&format!(
            "\n{} ({} tasks)\n",
            name,
            tasks.task_count(name)
        ));
        output.push_str(&format!("{:-<60}\n", ""));
        for tool in catalog.domain_tools(name) {
            let keys = catalog.tool_schema(name, tool);
            let keys = if keys.is_empty() {
                "(no argument keys)".to_string()
            } else {
                keys.join(", ")
            };
            output.push_str(&format!("  {:<35} {}\n", tool, keys));
        }
    }

    let tools: usize = domains.iter().map(|d| catalog.domain_tools(d).len()).sum();
    output.push_str(&format!(
        "\nTotal: {} domains, {} tools\n",
        domains.len(),
        tools
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use planfit_eval::tasks::load_tasks_from_json;

    fn tasks() -> DomainTasks {
        let mut tasks = DomainTasks::new();
        let retail = load_tasks_from_json(
            r##"[{"id": 0, "evaluation_criteria": {"actions": [
                {"name": "get_order_details", "arguments": {"order_id": "#W1"}},
                {"name": "transfer_to_human_agents", "arguments": {}}
            ]}}]"##,
        )
        .unwrap();
        let airline = load_tasks_from_json(
            r##"[{"id": 0, "evaluation_criteria": {"actions": [
                {"name": "get_reservation_details", "arguments": {"reservation_id": "R1"}}
            ]}}]"##,
        )
        .unwrap();
        tasks.insert_domain("retail", &retail);
        tasks.insert_domain("airline", &airline);
        tasks
    }

    #[test]
    fn test_format_all_domains() {
        let output = format_schemas(&tasks(), None);
        assert!(output.contains("airline (1 tasks)"));
        assert!(output.contains("order_id"));
        assert!(output.contains("(no argument keys)"));
        assert!(output.contains("Total: 2 domains, 3 tools"));
    }

    #[test]
    fn test_format_single_domain() {
        let output = format_schemas(&tasks(), Some("airline"));
        assert!(!output.contains("retail"));
        assert!(output.contains("Total: 1 domains, 1 tools"));

        assert_eq!(format_schemas(&tasks(), Some("telecom")), "No domains found.\n");
    }
}
