//! Domain task definitions
//!
//! Only the parts of a benchmark task that describe its ground-truth plan are
//! modelled; every other field of `tasks.json` is ignored.

use planfit_core::ToolInvocation;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One task of a domain's `tasks.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Task identifier (string or number in the source file)
    pub id: Value,

    /// Evaluation criteria; absent or null means an empty plan
    #[serde(default)]
    pub evaluation_criteria: Option<EvaluationCriteria>,
}

/// Evaluation criteria of a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriteria {
    /// Expected actions, in order
    #[serde(default)]
    pub actions: Option<Vec<ActionSpec>>,
}

/// An expected tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Tool name; missing or null reads as empty and the action names no tool
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// Usually an object; some domains list only the argument names
    #[serde(default)]
    pub arguments: Value,
}

impl ActionSpec {
    /// Significant argument keys declared by this action, if it declares any
    pub fn schema_keys(&self) -> Option<Vec<String>> {
        match &self.arguments {
            Value::Object(map) => Some(map.keys().cloned().collect()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// The action as a planned invocation
    pub fn to_invocation(&self) -> ToolInvocation {
        let arguments = match &self.arguments {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        ToolInvocation::with_arguments(self.name.clone(), arguments)
    }
}

impl TaskDefinition {
    /// Task id as a string
    pub fn task_id(&self) -> String {
        value_to_id(&self.id)
    }

    /// Expected actions, empty when the task has no criteria
    pub fn actions(&self) -> &[ActionSpec] {
        self.evaluation_criteria
            .as_ref()
            .and_then(|c| c.actions.as_deref())
            .unwrap_or(&[])
    }

    /// The ground-truth plan
    pub fn plan(&self) -> Vec<ToolInvocation> {
        self.actions().iter().map(ActionSpec::to_invocation).collect()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render an identifier value the way it is written in the source file
pub fn value_to_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_task() {
        let task: TaskDefinition = serde_json::from_value(json!({
            "id": 12,
            "description": {"purpose": "ignored"},
            "evaluation_criteria": {
                "actions": [
                    {"action_id": "12_0", "name": "get_order_details", "arguments": {"order_id": "#W1"}},
                    {"name": "transfer_to_human_agents", "arguments": ["summary"]}
                ],
                "communicate_info": []
            }
        }))
        .unwrap();

        assert_eq!(task.task_id(), "12");
        let plan = task.plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].arguments.get("order_id"), Some(&json!("#W1")));
        assert!(plan[1].arguments.is_empty());
        assert_eq!(task.actions()[1].schema_keys(), Some(vec!["summary".to_string()]));
    }

    #[test]
    fn test_missing_criteria_is_empty_plan() {
        let task: TaskDefinition = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert!(task.plan().is_empty());

        let task: TaskDefinition =
            serde_json::from_value(json!({"id": "b", "evaluation_criteria": {"actions": null}})).unwrap();
        assert!(task.plan().is_empty());
    }

    #[test]
    fn test_null_name_reads_as_unnamed() {
        let action: ActionSpec =
            serde_json::from_value(json!({"name": null, "arguments": {"x": 1}})).unwrap();
        assert!(action.name.is_empty());
        assert!(!action.to_invocation().has_name());
    }

    #[test]
    fn test_schema_keys_for_null_arguments() {
        let action: ActionSpec = serde_json::from_value(json!({"name": "think"})).unwrap();
        assert_eq!(action.schema_keys(), None);
    }
}
