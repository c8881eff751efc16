//! Field extraction from simulation entries
//!
//! Simulation logs are loosely typed, so entries are read as JSON values and
//! each field is extracted leniently.

use planfit_core::ToolInvocation;
use serde_json::{Map, Value};

/// Domain encoded in a simulation file name (`<timestamp>_<domain>_...json`)
pub fn domain_from_filename(filename: &str) -> String {
    filename
        .split('_')
        .nth(1)
        .filter(|part| !part.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Numeric value that may be written as a number or a numeric string
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

/// Whether a simulation succeeded.
///
/// Checks `reward_info.reward`, then `termination_reason`, then a top-level
/// `reward`.
pub fn extract_success(sim: &Value) -> bool {
    if let Some(reward) = sim.get("reward_info").and_then(|info| info.get("reward")) {
        return as_number(reward).is_some_and(|r| r > 0.0);
    }

    match sim.get("termination_reason") {
        Some(Value::String(reason)) if !reason.is_empty() => {
            return reason.to_lowercase().contains("success");
        }
        Some(Value::Null) | Some(Value::String(_)) | None => {}
        Some(other) => return other.to_string().to_lowercase().contains("success"),
    }

    sim.get("reward")
        .and_then(as_number)
        .is_some_and(|r| r > 0.0)
}

/// Messages of a simulation, empty when absent
pub fn messages(sim: &Value) -> &[Value] {
    sim.get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn is_role(message: &Value, role: &str) -> bool {
    message.get("role").and_then(Value::as_str) == Some(role)
}

fn tool_calls(message: &Value) -> &[Value] {
    message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Parse one tool call entry; `None` when the entry is malformed
pub fn parse_tool_call(entry: &Value) -> Option<ToolInvocation> {
    let call = entry.as_object()?;
    let name = call
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let arguments = match call.get("arguments") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            _ => return None,
        },
        Some(_) => return None,
    };

    Some(ToolInvocation::with_arguments(name, arguments))
}

/// Tool calls issued by the agent, in order, skipping malformed entries
pub fn extract_executed_tools(messages: &[Value]) -> Vec<ToolInvocation> {
    let mut executed = Vec::new();
    for entry in messages
        .iter()
        .filter(|m| is_role(m, "assistant"))
        .flat_map(tool_calls)
    {
        match parse_tool_call(entry) {
            Some(call) => executed.push(call),
            None => tracing::warn!("Skipping malformed tool call entry: {}", entry),
        }
    }
    executed
}

/// Message counters of a simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounts {
    pub n_turns: u32,
    pub n_tool_calls: u32,
    pub n_tool_errors: u32,
}

/// Count messages, agent tool calls and failed tool results
pub fn count_messages(messages: &[Value]) -> MessageCounts {
    let n_tool_calls = messages
        .iter()
        .filter(|m| is_role(m, "assistant"))
        .map(|m| tool_calls(m).len())
        .sum::<usize>();
    let n_tool_errors = messages
        .iter()
        .filter(|m| is_role(m, "tool"))
        .filter(|m| m.get("error").and_then(Value::as_bool).unwrap_or(false))
        .count();

    MessageCounts {
        n_turns: saturate(messages.len()),
        n_tool_calls: saturate(n_tool_calls),
        n_tool_errors: saturate(n_tool_errors),
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Numeric field, defaulting to 0.0
pub fn number_field(sim: &Value, key: &str) -> f64 {
    sim.get(key).and_then(as_number).unwrap_or(0.0)
}
