//! Tool call matching
//!
//! Corresponds expected invocations to executed invocations of the same tool
//! name within one conversation. Two invocations are equal when every
//! significant argument key of the tool is present in both argument maps
//! with exactly equal values (no numeric or string coercion).
//!
//! Matching is greedy and order-preserving: expected calls are visited in
//! order and each takes the first unused executed call that satisfies the
//! predicate. There is no backtracking. Because the predicate compares
//! projections onto a fixed key set, compatible calls form disjoint complete
//! bipartite blocks and the greedy count coincides with a maximum matching,
//! but the matcher does not rely on that and makes no optimality claim.

use serde_json::{Map, Value};

use crate::schema::ToolSchemaCatalog;
use crate::types::ToolInvocation;

/// Whether two argument maps agree on every significant key
pub fn args_match(
    keys: &[String],
    expected: &Map<String, Value>,
    executed: &Map<String, Value>,
) -> bool {
    keys.iter()
        .all(|key| match (expected.get(key), executed.get(key)) {
            (Some(e), Some(x)) => e == x,
            _ => false,
        })
}

/// Matches invocations of one tool within one conversation
#[derive(Clone, Copy)]
pub struct ToolCallMatcher<'a> {
    catalog: &'a dyn ToolSchemaCatalog,
}

impl<'a> ToolCallMatcher<'a> {
    /// Create a matcher over the given schema catalog
    pub fn new(catalog: &'a dyn ToolSchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Number of expected invocations satisfied by executed invocations.
    ///
    /// Both slices are assumed to hold calls of `tool_name`. The result is
    /// bounded by `min(expected.len(), executed.len())`.
    pub fn match_count(
        &self,
        expected: &[&ToolInvocation],
        executed: &[&ToolInvocation],
        tool_name: &str,
        domain: &str,
    ) -> usize {
        if expected.is_empty() || executed.is_empty() {
            return 0;
        }
        let keys = self.catalog.tool_schema(domain, tool_name);
        let mut used = vec![false; executed.len()];
        let mut matched = 0;

        for exp in expected {
            let hit = executed.iter().enumerate().position(|(j, call)| {
                !used[j] && args_match(keys, &exp.arguments, &call.arguments)
            });

            if let Some(j) = hit {
                used[j] = true;
                matched += 1;
            }
        }

        matched
    }

    /// Whether any executed invocation satisfies `expected`
    pub fn any_match(
        &self,
        expected: &ToolInvocation,
        executed: &[&ToolInvocation],
        tool_name: &str,
        domain: &str,
    ) -> bool {
        let keys = self.catalog.tool_schema(domain, tool_name);
        executed
            .iter()
            .any(|call| args_match(keys, &expected.arguments, &call.arguments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StaticSchemaCatalog;
    use serde_json::json;

    fn call(name: &str, args: Value) -> ToolInvocation {
        let arguments = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        ToolInvocation::with_arguments(name, arguments)
    }

    fn refs(calls: &[ToolInvocation]) -> Vec<&ToolInvocation> {
        calls.iter().collect()
    }

    fn catalog() -> StaticSchemaCatalog {
        StaticSchemaCatalog::new()
            .with_tool("retail", "get_order_details", ["order_id"])
            .with_tool("retail", "exchange", ["order_id", "item_ids"])
    }

    #[test]
    fn test_args_match_requires_keys_in_both() {
        let keys = vec!["order_id".to_string()];
        let a = call("t", json!({"order_id": "#1", "extra": 1}));
        let b = call("t", json!({"order_id": "#1"}));
        let c = call("t", json!({}));
        assert!(args_match(&keys, &a.arguments, &b.arguments));
        assert!(!args_match(&keys, &a.arguments, &c.arguments));
        assert!(!args_match(&keys, &c.arguments, &c.arguments));
    }

    #[test]
    fn test_args_match_no_coercion() {
        let keys = vec!["n".to_string()];
        let a = call("t", json!({"n": 1}));
        let b = call("t", json!({"n": "1"}));
        let c = call("t", json!({"n": 1.0}));
        assert!(!args_match(&keys, &a.arguments, &b.arguments));
        assert!(!args_match(&keys, &a.arguments, &c.arguments));
    }

    #[test]
    fn test_args_match_empty_keys() {
        let a = call("t", json!({"x": 1}));
        let b = call("t", json!({"x": 2}));
        assert!(args_match(&[], &a.arguments, &b.arguments));
    }

    #[test]
    fn test_greedy_out_of_order() {
        let catalog = catalog();
        let matcher = ToolCallMatcher::new(&catalog);
        let expected = vec![
            call("get_order_details", json!({"order_id": "#1"})),
            call("get_order_details", json!({"order_id": "#2"})),
        ];
        let executed = vec![
            call("get_order_details", json!({"order_id": "#2"})),
            call("get_order_details", json!({"order_id": "#3"})),
            call("get_order_details", json!({"order_id": "#1"})),
        ];
        let n = matcher.match_count(
            &refs(&expected),
            &refs(&executed),
            "get_order_details",
            "retail",
        );
        assert_eq!(n, 2);
    }

    #[test]
    fn test_each_executed_used_once() {
        let catalog = catalog();
        let matcher = ToolCallMatcher::new(&catalog);
        let expected = vec![
            call("get_order_details", json!({"order_id": "#1"})),
            call("get_order_details", json!({"order_id": "#1"})),
        ];
        let executed = vec![call("get_order_details", json!({"order_id": "#1"}))];
        let n = matcher.match_count(
            &refs(&expected),
            &refs(&executed),
            "get_order_details",
            "retail",
        );
        assert_eq!(n, 1);
    }

    #[test]
    fn test_unknown_tool_matches_unconditionally() {
        let catalog = catalog();
        let matcher = ToolCallMatcher::new(&catalog);
        let expected = vec![call("think", json!({"thought": "a"}))];
        let executed = vec![
            call("think", json!({"thought": "b"})),
            call("think", json!({})),
        ];
        assert_eq!(
            matcher.match_count(&refs(&expected), &refs(&executed), "think", "retail"),
            1
        );
    }

    #[test]
    fn test_missing_key_never_matches() {
        let catalog = catalog();
        let matcher = ToolCallMatcher::new(&catalog);
        let expected = vec![call("get_order_details", json!({}))];
        let executed = vec![call("get_order_details", json!({}))];
        assert_eq!(
            matcher.match_count(
                &refs(&expected),
                &refs(&executed),
                "get_order_details",
                "retail"
            ),
            0
        );
    }

    #[test]
    fn test_empty_sides() {
        let catalog = catalog();
        let matcher = ToolCallMatcher::new(&catalog);
        let calls = vec![call("get_order_details", json!({"order_id": "#1"}))];
        assert_eq!(
            matcher.match_count(&[], &refs(&calls), "get_order_details", "retail"),
            0
        );
        assert_eq!(
            matcher.match_count(&refs(&calls), &[], "get_order_details", "retail"),
            0
        );
    }

    #[test]
    fn test_any_match() {
        let catalog = catalog();
        let matcher = ToolCallMatcher::new(&catalog);
        let expected = call("exchange", json!({"order_id": "#1", "item_ids": ["a", "b"]}));
        let wrong = call("exchange", json!({"order_id": "#1", "item_ids": ["b", "a"]}));
        let right = call(
            "exchange",
            json!({"order_id": "#1", "item_ids": ["a", "b"], "note": "x"}),
        );
        assert!(!matcher.any_match(&expected, &[&wrong], "exchange", "retail"));
        assert!(matcher.any_match(&expected, &[&wrong, &right], "exchange", "retail"));
        assert!(!matcher.any_match(&expected, &[], "exchange", "retail"));
    }
}
