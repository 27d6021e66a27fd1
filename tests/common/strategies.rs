use proptest::prelude::*;
use proptest::strategy::Just;
use serde_json::{json, Value};

/// Strategy for generating step descriptions
pub fn step_description_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,30}"
}

/// Strategy for generating non-empty processing plans
pub fn processing_plan_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(step_description_strategy(), 1..20)
}

/// Strategy for generating submittable text (at least one visible character)
pub fn submittable_text_strategy() -> impl Strategy<Value = String> {
    "[ \\n\\t]{0,3}[A-Za-z0-9éß!?][A-Za-z0-9éß!? \\n\\t]{0,80}"
}

/// Strategy for generating whitespace-only text
pub fn blank_text_strategy() -> impl Strategy<Value = String> {
    "[ \\n\\t\\r]{0,10}"
}

/// Strategy for generating arbitrary metadata values a store might hold
pub fn metadata_strategy() -> impl Strategy<Value = Option<Value>> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    let object = (
        prop::option::of(leaf.clone()),
        prop::option::of(leaf.clone()),
        prop::option::of(leaf.clone()),
        prop::option::of(leaf.clone()),
    )
        .prop_map(|(current, total, progress, status)| {
            let mut map = serde_json::Map::new();
            for (key, value) in [
                ("current", current),
                ("total", total),
                ("progress", progress),
                ("status", status),
            ] {
                if let Some(value) = value {
                    map.insert(key.to_string(), value);
                }
            }
            Value::Object(map)
        });

    prop::option::of(prop_oneof![
        leaf,
        object,
        Just(json!({"nested": {"data": [1, 2, 3]}})),
    ])
}

/// Strategy for generating store-native state names outside the known set
pub fn other_state_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z_]{2,12}".prop_filter("not a known state", |s| {
        !matches!(
            s.as_str(),
            "PENDING" | "PROGRESS" | "SUCCESS" | "FAILURE" | "NOT_FOUND" | "ERROR"
        )
    })
}
