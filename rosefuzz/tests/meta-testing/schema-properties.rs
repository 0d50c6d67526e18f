//! Schema properties
//!
//! Generator descriptions must survive a trip through JSON and rebuild
//! generators that behave like the ones they describe.

use crate::{arbitrary_seed, arbitrary_size, check};
use rosefuzz::*;
use serde_json::{json, Value};

/// Bounded integer descriptions with arbitrary bounds.
fn integer_schema() -> Fuzz<(i64, i64), Schema> {
    fuzz::tuple((fuzz::integer(), fuzz::integer())).map(|(a, b)| Schema::Integer {
        min: Some(a.min(b)),
        max: Some(a.max(b)),
    })
}

/// Property: descriptions round-trip and their generators honor bounds
pub fn test_described_generators_round_trip() {
    let inputs = fuzz::tuple((integer_schema(), arbitrary_size(), arbitrary_seed()));

    check(
        "described_generators_round_trip",
        property(inputs, |(schema, size, seed)| {
            let json = schema.to_json().map_err(|error| error.to_string())?;
            let parsed = Schema::from_json(&json).map_err(|error| error.to_string())?;
            if parsed != schema {
                return Err(format!("{json} parsed back as {parsed:?}"));
            }

            let Schema::Integer {
                min: Some(min),
                max: Some(max),
            } = parsed
            else {
                return Err(format!("unexpected schema {parsed:?}"));
            };

            let wrapped = Schema::Object {
                elements: [("n".to_string(), parsed.clone())].into_iter().collect(),
            };
            let tree = wrapped
                .to_fuzz()
                .and_then(|fuzz| fuzz.generate(size, seed))
                .map_err(|error| error.to_string())?;

            let in_range = |value: &Value| {
                value["n"].as_i64().is_some_and(|n| (min..=max).contains(&n))
            };
            if !in_range(tree.value()) || !tree.children().all(|child| in_range(child.value())) {
                return Err(format!("{} escaped [{min}, {max}]", tree.value()));
            }
            Ok(())
        }),
    );

    let nested = json!({
        "type": "spread",
        "elements": [
            {"type": "object", "elements": {"id": {"type": "uuid"}}},
            {"type": "return", "element": {"kind": "user"}},
        ]
    });
    let schema = Schema::from_json(&nested).expect("nested description parses");
    let value = schema
        .to_fuzz()
        .and_then(|fuzz| fuzz.sample(Size::new(10), Seed::from_u32(5)))
        .expect("spread of objects generates");
    assert_eq!(value["kind"], "user");
    assert_eq!(value["id"].as_str().map(str::len), Some(36));

    println!("✓ Schema round-trip property passed");
}

/// Unknown or malformed descriptions are rejected
pub fn test_unknown_tags_fail() {
    let unknown = Schema::from_json(&json!({"type": "matrix"}));
    assert!(matches!(unknown, Err(FuzzError::StructuralMismatch { .. })));

    let missing = Schema::from_json_str(r#"{"type": "array"}"#);
    assert!(matches!(missing, Err(FuzzError::StructuralMismatch { .. })));

    let spread = Schema::from_json(&json!({
        "type": "spread",
        "elements": [{"type": "integer"}]
    }))
    .expect("spread parses")
    .to_fuzz();
    assert!(matches!(spread, Err(FuzzError::StructuralMismatch { .. })));

    println!("✓ Unknown tag property passed");
}
