//! Shrinking demonstration
//!
//! Runs a few failing properties and prints the reports, showing how
//! filters, records and schema-built generators shrink to small inputs.

use rosefuzz::*;
use serde_json::json;

fn main() -> Result<()> {
    println!("=== Shrinking Demonstration ===\n");

    // Example 1: a filtered generator keeps its filter while shrinking
    let evens = fuzz::integer().such_that(|x| x % 2 == 0);
    let report = property(evens, |x| x < 40)
        .named("small_evens")
        .run(&Config::default().with_seed(2))?;
    println!("{report}\n");

    // Example 2: records shrink field by field and keep their keys
    let user = fuzz::object([
        ("name", Field::generated(fuzz::string().map(|s| s.len() as i64))),
        ("age", Field::generated(fuzz::integer_within(0, 120))),
        ("version", Field::constant(1)),
    ]);
    let report = property(user, |record| record["age"] < 90 || record["name"] < 3)
        .named("records")
        .run(&Config::default().with_seed(9))?;
    println!("{report}\n");

    // Example 3: a generator rebuilt from its JSON description
    let schema = Schema::from_json(&json!({
        "type": "array",
        "elements": {"type": "integer", "min": -10, "max": 10}
    }))?;
    let report = property(schema.to_fuzz()?, |value| {
        value.as_array().map_or(0, Vec::len) < 4
    })
    .named("described_arrays")
    .run(&Config::default().with_seed(4))?;
    println!("{report}\n");

    // Example 4: the shrink tree behind a single value
    let tree = fuzz::integer().generate(Size::new(10), Seed::from_u32(3))?;
    println!("Shrink tree for {}: {}", tree.value(), tree.render_compact(3));

    Ok(())
}
