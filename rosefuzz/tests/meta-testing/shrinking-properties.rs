//! Shrinking properties
//!
//! Shrink candidates must be simpler than their parent, minimal values
//! must be fixed points, and structured values must keep their shape.

use crate::{arbitrary_seed, arbitrary_size, check, fast_config};
use rosefuzz::*;

/// Property: every integer candidate is strictly closer to zero
pub fn test_integer_shrinks_move_toward_zero() {
    check(
        "integer_shrinks_move_toward_zero",
        property(fuzz::integer(), |x| {
            shrink::integer()
                .values(&x)
                .iter()
                .all(|candidate| candidate.unsigned_abs() < x.unsigned_abs())
        }),
    );
}

/// Property: array candidates are never longer than their parent
pub fn test_array_shrinks_never_grow() {
    check(
        "array_shrinks_never_grow",
        property(fuzz::array(fuzz::integer()), |values| {
            let candidates = shrink::array(shrink::integer()).values(&values);
            let removals = candidates.iter().take_while(|c| c.len() < values.len()).count();

            candidates.iter().all(|c| c.len() <= values.len())
                && candidates[removals..].iter().all(|c| c.len() == values.len())
        }),
    );
}

/// Property: the pivot of a shrinker has no candidates
pub fn test_fixed_points_have_no_shrinks() {
    check(
        "pivots_are_fixed_points",
        property(fuzz::integer(), |pivot| {
            shrink::toward_integer(pivot).values(&pivot).is_empty()
                && shrink::at_least_integer(pivot).values(&pivot).is_empty()
        }),
    );

    assert!(shrink::integer().values(&0).is_empty());
    assert!(shrink::float().values(&0.0).is_empty());
    assert!(shrink::boolean().values(&false).is_empty());
    assert!(shrink::character().values(&' ').is_empty());
    assert!(shrink::string().values(&String::new()).is_empty());
    assert!(shrink::array(shrink::integer()).values(&Vec::new()).is_empty());

    println!("✓ Fixed point property passed");
}

/// Property: each tuple candidate changes exactly one field
pub fn test_tuple_shrinks_keep_arity() {
    let inputs = fuzz::tuple((arbitrary_size(), arbitrary_seed()));

    check(
        "tuple_shrinks_change_one_field",
        property(inputs, |(size, seed)| {
            let tree = fuzz::tuple((fuzz::integer(), fuzz::string()))
                .generate(size, seed)
                .map_err(|error| error.to_string())?;
            let (x, s) = tree.value().clone();

            for child in tree.children() {
                let (cx, cs) = child.value();
                let changed = usize::from(*cx != x) + usize::from(*cs != s);
                if changed != 1 {
                    return Err(format!("{:?} -> {:?} changed {changed} fields", (&x, &s), (cx, cs)));
                }
            }
            Ok(())
        }),
    );
}

/// Property: object candidates keep every key and never touch constants
pub fn test_object_shrinks_keep_keys() {
    let inputs = fuzz::tuple((arbitrary_size(), arbitrary_seed()));

    check(
        "object_shrinks_keep_keys",
        property(inputs, |(size, seed)| {
            let record = fuzz::object([
                ("count", Field::generated(fuzz::integer())),
                ("limit", Field::constant(7)),
            ]);
            let Ok(tree) = record.generate(size, seed) else {
                return false;
            };

            let keep_shape = |value: &Record<i64>| {
                value.len() == 2 && value.contains_key("count") && value.get("limit") == Some(&7)
            };
            keep_shape(tree.value()) && tree.children().all(|child| keep_shape(child.value()))
        }),
    );
}

/// Property: a failing short string descends to the empty string
pub fn test_string_length_descent_reaches_empty() {
    let person = fuzz::object([("age", Field::generated(fuzz::pos_integer()))]);
    let report = property(fuzz::tuple((fuzz::string(), person)), |(s, _)| s.len() >= 5)
        .named("long_strings")
        .run(&fast_config().with_count(50))
        .expect("inputs always generate");

    let smallest = report
        .smallest_failure()
        .expect("short strings are drawn at small sizes");
    let (s, person) = &smallest.args;
    assert_eq!(s, "", "{report}");
    assert_eq!(person.get("age"), Some(&0), "{report}");

    println!("✓ Empty string descent property passed ({} shrinks)", smallest.depth);
}

/// Property: greedy descent on a length bound stops at five spaces
pub fn test_string_length_boundary_is_five_spaces() {
    let report = property(fuzz::string(), |s| s.len() < 5)
        .named("short_strings")
        .run(&fast_config().with_count(50))
        .expect("strings always generate");

    let smallest = report
        .smallest_failure()
        .expect("some string of length five or more should be drawn");
    assert_eq!(smallest.args, "     ", "{report}");
    assert_eq!(smallest.error, Failure::Falsified);

    let lengths: Vec<usize> = report.failures.iter().map(|case| case.args.len()).collect();
    assert!(lengths.windows(2).all(|pair| pair[1] <= pair[0]), "{lengths:?}");

    println!("✓ String boundary property passed ({} shrinks)", smallest.depth);
}
