//! Generator invariant properties
//!
//! Generators must be pure functions of `(size, seed)`, must respect
//! their declared ranges, and must honor `no_empty`.

use crate::{arbitrary_seed, arbitrary_size, check};
use rosefuzz::*;

/// Property: sampling twice with the same inputs yields the same value
pub fn test_sampling_is_deterministic() {
    let inputs = fuzz::tuple((arbitrary_size(), arbitrary_seed()));

    check(
        "sampling_is_deterministic",
        property(inputs, |(size, seed)| {
            let gen = fuzz::tuple((fuzz::integer(), fuzz::string(), fuzz::array(fuzz::float())));
            gen.sample(size, seed) == gen.sample(size, seed)
        }),
    );
}

/// Property: bounded generators never sample or shrink outside their range
pub fn test_within_ranges_hold_while_sampling_and_shrinking() {
    let bounds = fuzz::tuple((fuzz::integer(), fuzz::integer(), arbitrary_seed()));

    check(
        "within_ranges_hold",
        property(bounds, |(a, b, seed)| {
            let (min, max) = (a.min(b), a.max(b));

            let integers = fuzz::integer_within(min, max)
                .generate(Size::new(50), seed)
                .map_err(|error| error.to_string())?;
            let in_range = |n: &i64| (min..=max).contains(n);
            if !in_range(integers.value()) || !integers.children().all(|c| in_range(c.value())) {
                return Err(format!("integer escaped [{min}, {max}]"));
            }

            let (fmin, fmax) = (min as f64 / 3.0, max as f64 / 3.0);
            let floats = fuzz::float_within(fmin, fmax)
                .generate(Size::new(50), seed)
                .map_err(|error| error.to_string())?;
            let in_float_range = |x: &f64| (fmin..=fmax).contains(x);
            if !in_float_range(floats.value()) || !floats.children().all(|c| in_float_range(c.value())) {
                return Err(format!("float escaped [{fmin}, {fmax}]"));
            }

            Ok(())
        }),
    );
}

/// Property: no_empty never samples or shrinks to an empty value
pub fn test_no_empty_excludes_empty_values() {
    let inputs = fuzz::tuple((arbitrary_size(), arbitrary_seed()));

    check(
        "no_empty_excludes_empty_values",
        property(inputs, |(size, seed)| {
            let strings = fuzz::string().no_empty();
            let integers = fuzz::integer().no_empty();

            let Ok(s) = strings.generate(size, seed) else {
                return false;
            };
            let Ok(n) = integers.generate(size, seed) else {
                return false;
            };

            !s.value().is_empty()
                && s.children().all(|child| !child.value().is_empty())
                && *n.value() != 0
                && n.children().all(|child| *child.value() != 0)
        }),
    );
}
