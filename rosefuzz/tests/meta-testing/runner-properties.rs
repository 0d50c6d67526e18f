//! Runner properties
//!
//! End-to-end checks of the property runner: asynchronous predicates,
//! panics inside predicates, and replaying a run from its seed.

use crate::{arbitrary_seed, check};
use futures::executor::block_on;
use rosefuzz::*;

/// Property: async predicates shrink exactly like sync ones
pub fn test_async_predicates_are_awaited() {
    let config = Config::default().with_seed(11);

    let sync = property(fuzz::integer(), |x| x < 25)
        .run(&config)
        .expect("integers always generate");
    let future = property_async(fuzz::integer(), |x| async move {
        futures::future::ready(()).await;
        x < 25
    });
    let awaited = block_on(future.run_async(&config)).expect("integers always generate");

    assert_eq!(sync.failures, awaited.failures);
    assert_eq!(awaited.smallest_failure().map(|case| case.args), Some(25));

    println!("✓ Async predicate property passed");
}

/// Property: a panicking predicate is reported, not propagated
pub fn test_panics_become_failures() {
    let report = property(fuzz::array(fuzz::integer()), |values| {
        assert!(values.len() < 3, "too many values: {}", values.len());
    })
    .named("short_arrays")
    .run(&Config::default().with_seed(3))
    .expect("arrays always generate");

    let smallest = report.smallest_failure().expect("long arrays should be drawn");
    assert_eq!(smallest.args, vec![0, 0, 0], "{report}");
    assert!(
        matches!(&smallest.error, Failure::Panic(message) if message.contains("too many values: 3")),
        "{report}"
    );
    assert!(report.to_string().contains("✗ short_arrays failed after"));

    println!("✓ Panic property passed");
}

/// Property: any seed replays to the same report
pub fn test_seed_replays_failures() {
    check(
        "seed_replays_failures",
        property(arbitrary_seed(), |seed| {
            let config = Config::default().with_seed(seed.extract()).with_count(20);
            let prop = property(fuzz::tuple((fuzz::integer(), fuzz::boolean())), |(x, b)| {
                b || x.abs() < 15
            });

            match (prop.run(&config), prop.run(&config)) {
                (Ok(first), Ok(second)) => first == second && first.seed == seed.extract(),
                _ => false,
            }
        }),
    );
}
