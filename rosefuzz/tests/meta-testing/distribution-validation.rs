//! Distribution validation properties
//!
//! Uniform samplers must not favor any value in their range, and weighted
//! choices must follow their weights.

use rosefuzz::*;
use std::collections::BTreeMap;

const SAMPLES: u32 = 1000;

fn histogram<T, U: Ord>(fuzz: &Fuzz<T, U>) -> BTreeMap<U, u32>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let mut counts = BTreeMap::new();
    for i in 0..SAMPLES {
        let value = fuzz
            .sample(Size::new(30), Seed::from_u32(i))
            .expect("sampling should not fail");
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Assert `count` lies within 20% of `expected`.
fn assert_near(label: &str, count: u32, expected: f64) {
    let (low, high) = (expected * 0.8, expected * 1.2);
    assert!(
        (low..=high).contains(&(count as f64)),
        "{label}: got {count}, expected {expected:.0} (between {low:.0} and {high:.0})"
    );
}

/// Property: a small range is covered evenly
pub fn test_integer_within_is_unbiased() {
    let counts = histogram(&fuzz::integer_within(0, 4));

    assert_eq!(counts.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    for (value, count) in &counts {
        assert_near(&format!("value {value}"), *count, SAMPLES as f64 / 5.0);
    }

    println!("✓ Unbiased range property passed (counts: {counts:?})");
}

/// Property: frequency follows its weights
pub fn test_frequency_weights() {
    let choices = vec![
        (1, fuzz::constant('a')),
        (5, fuzz::constant('b')),
        (3, fuzz::constant('c')),
    ];
    let gen = fuzz::frequency(choices).expect("weights are positive");
    let counts = histogram(&gen);

    let total: u32 = 9;
    for (choice, weight) in [('a', 1), ('b', 5), ('c', 3)] {
        let count = counts.get(&choice).copied().unwrap_or(0);
        assert_near(&format!("choice {choice}"), count, SAMPLES as f64 * weight as f64 / total as f64);
    }

    assert!(fuzz::frequency(vec![(0, fuzz::constant('a'))]).is_err());
    assert!(fuzz::one_of(Vec::<Fuzz<char>>::new()).is_err());

    println!("✓ Frequency weights property passed (counts: {counts:?})");
}
