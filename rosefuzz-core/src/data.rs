//! Core data types for rosefuzz: size, seeds and run configuration.

use crate::error::{FuzzError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Size parameter for controlling test data generation.
///
/// Size bounds how large or long generated values may be. It is
/// distinct from the number of samples a property run draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Size(pub u32);

impl Size {
    pub fn new(value: u32) -> Self {
        Size(value)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// This size, capped at `max`.
    pub fn at_most(self, max: u32) -> Self {
        Size(self.0.min(max))
    }
}

impl From<u32> for Size {
    fn from(value: u32) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

const LCG_MULTIPLIER: u32 = 1_664_525;
const INITIAL_INCREMENT: u32 = 1_013_904_223;
const PERMUTE_MULTIPLIER: u32 = 277_803_737;

/// Splittable random seed for deterministic test generation.
///
/// A seed is a `(state, increment)` pair. It is never mutated: every
/// draw returns the value together with the advanced seed, so the same
/// seed always yields the same stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed {
    pub state: u32,
    pub increment: u32,
}

impl Seed {
    /// Create a seed from a raw state and increment.
    pub fn new(state: u32, increment: u32) -> Self {
        Seed { state, increment }
    }

    /// Create the initial seed for an integer.
    pub fn from_u32(value: u32) -> Self {
        Seed::new(value, INITIAL_INCREMENT).advance().advance()
    }

    /// One linear-congruential step.
    pub fn advance(self) -> Self {
        Seed {
            state: self
                .state
                .wrapping_mul(LCG_MULTIPLIER)
                .wrapping_add(self.increment),
            increment: self.increment,
        }
    }

    /// Permute the current state into an output word (RXS-M-XS).
    pub fn extract(self) -> u32 {
        let state = self.state;
        let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(PERMUTE_MULTIPLIER);
        (word >> 22) ^ word
    }

    /// Split a seed into two independent seeds.
    ///
    /// The second stream gets a freshly drawn state and an increment made
    /// of two XOR-ed draws, forced odd so the LCG keeps its full period.
    pub fn split(self) -> (Self, Self) {
        let (state, seed1) = self.next_u32();
        let (increment_a, seed2) = seed1.next_u32();
        let (increment_b, seed3) = seed2.next_u32();
        let increment = (increment_a ^ increment_b) | 1;

        (seed3, Seed::new(state, increment).advance())
    }

    /// Generate the next random word and advance the seed.
    pub fn next_u32(self) -> (u32, Self) {
        (self.extract(), self.advance())
    }

    /// Generate a 64-bit word from two consecutive draws.
    pub fn next_u64(self) -> (u64, Self) {
        let (high, seed) = self.next_u32();
        let (low, seed) = seed.next_u32();
        (((high as u64) << 32) | low as u64, seed)
    }

    /// Generate an integer uniformly in the inclusive range spanned by `a` and `b`.
    ///
    /// Power-of-two ranges mask the drawn word; any other range rejects
    /// draws below `2^32 mod range` so the final modulo carries no bias.
    pub fn next_integer(self, a: i64, b: i64) -> (i64, Self) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let span = (max as i128 - min as i128) as u128 + 1;

        let (offset, next) = if span <= 1 << 32 {
            let (offset, next) = self.bounded_u32(span as u64);
            (offset as u128, next)
        } else {
            let (offset, next) = self.bounded_u64(span);
            (offset as u128, next)
        };

        ((min as i128 + offset as i128) as i64, next)
    }

    fn bounded_u32(self, range: u64) -> (u32, Self) {
        if range & (range - 1) == 0 {
            let mask = (range - 1) as u32;
            return (self.extract() & mask, self.advance());
        }

        let range = range as u32;
        let threshold = range.wrapping_neg() % range;
        let mut seed = self;

        loop {
            let (word, next) = seed.next_u32();
            seed = next;
            if word >= threshold {
                return (word % range, seed);
            }
        }
    }

    fn bounded_u64(self, range: u128) -> (u64, Self) {
        if range == 1 << 64 {
            return self.next_u64();
        }

        let range = range as u64;
        if range & (range - 1) == 0 {
            let (word, next) = self.next_u64();
            return (word & (range - 1), next);
        }

        let threshold = range.wrapping_neg() % range;
        let mut seed = self;

        loop {
            let (word, next) = seed.next_u64();
            seed = next;
            if word >= threshold {
                return (word % range, seed);
            }
        }
    }

    /// Generate a float in `[min, max]` from a 53-bit mantissa.
    pub fn next_float(self, a: f64, b: f64) -> (f64, Self) {
        const BIT_53: f64 = 9_007_199_254_740_992.0;
        const BIT_27: f64 = 134_217_728.0;

        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let next = self.advance();
        let high = (self.extract() & 0x03ff_ffff) as f64;
        let low = (next.extract() & 0x07ff_ffff) as f64;

        let unit = (high * BIT_27 + low) / BIT_53;
        let scaled = (unit * (max - min).abs() + min).min(max);

        (scaled, next.advance())
    }

    /// Generate a random bool.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, next) = self.next_integer(0, 1);
        (value == 1, next)
    }

    /// Generate a random byte.
    pub fn next_byte(self) -> (u8, Self) {
        let (value, next) = self.next_integer(0, 255);
        (value as u8, next)
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed::from_u32(value)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.state, self.increment)
    }
}

/// Values that can be "empty": zero, false, absent or zero-length.
///
/// Used by `no_empty` on samplers, shrinkers and generators.
pub trait Emptiness {
    fn is_empty_value(&self) -> bool;
}

macro_rules! integer_emptiness {
    ($($ty:ty),*) => {
        $(
            impl Emptiness for $ty {
                fn is_empty_value(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_emptiness!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl Emptiness for f64 {
    fn is_empty_value(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Emptiness for f32 {
    fn is_empty_value(&self) -> bool {
        *self == 0.0 || self.is_nan()
    }
}

impl Emptiness for bool {
    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl Emptiness for char {
    fn is_empty_value(&self) -> bool {
        false
    }
}

impl Emptiness for () {
    fn is_empty_value(&self) -> bool {
        true
    }
}

impl Emptiness for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for &str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<K, V> Emptiness for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for serde_json::Value {
    fn is_empty_value(&self) -> bool {
        use serde_json::Value;

        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64().map_or(false, |x| x == 0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(xs) => xs.is_empty(),
            Value::Object(_) => false,
        }
    }
}

const ENV_SEED: &str = "ROSEFUZZ_SEED";
const ENV_MAX_SIZE: &str = "ROSEFUZZ_MAX_SIZE";
const ENV_COUNT: &str = "ROSEFUZZ_COUNT";

/// Configuration for property runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial seed. `None` draws a fresh random seed for every run.
    pub seed: Option<u32>,

    /// Maximum size parameter to use.
    pub max_size: u32,

    /// Number of top-level samples before declaring success.
    pub count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            seed: None,
            max_size: 100,
            count: 100,
        }
    }
}

impl Config {
    /// Pin the initial seed so a run can be reproduced.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a new config with the given size limit.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Create a new config with the given number of samples.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Default configuration overlaid with `ROSEFUZZ_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Config::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from a key lookup (environment-style keys).
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SEED) {
            self.seed = Some(parse_var(ENV_SEED, &raw)?);
        }
        if let Some(raw) = lookup(ENV_MAX_SIZE) {
            self.max_size = parse_var(ENV_MAX_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_COUNT) {
            self.count = parse_var(ENV_COUNT, &raw)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject configurations that cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(FuzzError::InvalidConfig {
                message: "count must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The seed a run starts from, drawn at random when none is pinned.
    pub fn initial_seed(&self) -> u32 {
        use rand::Rng;
        self.seed.unwrap_or_else(|| rand::thread_rng().gen())
    }

    /// Size for the sample at `index`, ramping linearly up to `max_size`.
    pub fn size_for(&self, index: usize) -> Size {
        let count = self.count.max(1) as u64;
        let step = (index as u64 + 1).min(count);
        Size::new(((self.max_size as u64 * step) / count) as u32)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| FuzzError::InvalidConfig {
        message: format!("{key} has invalid value {raw:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_at_most() {
        assert_eq!(Size::new(50).at_most(8), Size::new(8));
        assert_eq!(Size::new(3).at_most(8), Size::new(3));
        assert_eq!(Size::new(3).at_most(0).get(), 0);
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = Seed::from_u32(42);
        let b = Seed::from_u32(42);
        assert_eq!(a, b);
        assert_eq!(a.next_u32(), b.next_u32());
        assert_ne!(Seed::from_u32(1).extract(), Seed::from_u32(2).extract());
    }

    #[test]
    fn test_advance_is_lcg_step() {
        let seed = Seed::new(7, 3);
        assert_eq!(seed.advance().state, 7u32.wrapping_mul(1_664_525) + 3);
        assert_eq!(seed.advance().increment, 3);
    }

    #[test]
    fn test_split_produces_odd_increment() {
        let (left, right) = Seed::from_u32(99).split();
        assert_eq!(right.increment & 1, 1);
        assert_ne!(left, right);
    }

    #[test]
    fn test_split_streams_diverge() {
        let (mut left, mut right) = Seed::from_u32(5).split();
        let mut same = 0;
        for _ in 0..100 {
            let (a, l) = left.next_u32();
            let (b, r) = right.next_u32();
            if a == b {
                same += 1;
            }
            left = l;
            right = r;
        }
        assert!(same < 5);
    }

    #[test]
    fn test_next_integer_in_range() {
        let mut seed = Seed::from_u32(3);
        for _ in 0..1000 {
            let (value, next) = seed.next_integer(-7, 12);
            assert!((-7..=12).contains(&value));
            seed = next;
        }
    }

    #[test]
    fn test_next_integer_swaps_bounds() {
        let (value, _) = Seed::from_u32(11).next_integer(10, -10);
        assert!((-10..=10).contains(&value));
    }

    #[test]
    fn test_next_integer_single_value() {
        let (value, _) = Seed::from_u32(11).next_integer(4, 4);
        assert_eq!(value, 4);
    }

    #[test]
    fn test_next_integer_full_width() {
        let mut seed = Seed::from_u32(8);
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..200 {
            let (value, next) = seed.next_integer(i64::MIN, i64::MAX);
            saw_negative |= value < 0;
            saw_positive |= value > 0;
            seed = next;
        }
        assert!(saw_negative && saw_positive);
    }

    #[test]
    fn test_next_integer_is_unbiased() {
        let mut counts = [0usize; 5];
        let mut seed = Seed::from_u32(2024);
        for _ in 0..5000 {
            let (value, next) = seed.next_integer(0, 4);
            counts[value as usize] += 1;
            seed = next;
        }
        for count in counts {
            assert!((800..=1200).contains(&count), "counts: {counts:?}");
        }
    }

    #[test]
    fn test_next_float_in_range() {
        let mut seed = Seed::from_u32(17);
        for _ in 0..1000 {
            let (value, next) = seed.next_float(-2.5, 2.5);
            assert!((-2.5..=2.5).contains(&value));
            seed = next;
        }
    }

    #[test]
    fn test_emptiness() {
        assert!(0i64.is_empty_value());
        assert!(!3i64.is_empty_value());
        assert!(0.0f64.is_empty_value());
        assert!(f64::NAN.is_empty_value());
        assert!(false.is_empty_value());
        assert!(String::new().is_empty_value());
        assert!(Vec::<u8>::new().is_empty_value());
        assert!(None::<i64>.is_empty_value());
        assert!(!Some(0i64).is_empty_value());
        assert!(serde_json::Value::Null.is_empty_value());
        assert!(!serde_json::json!({}).is_empty_value());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.max_size, 100);
        assert_eq!(config.count, 100);
    }

    #[test]
    fn test_config_overlay() {
        let config = Config::default()
            .overlay(|key| match key {
                "ROSEFUZZ_SEED" => Some("12".to_string()),
                "ROSEFUZZ_COUNT" => Some(" 30 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.count, 30);
        assert_eq!(config.max_size, 100);
    }

    #[test]
    fn test_config_overlay_rejects_garbage() {
        let result = Config::default().overlay(|key| {
            (key == "ROSEFUZZ_MAX_SIZE").then(|| "large".to_string())
        });
        assert!(matches!(result, Err(FuzzError::InvalidConfig { .. })));
    }

    #[test]
    fn test_config_rejects_zero_count() {
        assert!(Config::default().with_count(0).validate().is_err());
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let config: Config = serde_json::from_str(r#"{ "seed": 5 }"#).unwrap();
        assert_eq!(config, Config::default().with_seed(5));
    }

    #[test]
    fn test_pinned_seed_is_reused() {
        let config = Config::default().with_seed(77);
        assert_eq!(config.initial_seed(), 77);
        assert_eq!(config.initial_seed(), 77);
    }

    #[test]
    fn test_size_ramp() {
        let config = Config::default().with_count(4).with_max_size(100);
        let sizes: Vec<u32> = (0..4).map(|i| config.size_for(i).get()).collect();
        assert_eq!(sizes, vec![25, 50, 75, 100]);
    }
}
