//! Samplers: pure functions from `(size, seed)` to a value and the next seed.

use crate::data::{Emptiness, Seed, Size};
use crate::error::{FuzzError, Result};
use crate::tuple::RandomTuple;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Default retry budget for filters.
pub const DEFAULT_MAX_TRIES: usize = 10_000;

type SampleFn<T> = dyn Fn(Size, Seed) -> Result<(T, Seed)>;

/// A sampler for values of type `T`.
///
/// Identical `(size, seed)` inputs always produce identical outputs.
/// Sampling only fails when a filter exhausts its retry budget.
pub struct Random<T> {
    sampler: Rc<SampleFn<T>>,
}

impl<T> Clone for Random<T> {
    fn clone(&self) -> Self {
        Random {
            sampler: Rc::clone(&self.sampler),
        }
    }
}

impl<T: 'static> Random<T> {
    /// Create a new sampler from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Size, Seed) -> Result<(T, Seed)> + 'static,
    {
        Random {
            sampler: Rc::new(f),
        }
    }

    /// Draw a value using the given size and seed.
    pub fn sample(&self, size: Size, seed: Seed) -> Result<(T, Seed)> {
        (self.sampler)(size, seed)
    }

    /// A sampler that always produces the same value and leaves the seed untouched.
    pub fn constant(value: T) -> Self
    where
        T: Clone,
    {
        Random::new(move |_size, seed| Ok((value.clone(), seed)))
    }

    /// Map a function over the sampled values.
    pub fn map<U, F>(self, f: F) -> Random<U>
    where
        F: Fn(T) -> U + 'static,
        U: 'static,
    {
        Random::new(move |size, seed| {
            let (value, seed) = self.sample(size, seed)?;
            Ok((f(value), seed))
        })
    }

    /// Map and filter in one pass. `None` asks for a redraw.
    ///
    /// Gives up after `max_tries` draws in total (`0` means the default
    /// budget) with [`FuzzError::GenerationExhausted`].
    pub fn filter_map<U, F>(self, f: F, max_tries: usize) -> Random<U>
    where
        F: Fn(T) -> Option<U> + 'static,
        U: 'static,
    {
        let max_tries = if max_tries == 0 {
            DEFAULT_MAX_TRIES
        } else {
            max_tries
        };

        Random::new(move |size, seed| {
            let mut seed = seed;

            for _ in 0..max_tries {
                let (value, next) = self.sample(size, seed)?;
                seed = next;
                if let Some(mapped) = f(value) {
                    return Ok((mapped, seed));
                }
            }

            tracing::warn!(tries = max_tries, "filter exhausted its retry budget");
            Err(FuzzError::GenerationExhausted { tries: max_tries })
        })
    }

    /// Redraw until the predicate holds, at most `max_tries` draws.
    pub fn filter<F>(self, predicate: F, max_tries: usize) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter_map(
            move |value| if predicate(&value) { Some(value) } else { None },
            max_tries,
        )
    }

    /// Sample, then delegate to the sampler chosen by the value.
    pub fn bind<U, F>(self, f: F) -> Random<U>
    where
        F: Fn(T) -> Random<U> + 'static,
        U: 'static,
    {
        Random::new(move |size, seed| {
            let (value, seed) = self.sample(size, seed)?;
            f(value).sample(size, seed)
        })
    }

    /// Pin the size parameter.
    pub fn resize(self, size: Size) -> Self {
        Random::new(move |_size, seed| self.sample(size, seed))
    }

    /// Advance the seed `count` times before sampling.
    pub fn skip(self, count: usize) -> Self {
        Random::new(move |size, seed| {
            let seed = (0..count).fold(seed, |seed, _| seed.advance());
            self.sample(size, seed)
        })
    }

    /// Cache results by `(size, seed)`.
    ///
    /// The cache belongs to the returned sampler and its clones only.
    pub fn memoize(self) -> Self
    where
        T: Clone,
    {
        let cache: Rc<RefCell<HashMap<(u32, u32, u32), (T, Seed)>>> = Rc::default();

        Random::new(move |size, seed| {
            let key = (seed.increment, seed.state, size.get());
            if let Some(hit) = cache.borrow().get(&key) {
                return Ok(hit.clone());
            }

            let result = self.sample(size, seed)?;
            cache.borrow_mut().insert(key, result.clone());
            Ok(result)
        })
    }

    /// Redraw empty values. A zero size is bumped to one.
    pub fn no_empty(self) -> Self
    where
        T: Emptiness,
    {
        let inner = self.filter(|value| !value.is_empty_value(), DEFAULT_MAX_TRIES);
        Random::new(move |size, seed| inner.sample(Size::new(size.get().max(1)), seed))
    }

    /// One in `n` draws is `None`.
    pub fn maybe(self, n: u32) -> Random<Option<T>> {
        let n = n.max(1);
        let absent = Random::new(|_size, seed| Ok((None, seed)));
        weighted(vec![(n - 1, self.map(Some)), (1, absent)])
    }

    /// Same as [`Random::maybe`]; Rust has a single absence sentinel.
    pub fn nullable(self, n: u32) -> Random<Option<T>> {
        self.maybe(n)
    }
}

/// A sampler that always produces the same value.
pub fn constant<T: Clone + 'static>(value: T) -> Random<T> {
    Random::constant(value)
}

/// Integers in `[-size, size]`.
pub fn integer() -> Random<i64> {
    Random::new(|size, seed| {
        let bound = size.get() as i64;
        Ok(seed.next_integer(-bound, bound))
    })
}

/// Integers in `[min, max]`, ignoring size.
pub fn integer_within(min: i64, max: i64) -> Random<i64> {
    Random::new(move |_size, seed| Ok(seed.next_integer(min, max)))
}

/// Integers in `[0, size]`.
pub fn pos_integer() -> Random<i64> {
    Random::new(|size, seed| Ok(seed.next_integer(0, size.get() as i64)))
}

/// Integers in `[-size, 0]`.
pub fn neg_integer() -> Random<i64> {
    Random::new(|size, seed| Ok(seed.next_integer(-(size.get() as i64), 0)))
}

/// Floats in `[-size, size]`.
pub fn float() -> Random<f64> {
    Random::new(|size, seed| {
        let bound = size.get() as f64;
        Ok(seed.next_float(-bound, bound))
    })
}

/// Floats in `[min, max]`, ignoring size.
pub fn float_within(min: f64, max: f64) -> Random<f64> {
    Random::new(move |_size, seed| Ok(seed.next_float(min, max)))
}

/// Floats in `[0, size]`.
pub fn pos_float() -> Random<f64> {
    Random::new(|size, seed| Ok(seed.next_float(0.0, size.get() as f64)))
}

/// Floats in `[-size, 0]`.
pub fn neg_float() -> Random<f64> {
    Random::new(|size, seed| Ok(seed.next_float(-(size.get() as f64), 0.0)))
}

/// A fair coin. Size zero always yields `false`.
pub fn boolean() -> Random<bool> {
    Random::new(|size, seed| {
        if size.get() == 0 {
            return Ok((false, seed));
        }
        Ok(seed.next_bool())
    })
}

pub fn byte() -> Random<u8> {
    Random::new(|_size, seed| Ok(seed.next_byte()))
}

/// One printable ASCII character, `' '` through `'~'`.
pub fn character() -> Random<char> {
    Random::new(|_size, seed| {
        let (code, seed) = seed.next_integer(32, 126);
        Ok((char::from(code as u8), seed))
    })
}

/// A space, tab or newline.
pub fn whitespace() -> Random<char> {
    Random::new(|_size, seed| {
        let (index, seed) = seed.next_integer(0, 2);
        let c = match index {
            0 => ' ',
            1 => '\t',
            _ => '\n',
        };
        Ok((c, seed))
    })
}

/// Printable ASCII strings of length `[0, size]`.
pub fn string() -> Random<String> {
    array(0, character()).map(|chars| chars.into_iter().collect())
}

/// A version-4 style UUID string built from 16 random bytes.
pub fn uuid() -> Random<String> {
    let bytes = array(16, byte()).resize(Size::new(16));

    bytes.map(|bytes| {
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let version = hex[6..8].concat();

        format!(
            "{}-{}-4{}-{}-{}",
            hex[0..4].concat(),
            hex[4..6].concat(),
            &version[1..],
            hex[8..10].concat(),
            hex[10..16].concat(),
        )
    })
}

/// A freshly split-off seed.
pub fn seed() -> Random<Seed> {
    Random::new(|_size, seed| {
        let (next, child) = seed.split();
        Ok((child, next))
    })
}

/// Arrays of length `[min_len, size]`, elements drawn with the same size.
pub fn array<T: 'static>(min_len: usize, inner: Random<T>) -> Random<Vec<T>> {
    Random::new(move |size, seed| {
        let (len, mut seed) = seed.next_integer(min_len as i64, size.get() as i64);
        let mut values = Vec::with_capacity(len as usize);

        for _ in 0..len {
            let (value, next) = inner.sample(size, seed)?;
            values.push(value);
            seed = next;
        }

        Ok((values, seed))
    })
}

/// A fixed list of samplers, seed threaded left to right.
pub fn sequence<T: 'static>(samplers: Vec<Random<T>>) -> Random<Vec<T>> {
    Random::new(move |size, seed| {
        let mut seed = seed;
        let mut values = Vec::with_capacity(samplers.len());

        for sampler in &samplers {
            let (value, next) = sampler.sample(size, seed)?;
            values.push(value);
            seed = next;
        }

        Ok((values, seed))
    })
}

/// A fixed tuple of samplers, seed threaded left to right.
pub fn tuple<R: RandomTuple>(samplers: R) -> Random<R::Value> {
    Random::new(move |size, seed| samplers.sample_fields(size, seed))
}

/// Choose a sampler with probability proportional to its weight.
pub fn frequency<T: 'static>(choices: Vec<(u32, Random<T>)>) -> Result<Random<T>> {
    let total: u64 = choices.iter().map(|(weight, _)| *weight as u64).sum();
    if total == 0 {
        return Err(FuzzError::InvalidGenerator {
            message: "frequency needs at least one positive weight".to_string(),
        });
    }
    Ok(weighted(choices))
}

/// Choose uniformly between samplers.
pub fn one_of<T: 'static>(choices: Vec<Random<T>>) -> Result<Random<T>> {
    frequency(choices.into_iter().map(|choice| (1, choice)).collect())
}

/// Weighted choice without the up-front validation of [`frequency`].
///
/// Drawing index `i` in `[0, total)` and walking the cumulative weights
/// selects the same alternative as a flat list with each sampler repeated
/// `weight` times.
pub(crate) fn weighted<T: 'static>(choices: Vec<(u32, Random<T>)>) -> Random<T> {
    let total: u64 = choices.iter().map(|(weight, _)| *weight as u64).sum();

    Random::new(move |size, seed| {
        if total == 0 {
            return Err(FuzzError::InvalidGenerator {
                message: "frequency needs at least one positive weight".to_string(),
            });
        }

        let (index, seed) = seed.next_integer(0, total as i64 - 1);
        let mut remaining = index as u64;

        for (weight, choice) in &choices {
            let weight = *weight as u64;
            if remaining < weight {
                return choice.sample(size, seed);
            }
            remaining -= weight;
        }

        Err(FuzzError::InvalidGenerator {
            message: "frequency index out of range".to_string(),
        })
    })
}
