//! Generators that fuse a sampler, a shrinker and a filter map.
//!
//! A [`Fuzz<T, U>`] samples raw values of type `T`, shrinks them as `T`,
//! and exposes them to properties as logical values of type `U`. `map`
//! and `such_that` only touch the filter map, so the raw sampler and
//! shrinker keep working on the untransformed values.

use crate::data::{Emptiness, Seed, Size};
use crate::error::{FuzzError, Result};
use crate::filter_map::{self, FilterMap};
use crate::random::{self, Random, DEFAULT_MAX_TRIES};
use crate::shrink::{self, Shrink};
use crate::tree::Tree;
use crate::tuple::FuzzTuple;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A record of named logical values.
pub type Record<U> = BTreeMap<String, U>;

/// The parts a fuzzer is built from for one `(size, seed)`.
pub struct Components<T, U = T> {
    pub random: Random<T>,
    pub shrink: Shrink<T>,
    /// The seed left over after building; sampling starts from it.
    pub seed: Seed,
    pub filter_map: FilterMap<T, U>,
}

type Builder<T, U> = dyn Fn(Size, Seed) -> Result<Components<T, U>>;

/// A composable generator of raw `T` values exposed as `U`.
pub struct Fuzz<T, U = T> {
    builder: Rc<Builder<T, U>>,
}

impl<T, U> Clone for Fuzz<T, U> {
    fn clone(&self) -> Self {
        Fuzz {
            builder: Rc::clone(&self.builder),
        }
    }
}

/// A raw value whose concrete type has been hidden.
///
/// Lets fuzzers with different raw types share one list. Produced by
/// [`Fuzz::erase`], which also knows how to shrink and map it back.
#[derive(Clone)]
pub struct Erased(Rc<dyn Any>);

impl Erased {
    pub fn new<T: 'static>(value: T) -> Self {
        Erased(Rc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for Erased {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Erased(..)")
    }
}

/// One entry of an [`object`]: either a fixed value or a generator.
pub enum Field<U> {
    Constant(U),
    Generated(Fuzz<Erased, U>),
}

impl<U: Clone + 'static> Field<U> {
    pub fn constant(value: U) -> Self {
        Field::Constant(value)
    }

    pub fn generated<T: Clone + 'static>(fuzz: Fuzz<T, U>) -> Self {
        Field::Generated(fuzz.erase())
    }

    fn into_fuzz(self) -> Fuzz<Erased, U> {
        match self {
            Field::Constant(value) => constant(value).erase(),
            Field::Generated(fuzz) => fuzz,
        }
    }
}

impl<U> From<Fuzz<Erased, U>> for Field<U> {
    fn from(fuzz: Fuzz<Erased, U>) -> Self {
        Field::Generated(fuzz)
    }
}

impl<T: Clone + 'static> Fuzz<T> {
    /// Pair a sampler with a shrinker. Every raw value is accepted as is.
    pub fn from_parts(random: Random<T>, shrink: Shrink<T>) -> Self {
        Fuzz::new(move |_size, seed| {
            Ok(Components {
                random: random.clone(),
                shrink: shrink.clone(),
                seed,
                filter_map: FilterMap::identity(),
            })
        })
    }
}

impl<T: Clone + 'static, U: Clone + 'static> Fuzz<T, U> {
    pub fn new<F>(builder: F) -> Self
    where
        F: Fn(Size, Seed) -> Result<Components<T, U>> + 'static,
    {
        Fuzz {
            builder: Rc::new(builder),
        }
    }

    /// Build the sampler, shrinker and filter map for `(size, seed)`.
    pub fn components(&self, size: Size, seed: Seed) -> Result<Components<T, U>> {
        (self.builder)(size, seed)
    }

    fn rebuild<V, F>(self, f: F) -> Fuzz<T, V>
    where
        V: Clone + 'static,
        F: Fn(Size, Components<T, U>) -> Components<T, V> + 'static,
    {
        Fuzz::new(move |size, seed| Ok(f(size, self.components(size, seed)?)))
    }

    pub fn map<V, F>(self, f: F) -> Fuzz<T, V>
    where
        V: Clone + 'static,
        F: Fn(U) -> V + 'static,
    {
        let f = Rc::new(f);
        self.rebuild(move |_size, parts| {
            let f = Rc::clone(&f);
            Components {
                random: parts.random,
                shrink: parts.shrink,
                seed: parts.seed,
                filter_map: parts.filter_map.map(move |value| f(value)),
            }
        })
    }

    /// Reject logical values the predicate does not hold for, both when
    /// sampling and when shrinking.
    pub fn such_that<F>(self, predicate: F) -> Self
    where
        F: Fn(&U) -> bool + 'static,
    {
        let predicate = Rc::new(predicate);
        self.rebuild(move |_size, parts| {
            let predicate = Rc::clone(&predicate);
            Components {
                filter_map: parts.filter_map.filter(move |value| predicate(value)),
                ..parts
            }
        })
    }

    /// Alias of [`Fuzz::such_that`].
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&U) -> bool + 'static,
    {
        self.such_that(predicate)
    }

    /// Map and reject in one step. `None` rejects.
    pub fn filter_map<V, F>(self, f: F) -> Fuzz<T, V>
    where
        V: Clone + 'static,
        F: Fn(U) -> Option<V> + 'static,
    {
        let f = Rc::new(f);
        self.rebuild(move |_size, parts| {
            let f = Rc::clone(&f);
            Components {
                random: parts.random,
                shrink: parts.shrink,
                seed: parts.seed,
                filter_map: parts.filter_map.and_then(move |value| f(value)),
            }
        })
    }

    /// Sample both fuzzers independently and combine their values.
    ///
    /// Shrinks the pair field by field. If either side rejects, the
    /// merged value is rejected.
    pub fn merge<V, W, X, F>(self, other: Fuzz<V, W>, f: F) -> Fuzz<(T, V), X>
    where
        V: Clone + 'static,
        W: Clone + 'static,
        X: Clone + 'static,
        F: Fn(U, W) -> X + 'static,
    {
        let f = Rc::new(f);
        Fuzz::new(move |size, seed| {
            let left = self.components(size, seed)?;
            let right = other.components(size, left.seed)?;
            let (left_map, right_map) = (left.filter_map, right.filter_map);
            let f = Rc::clone(&f);

            Ok(Components {
                random: random::tuple((left.random, right.random)),
                shrink: shrink::tuple((left.shrink, right.shrink)),
                seed: right.seed,
                filter_map: FilterMap::new(move |(t, v): &(T, V)| {
                    Some(f(left_map.apply(t)?, right_map.apply(v)?))
                }),
            })
        })
    }

    /// Sample a value eagerly and delegate to the fuzzer it selects.
    ///
    /// Shrinking explores only the selected fuzzer; the upstream value is
    /// fixed once chosen.
    pub fn bind<V, W, F>(self, f: F) -> Fuzz<V, W>
    where
        V: Clone + 'static,
        W: Clone + 'static,
        F: Fn(U) -> Fuzz<V, W> + 'static,
    {
        Fuzz::new(move |size, seed| {
            let parts = self.components(size, seed)?;
            let filter_map = parts.filter_map;
            let accepted = parts
                .random
                .filter_map(move |raw| filter_map.apply(&raw), DEFAULT_MAX_TRIES);
            let (value, seed) = accepted.sample(size, parts.seed)?;

            f(value).components(size, seed)
        })
    }

    pub fn no_shrink(self) -> Self {
        self.rebuild(|_size, parts| Components {
            shrink: parts.shrink.no_shrink(),
            ..parts
        })
    }

    /// Never sample or shrink to an empty raw value.
    pub fn no_empty(self) -> Self
    where
        T: Emptiness,
    {
        self.rebuild(|_size, parts| Components {
            random: parts.random.no_empty(),
            shrink: parts.shrink.no_empty(),
            ..parts
        })
    }

    /// One in `n` samples is `None`. `None` never shrinks.
    pub fn maybe(self, n: u32) -> Fuzz<Option<T>, Option<U>> {
        Fuzz::new(move |size, seed| {
            let parts = self.components(size, seed)?;
            Ok(Components {
                random: parts.random.maybe(n),
                shrink: parts.shrink.maybe(),
                seed: parts.seed,
                filter_map: parts.filter_map.maybe(),
            })
        })
    }

    /// Same as [`Fuzz::maybe`].
    pub fn nullable(self, n: u32) -> Fuzz<Option<T>, Option<U>> {
        self.maybe(n)
    }

    /// Pin the size the sampler sees.
    pub fn resize(self, size: Size) -> Self {
        self.rebuild(move |_size, parts| Components {
            random: parts.random.resize(size),
            ..parts
        })
    }

    /// Transform the size the sampler sees.
    pub fn scale<F>(self, f: F) -> Self
    where
        F: Fn(Size) -> Size + 'static,
    {
        self.rebuild(move |size, parts| Components {
            random: parts.random.resize(f(size)),
            ..parts
        })
    }

    /// Hide the raw type so fuzzers with different raw types can be mixed.
    pub fn erase(self) -> Fuzz<Erased, U> {
        Fuzz::new(move |size, seed| {
            let parts = self.components(size, seed)?;
            let (inner_shrink, inner_map) = (parts.shrink, parts.filter_map);

            Ok(Components {
                random: parts.random.map(Erased::new),
                shrink: Shrink::new(move |raw: &Erased| match raw.downcast_ref::<T>() {
                    Some(raw) => Box::new(inner_shrink.candidates(raw).map(Erased::new)),
                    None => Box::new(std::iter::empty()),
                }),
                seed: parts.seed,
                filter_map: FilterMap::new(move |raw: &Erased| {
                    raw.downcast_ref::<T>().and_then(|raw| inner_map.apply(raw))
                }),
            })
        })
    }

    /// A sampler of shrink trees.
    ///
    /// Raw values are redrawn until the filter map accepts one; the tree
    /// is rooted at that value.
    pub fn to_random_rose_tree(&self) -> Random<Tree<T, U>> {
        let fuzz = self.clone();

        Random::new(move |size, seed| {
            let parts = fuzz.components(size, seed)?;
            let filter_map = parts.filter_map.clone();
            let accepted = parts.random.filter_map(
                move |raw| {
                    let value = filter_map.apply(&raw)?;
                    Some((raw, value))
                },
                DEFAULT_MAX_TRIES,
            );

            let ((raw, value), seed) = accepted.sample(size, parts.seed)?;
            Ok((Tree::new(raw, value, parts.shrink, parts.filter_map), seed))
        })
    }

    /// Generate a shrink tree for `(size, seed)`.
    pub fn generate(&self, size: Size, seed: Seed) -> Result<Tree<T, U>> {
        Ok(self.to_random_rose_tree().sample(size, seed)?.0)
    }

    /// Generate a single logical value.
    pub fn sample(&self, size: Size, seed: Seed) -> Result<U> {
        Ok(self.generate(size, seed)?.into_value())
    }
}

/// A fuzzer that always produces `value` and never shrinks.
pub fn constant<T: Clone + 'static>(value: T) -> Fuzz<T> {
    Fuzz::from_parts(random::constant(value), shrink::noop())
}

pub fn boolean() -> Fuzz<bool> {
    Fuzz::from_parts(random::boolean(), shrink::boolean())
}

/// Samplers that favor zero and the `±size` boundaries.
struct Biased<N> {
    from_size: fn(i64) -> N,
    positive: Random<N>,
    negative: Random<N>,
    both: Random<N>,
}

impl<N: Clone + Emptiness + 'static> Biased<N> {
    fn random(self, positive: bool, negative: bool) -> Random<N> {
        let Biased {
            from_size,
            positive: pos,
            negative: neg,
            both,
        } = self;
        let (pos, neg, both) = (pos.no_empty(), neg.no_empty(), both.no_empty());

        Random::new(move |size, seed| {
            let n = size.get() as i64;
            let mut choices = vec![(1, random::constant(from_size(0)))];

            if n > 0 {
                if positive {
                    choices.push((1, random::constant(from_size(n))));
                }
                if negative {
                    choices.push((1, random::constant(from_size(-n))));
                }
                let body = match (positive, negative) {
                    (true, false) => pos.clone(),
                    (false, true) => neg.clone(),
                    _ => both.clone(),
                };
                choices.push((6, body));
            }

            if n > 50 {
                if positive {
                    choices.push((3, pos.clone().resize(Size::new(50))));
                }
                if negative {
                    choices.push((3, neg.clone().resize(Size::new(50))));
                }
            }

            random::weighted(choices).sample(size, seed)
        })
    }
}

fn biased_integer(positive: bool, negative: bool) -> Random<i64> {
    Biased {
        from_size: |n| n,
        positive: random::pos_integer(),
        negative: random::neg_integer(),
        both: random::integer(),
    }
    .random(positive, negative)
}

fn biased_float(positive: bool, negative: bool) -> Random<f64> {
    Biased {
        from_size: |n| n as f64,
        positive: random::pos_float(),
        negative: random::neg_float(),
        both: random::float(),
    }
    .random(positive, negative)
}

/// Strings biased toward empty, whitespace and a spread of lengths.
fn biased_string() -> Random<String> {
    Random::new(|size, seed| {
        let n = size.get();
        let mut choices = vec![(1, random::constant(String::new()))];

        if n > 0 {
            choices.push((1, random::whitespace().map(String::from)));

            if n <= 10 {
                choices.push((8, random::string().no_empty()));
            } else if n <= 50 {
                choices.push((5, random::string().resize(Size::new(10)).no_empty()));
                choices.push((3, random::string().filter(|s| s.len() > 10, DEFAULT_MAX_TRIES)));
            } else {
                choices.push((5, random::string().resize(Size::new(10)).no_empty()));
                choices.push((
                    2,
                    random::string()
                        .resize(Size::new(50))
                        .filter(|s| s.len() > 10, DEFAULT_MAX_TRIES),
                ));
                choices.push((1, random::string().filter(|s| s.len() > 50, DEFAULT_MAX_TRIES)));
            }
        }

        random::weighted(choices).sample(size, seed)
    })
}

/// Integers in `[-size, size]`, biased toward the edges, shrinking toward zero.
pub fn integer() -> Fuzz<i64> {
    Fuzz::from_parts(biased_integer(true, true), shrink::integer())
}

pub fn pos_integer() -> Fuzz<i64> {
    Fuzz::from_parts(biased_integer(true, false), shrink::integer())
}

pub fn neg_integer() -> Fuzz<i64> {
    Fuzz::from_parts(biased_integer(false, true), shrink::integer())
}

/// Integers in `[min, max]`, uniform, shrinking toward the in-range value
/// closest to zero.
pub fn integer_within(min: i64, max: i64) -> Fuzz<i64> {
    Fuzz::from_parts(random::integer_within(min, max), shrink::within_integer(min, max))
}

pub fn float() -> Fuzz<f64> {
    Fuzz::from_parts(biased_float(true, true), shrink::float())
}

pub fn pos_float() -> Fuzz<f64> {
    Fuzz::from_parts(biased_float(true, false), shrink::float())
}

pub fn neg_float() -> Fuzz<f64> {
    Fuzz::from_parts(biased_float(false, true), shrink::float())
}

/// Floats in `[min, max]`, uniform, shrinking toward the in-range value
/// closest to zero.
pub fn float_within(min: f64, max: f64) -> Fuzz<f64> {
    Fuzz::from_parts(random::float_within(min, max), shrink::within_float(min, max))
}

fn numbers(integers: Fuzz<i64>, floats: Fuzz<f64>) -> Fuzz<Erased, f64> {
    weighted(vec![
        (3, integers.map(|n| n as f64).erase()),
        (1, floats.erase()),
    ])
}

/// Integers and floats mixed three to one.
pub fn number() -> Fuzz<Erased, f64> {
    numbers(integer(), float())
}

pub fn pos_number() -> Fuzz<Erased, f64> {
    numbers(pos_integer(), pos_float())
}

pub fn neg_number() -> Fuzz<Erased, f64> {
    numbers(neg_integer(), neg_float())
}

/// Numbers in `[min, max]`. Ranges holding no integer only produce floats.
pub fn number_within(min: f64, max: f64) -> Fuzz<Erased, f64> {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let (low, high) = (min.ceil(), max.floor());

    if low > high {
        return float_within(min, max).erase();
    }
    numbers(integer_within(low as i64, high as i64), float_within(min, max))
}

/// Printable ASCII strings, shrinking toward `""`.
pub fn string() -> Fuzz<String> {
    Fuzz::from_parts(biased_string(), shrink::string())
}

/// A single printable ASCII character, shrinking toward `' '`.
pub fn character() -> Fuzz<char> {
    Fuzz::from_parts(random::character(), shrink::character())
}

/// Version-4 style UUID strings. Does not shrink.
pub fn uuid() -> Fuzz<String> {
    Fuzz::from_parts(random::uuid(), shrink::noop())
}

/// Defer building a fuzzer. Useful for recursive structures.
pub fn lazy<T, U, F>(f: F) -> Fuzz<T, U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    F: Fn() -> Fuzz<T, U> + 'static,
{
    Fuzz::new(move |size, seed| f().components(size, seed))
}

/// Arrays of `inner` with a length biased like [`pos_integer`].
///
/// Shrinks by removing chunks, then elements one at a time. Elements the
/// inner filter map rejects are dropped rather than rejecting the array.
pub fn array<T, U>(inner: Fuzz<T, U>) -> Fuzz<Vec<T>, Vec<U>>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let lengths = biased_integer(true, false);

    Fuzz::new(move |size, seed| {
        let parts = inner.components(size, seed)?;
        let element = parts.random;
        let random = lengths.clone().bind(move |max_len| {
            random::array(0, element.clone()).resize(Size::new(max_len.max(0) as u32))
        });

        Ok(Components {
            random,
            shrink: shrink::array(parts.shrink),
            seed: parts.seed,
            filter_map: parts.filter_map.to_array(),
        })
    })
}

/// A fixed tuple of fuzzers. Shrinks field by field, never the arity.
pub fn tuple<F: FuzzTuple>(fuzzes: F) -> Fuzz<F::Raw, F::Value> {
    Fuzz::new(move |size, seed| fuzzes.tuple_components(size, seed))
}

/// A fixed-length list of same-typed fuzzers.
pub fn sequence<T, U>(fuzzes: Vec<Fuzz<T, U>>) -> Fuzz<Vec<T>, Vec<U>>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    Fuzz::new(move |size, seed| {
        let mut seed = seed;
        let mut randoms = Vec::with_capacity(fuzzes.len());
        let mut shrinks = Vec::with_capacity(fuzzes.len());
        let mut filter_maps = Vec::with_capacity(fuzzes.len());

        for fuzz in &fuzzes {
            let parts = fuzz.components(size, seed)?;
            seed = parts.seed;
            randoms.push(parts.random);
            shrinks.push(parts.shrink);
            filter_maps.push(parts.filter_map);
        }

        Ok(Components {
            random: random::sequence(randoms),
            shrink: shrink::vec_of(shrinks),
            seed,
            filter_map: filter_map::all(filter_maps),
        })
    })
}

/// A record with one entry per field. The key set never changes while
/// shrinking; constant fields never vary.
///
/// Raw values are kept in declaration order, but [`Record`] is a
/// `BTreeMap`, so the logical record iterates its keys sorted.
pub fn object<U, I, K>(fields: I) -> Fuzz<Vec<Erased>, Record<U>>
where
    U: Clone + 'static,
    I: IntoIterator<Item = (K, Field<U>)>,
    K: Into<String>,
{
    let (keys, fuzzes): (Vec<String>, Vec<Fuzz<Erased, U>>) = fields
        .into_iter()
        .map(|(key, field)| (key.into(), field.into_fuzz()))
        .unzip();

    sequence(fuzzes).map(move |values| keys.iter().cloned().zip(values).collect::<Record<U>>())
}

/// Shallow merge of records, later entries overriding earlier ones.
pub fn spread<U: Clone + 'static>(records: Vec<Fuzz<Erased, Record<U>>>) -> Fuzz<Vec<Erased>, Record<U>> {
    sequence(records).map(|records| records.into_iter().flatten().collect::<Record<U>>())
}

/// Choose a fuzzer with probability proportional to its weight.
///
/// The choice is made when the fuzzer is built and is not revisited
/// while shrinking.
pub fn frequency<T, U>(choices: Vec<(u32, Fuzz<T, U>)>) -> Result<Fuzz<T, U>>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    if choices.iter().all(|(weight, _)| *weight == 0) {
        return Err(FuzzError::InvalidGenerator {
            message: "frequency needs at least one positive weight".to_string(),
        });
    }
    Ok(weighted(choices))
}

/// Choose uniformly between fuzzers.
pub fn one_of<T, U>(choices: Vec<Fuzz<T, U>>) -> Result<Fuzz<T, U>>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    frequency(choices.into_iter().map(|fuzz| (1, fuzz)).collect())
}

pub(crate) fn weighted<T, U>(choices: Vec<(u32, Fuzz<T, U>)>) -> Fuzz<T, U>
where
    T: Clone + 'static,
    U: Clone + 'static,
{
    let indices = random::weighted(
        choices
            .iter()
            .enumerate()
            .map(|(index, (weight, _))| (*weight, random::constant(index)))
            .collect(),
    );
    let fuzzes: Vec<Fuzz<T, U>> = choices.into_iter().map(|(_, fuzz)| fuzz).collect();

    Fuzz::new(move |size, seed| {
        let (index, seed) = indices.sample(size, seed)?;
        let fuzz = fuzzes.get(index).ok_or_else(|| FuzzError::InvalidGenerator {
            message: format!("no alternative at index {index}"),
        })?;
        fuzz.components(size, seed)
    })
}
