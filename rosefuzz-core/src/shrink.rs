//! Shrinkers: lazy sequences of simpler candidates for a value.
//!
//! Every shrinker is a pure function of the value it is given. Candidates
//! are produced on demand, and asking twice yields the same sequence.

use crate::data::Emptiness;
use crate::tuple::ShrinkTuple;
use std::iter;
use std::ops::Neg;
use std::rc::Rc;

/// A lazy, restartable sequence of shrink candidates.
pub type Candidates<T> = Box<dyn Iterator<Item = T>>;

/// Smallest gap the float series still bisects.
pub const FLOAT_EPSILON: f64 = 1e-4;

/// A shrinker from values of type `T` to candidates of type `U`.
pub struct Shrink<T, U = T> {
    shrinker: Rc<dyn Fn(&T) -> Candidates<U>>,
}

impl<T, U> Clone for Shrink<T, U> {
    fn clone(&self) -> Self {
        Shrink {
            shrinker: Rc::clone(&self.shrinker),
        }
    }
}

impl<T: 'static, U: 'static> Shrink<T, U> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> Candidates<U> + 'static,
    {
        Shrink {
            shrinker: Rc::new(f),
        }
    }

    /// The candidates for `value`, most aggressive first.
    pub fn candidates(&self, value: &T) -> Candidates<U> {
        (self.shrinker)(value)
    }

    /// Collect every candidate for `value`.
    pub fn values(&self, value: &T) -> Vec<U> {
        self.candidates(value).collect()
    }

    pub fn map<V, F>(self, f: F) -> Shrink<T, V>
    where
        F: Fn(U) -> V + 'static,
        V: 'static,
    {
        let f = Rc::new(f);
        Shrink::new(move |value| {
            let f = Rc::clone(&f);
            Box::new(self.candidates(value).map(move |candidate| f(candidate)))
        })
    }

    /// Drop candidates the predicate rejects.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&U) -> bool + 'static,
    {
        let predicate = Rc::new(predicate);
        Shrink::new(move |value| {
            let predicate = Rc::clone(&predicate);
            Box::new(self.candidates(value).filter(move |candidate| predicate(candidate)))
        })
    }

    /// A shrinker that never produces candidates.
    pub fn no_shrink(self) -> Self {
        Shrink::new(|_| Box::new(iter::empty()))
    }

    /// Drop empty candidates.
    pub fn no_empty(self) -> Self
    where
        U: Emptiness,
    {
        self.filter(|candidate| !candidate.is_empty_value())
    }

    /// Lift into `Option`. `None` is already minimal and never shrinks.
    pub fn maybe(self) -> Shrink<Option<T>, Option<U>> {
        Shrink::new(move |value: &Option<T>| match value {
            Some(inner) => Box::new(self.candidates(inner).map(Some)),
            None => Box::new(iter::empty()),
        })
    }

    /// Same as [`Shrink::maybe`].
    pub fn nullable(self) -> Shrink<Option<T>, Option<U>> {
        self.maybe()
    }

    /// Shrink values of another representation by converting them into
    /// `T`, shrinking, and converting the candidates back.
    pub fn convert<V, F, G>(self, from: F, into: G) -> Shrink<V>
    where
        V: 'static,
        F: Fn(&V) -> T + 'static,
        G: Fn(U) -> V + 'static,
    {
        let into = Rc::new(into);
        Shrink::new(move |value: &V| {
            let into = Rc::clone(&into);
            Box::new(self.candidates(&from(value)).map(move |candidate| into(candidate)))
        })
    }
}

/// A shrinker that never produces candidates.
pub fn noop<T: 'static>() -> Shrink<T> {
    Shrink::new(|_| Box::new(iter::empty()))
}

trait Series: Copy + PartialOrd + Neg<Output = Self> + 'static {
    const ZERO: Self;

    /// Bisect from `low` toward `high`, yielding `low` first and never `high`.
    fn series(low: Self, high: Self) -> Candidates<Self>;
}

impl Series for i128 {
    const ZERO: Self = 0;

    fn series(low: Self, high: Self) -> Candidates<Self> {
        Box::new(iter::successors((low < high).then_some(low), move |&current| {
            if current >= high - 1 {
                return None;
            }
            Some(current + (high - current + 1) / 2)
        }))
    }
}

impl Series for f64 {
    const ZERO: Self = 0.0;

    fn series(low: Self, high: Self) -> Candidates<Self> {
        Box::new(iter::successors((low < high).then_some(low), move |&current| {
            if current >= high - FLOAT_EPSILON {
                return None;
            }
            let next = current + (high - current) / 2.0;
            (next > current && next < high).then_some(next)
        }))
    }
}

fn toward<N: Series>(pivot: N, num: N) -> Candidates<N> {
    let zero = N::ZERO;

    if pivot == zero && num == zero {
        return Box::new(iter::empty());
    }

    // Opposite signs walk through zero first.
    if pivot >= zero && num < zero {
        return Box::new(N::series(zero, -num).map(|m| -m));
    }
    if pivot < zero && num >= zero {
        return N::series(zero, num);
    }

    if num > pivot {
        N::series(pivot, num)
    } else {
        Box::new(N::series(-pivot, -num).map(|m| -m))
    }
}

fn beyond<N: Series>(pivot: N, candidate: N) -> bool {
    if pivot > N::ZERO {
        candidate >= pivot
    } else if pivot < N::ZERO {
        candidate <= pivot
    } else {
        true
    }
}

/// The in-range value closest to zero.
fn pivot_within<N: Series>(min: N, max: N) -> N {
    if min > N::ZERO {
        min
    } else if max < N::ZERO {
        max
    } else {
        N::ZERO
    }
}

/// Integers toward zero.
pub fn integer() -> Shrink<i64> {
    toward_integer(0)
}

/// Integers toward `pivot`.
pub fn toward_integer(pivot: i64) -> Shrink<i64> {
    Shrink::new(move |&num: &i64| {
        Box::new(toward(pivot as i128, num as i128).map(|m| m as i64))
    })
}

/// Integers toward `pivot`, never crossing to its far side.
pub fn at_least_integer(pivot: i64) -> Shrink<i64> {
    toward_integer(pivot).filter(move |&candidate| beyond(pivot as i128, candidate as i128))
}

/// Integers toward the in-range value closest to zero, kept inside `[min, max]`.
pub fn within_integer(min: i64, max: i64) -> Shrink<i64> {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    toward_integer(pivot_within(min as i128, max as i128) as i64).filter(move |candidate| (min..=max).contains(candidate))
}

/// Floats toward zero.
pub fn float() -> Shrink<f64> {
    toward_float(0.0)
}

/// Floats toward `pivot`. Non-finite values do not shrink.
pub fn toward_float(pivot: f64) -> Shrink<f64> {
    Shrink::new(move |&num: &f64| {
        if !num.is_finite() || !pivot.is_finite() {
            return Box::new(iter::empty());
        }
        toward(pivot, num)
    })
}

pub fn at_least_float(pivot: f64) -> Shrink<f64> {
    toward_float(pivot).filter(move |&candidate| beyond(pivot, candidate))
}

/// Floats toward the in-range value closest to zero, kept inside `[min, max]`.
pub fn within_float(min: f64, max: f64) -> Shrink<f64> {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    toward_float(pivot_within(min, max)).filter(move |candidate| (min..=max).contains(candidate))
}

/// `true` shrinks to `false`.
pub fn boolean() -> Shrink<bool> {
    Shrink::new(|&value: &bool| {
        if value {
            Box::new(iter::once(false))
        } else {
            Box::new(iter::empty())
        }
    })
}

/// Characters toward the space character.
pub fn character() -> Shrink<char> {
    let codes = at_least_integer(32);
    Shrink::new(move |&c: &char| {
        Box::new(
            codes
                .candidates(&(c as i64))
                .filter_map(|code| u32::try_from(code).ok().and_then(char::from_u32)),
        )
    })
}

/// Strings shrink as arrays of characters.
pub fn string() -> Shrink<String> {
    array(character()).convert(
        |s: &String| s.chars().collect::<Vec<char>>(),
        |chars| chars.into_iter().collect(),
    )
}

/// Arrays: first remove chunks, then shrink one element at a time.
pub fn array<T: Clone + 'static>(inner: Shrink<T>) -> Shrink<Vec<T>> {
    Shrink::new(move |values: &Vec<T>| {
        if values.is_empty() {
            return Box::new(iter::empty());
        }

        let values = Rc::new(values.clone());
        let shrinkers = Rc::new(vec![inner.clone(); values.len()]);

        Box::new(removals(Rc::clone(&values)).chain(shrink_one(values, shrinkers)))
    })
}

/// Fixed-length lists with one shrinker per position.
///
/// A value whose length differs from the number of shrinkers has no
/// candidates.
pub fn vec_of<T: Clone + 'static>(shrinkers: Vec<Shrink<T>>) -> Shrink<Vec<T>> {
    let shrinkers = Rc::new(shrinkers);
    Shrink::new(move |values: &Vec<T>| {
        if values.len() != shrinkers.len() {
            return Box::new(iter::empty());
        }
        shrink_one(Rc::new(values.clone()), Rc::clone(&shrinkers))
    })
}

/// Tuples shrink one field at a time, first field first.
pub fn tuple<S: ShrinkTuple>(shrinkers: S) -> Shrink<S::Value> {
    Shrink::new(move |value| shrinkers.shrink_fields(value))
}

/// Each contiguous chunk removed, for chunk sizes `len, len / 2, ..., 1`.
fn removals<T: Clone + 'static>(values: Rc<Vec<T>>) -> Candidates<Vec<T>> {
    let len = values.len();
    let sizes = iter::successors(Some(len), |&k| (k > 1).then_some(k / 2));

    Box::new(sizes.flat_map(move |k| {
        let values = Rc::clone(&values);
        (0..)
            .map(move |chunk| chunk * k)
            .take_while(move |&offset| offset + k <= len)
            .map(move |offset| {
                let mut removed = Vec::with_capacity(len - k);
                removed.extend_from_slice(&values[..offset]);
                removed.extend_from_slice(&values[offset + k..]);
                removed
            })
    }))
}

/// Replace exactly one element by one of its candidates, left to right.
fn shrink_one<T: Clone + 'static>(
    values: Rc<Vec<T>>,
    shrinkers: Rc<Vec<Shrink<T>>>,
) -> Candidates<Vec<T>> {
    Box::new((0..values.len()).flat_map(move |index| {
        let values = Rc::clone(&values);
        let candidates = shrinkers[index].candidates(&values[index]);
        candidates.map(move |candidate| {
            let mut next = values.as_ref().clone();
            next[index] = candidate;
            next
        })
    }))
}
