//! Fixed-arity tuple support for samplers, shrinkers, filter maps and fuzzers.
//!
//! Each trait is implemented for tuples of arity 1 through 6. Fields are
//! always visited left to right, so seeds thread in field order and
//! shrinking tries the first field before the rest.

use crate::data::{Seed, Size};
use crate::error::Result;
use crate::filter_map::{self, FilterMap};
use crate::fuzz::{Components, Fuzz};
use crate::random::{self, Random};
use crate::shrink::{self, Candidates, Shrink};
use std::iter;

/// A tuple of samplers, drawn in field order.
pub trait RandomTuple: 'static {
    type Value: 'static;

    fn sample_fields(&self, size: Size, seed: Seed) -> Result<(Self::Value, Seed)>;
}

/// A tuple of shrinkers, one per field.
pub trait ShrinkTuple: 'static {
    type Value: Clone + 'static;

    /// Shrink exactly one field at a time, leaving the others untouched.
    fn shrink_fields(&self, value: &Self::Value) -> Candidates<Self::Value>;
}

/// A tuple of filter maps, all-or-nothing.
pub trait FilterMapTuple: 'static {
    type Raw: 'static;
    type Value: 'static;

    fn apply_fields(&self, raw: &Self::Raw) -> Option<Self::Value>;
}

/// A tuple of fuzzers combined field by field.
pub trait FuzzTuple: 'static {
    type Raw: Clone + 'static;
    type Value: Clone + 'static;

    fn tuple_components(&self, size: Size, seed: Seed) -> Result<Components<Self::Raw, Self::Value>>;
}

macro_rules! impl_tuples {
    ($( ($($raw:ident $value:ident $var:ident $idx:tt),+) )+) => {$(
        impl<$($raw: 'static),+> RandomTuple for ($(Random<$raw>,)+) {
            type Value = ($($raw,)+);

            fn sample_fields(&self, size: Size, seed: Seed) -> Result<(Self::Value, Seed)> {
                $(let ($var, seed) = self.$idx.sample(size, seed)?;)+
                Ok((($($var,)+), seed))
            }
        }

        impl<$($raw: Clone + 'static),+> ShrinkTuple for ($(Shrink<$raw>,)+) {
            type Value = ($($raw,)+);

            fn shrink_fields(&self, value: &Self::Value) -> Candidates<Self::Value> {
                let mut candidates: Candidates<Self::Value> = Box::new(iter::empty());
                $(
                    let base = value.clone();
                    let field = self.$idx.candidates(&value.$idx);
                    candidates = Box::new(candidates.chain(field.map(move |candidate| {
                        let mut next = base.clone();
                        next.$idx = candidate;
                        next
                    })));
                )+
                candidates
            }
        }

        impl<$($raw: 'static, $value: 'static),+> FilterMapTuple for ($(FilterMap<$raw, $value>,)+) {
            type Raw = ($($raw,)+);
            type Value = ($($value,)+);

            fn apply_fields(&self, raw: &Self::Raw) -> Option<Self::Value> {
                Some(($(self.$idx.apply(&raw.$idx)?,)+))
            }
        }

        impl<$($raw: Clone + 'static, $value: Clone + 'static),+> FuzzTuple for ($(Fuzz<$raw, $value>,)+) {
            type Raw = ($($raw,)+);
            type Value = ($($value,)+);

            fn tuple_components(&self, size: Size, seed: Seed) -> Result<Components<Self::Raw, Self::Value>> {
                $(
                    let $var = self.$idx.components(size, seed)?;
                    let seed = $var.seed;
                )+

                Ok(Components {
                    random: random::tuple(($($var.random,)+)),
                    shrink: shrink::tuple(($($var.shrink,)+)),
                    seed,
                    filter_map: filter_map::tuple(($($var.filter_map,)+)),
                })
            }
        }
    )+};
}

impl_tuples! {
    (A1 B1 a 0)
    (A1 B1 a 0, A2 B2 b 1)
    (A1 B1 a 0, A2 B2 b 1, A3 B3 c 2)
    (A1 B1 a 0, A2 B2 b 1, A3 B3 c 2, A4 B4 d 3)
    (A1 B1 a 0, A2 B2 b 1, A3 B3 c 2, A4 B4 d 3, A5 B5 e 4)
    (A1 B1 a 0, A2 B2 b 1, A3 B3 c 2, A4 B4 d 3, A5 B5 e 4, A6 B6 f 5)
}
