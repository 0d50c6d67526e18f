//! Rejectable transforms from raw sampled values to logical values.
//!
//! Samplers and shrinkers keep working on raw values. A `FilterMap` is
//! re-applied to every raw value, original or shrunk, to obtain the value
//! a property sees. `None` rejects the raw value.

use crate::data::Emptiness;
use crate::tuple::FilterMapTuple;
use std::rc::Rc;

pub struct FilterMap<T, U = T> {
    f: Rc<dyn Fn(&T) -> Option<U>>,
}

impl<T, U> Clone for FilterMap<T, U> {
    fn clone(&self) -> Self {
        FilterMap {
            f: Rc::clone(&self.f),
        }
    }
}

impl<T: Clone + 'static> FilterMap<T> {
    /// Accept every value unchanged.
    pub fn identity() -> Self {
        FilterMap::new(|value: &T| Some(value.clone()))
    }
}

impl<T: 'static, U: 'static> FilterMap<T, U> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&T) -> Option<U> + 'static,
    {
        FilterMap { f: Rc::new(f) }
    }

    /// Transform a raw value, or `None` when it is rejected.
    pub fn apply(&self, value: &T) -> Option<U> {
        (self.f)(value)
    }

    pub fn map<V, F>(self, f: F) -> FilterMap<T, V>
    where
        F: Fn(U) -> V + 'static,
        V: 'static,
    {
        FilterMap::new(move |value| self.apply(value).map(&f))
    }

    /// Reject values the predicate does not hold for.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&U) -> bool + 'static,
    {
        FilterMap::new(move |value| self.apply(value).filter(|mapped| predicate(mapped)))
    }

    /// Compose with another rejectable transform.
    pub fn and_then<V, F>(self, f: F) -> FilterMap<T, V>
    where
        F: Fn(U) -> Option<V> + 'static,
        V: 'static,
    {
        FilterMap::new(move |value| self.apply(value).and_then(&f))
    }

    pub fn no_empty(self) -> Self
    where
        U: Emptiness,
    {
        self.filter(|value| !value.is_empty_value())
    }

    /// Lift element-wise. Rejected elements are dropped; the array itself
    /// is never rejected.
    pub fn to_array(self) -> FilterMap<Vec<T>, Vec<U>> {
        FilterMap::new(move |values: &Vec<T>| {
            Some(values.iter().filter_map(|value| self.apply(value)).collect())
        })
    }

    /// Lift into `Option`. `None` passes through untouched.
    pub fn maybe(self) -> FilterMap<Option<T>, Option<U>> {
        FilterMap::new(move |value: &Option<T>| match value {
            Some(inner) => self.apply(inner).map(Some),
            None => Some(None),
        })
    }

    /// Same as [`FilterMap::maybe`].
    pub fn nullable(self) -> FilterMap<Option<T>, Option<U>> {
        self.maybe()
    }
}

/// Apply one transform per position. Rejects the whole list if any
/// element is rejected or the lengths differ.
pub fn all<T: 'static, U: 'static>(filter_maps: Vec<FilterMap<T, U>>) -> FilterMap<Vec<T>, Vec<U>> {
    FilterMap::new(move |values: &Vec<T>| {
        if values.len() != filter_maps.len() {
            return None;
        }
        filter_maps
            .iter()
            .zip(values)
            .map(|(filter_map, value)| filter_map.apply(value))
            .collect()
    })
}

/// Apply one transform per field, rejecting if any field is rejected.
pub fn tuple<F: FilterMapTuple>(filter_maps: F) -> FilterMap<F::Raw, F::Value> {
    FilterMap::new(move |value| filter_maps.apply_fields(value))
}
