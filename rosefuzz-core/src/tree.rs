//! Lazily expanded rose trees of shrink candidates.

use crate::filter_map::FilterMap;
use crate::shrink::Shrink;
use std::fmt;

pub mod render;

/// A generated value together with the means to produce its shrinks.
///
/// Children are computed on demand from the raw value: every call to
/// [`Tree::children`] shrinks the raw value afresh and keeps only the
/// candidates the filter map accepts.
pub struct Tree<T, U = T> {
    raw: T,
    value: U,
    shrink: Shrink<T>,
    filter_map: FilterMap<T, U>,
}

impl<T: Clone, U: Clone> Clone for Tree<T, U> {
    fn clone(&self) -> Self {
        Tree {
            raw: self.raw.clone(),
            value: self.value.clone(),
            shrink: self.shrink.clone(),
            filter_map: self.filter_map.clone(),
        }
    }
}

impl<T: fmt::Debug, U: fmt::Debug> fmt::Debug for Tree<T, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("raw", &self.raw)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static, U: Clone + 'static> Tree<T, U> {
    /// Create a tree rooted at an accepted raw value and its logical value.
    pub fn new(raw: T, value: U, shrink: Shrink<T>, filter_map: FilterMap<T, U>) -> Self {
        Tree {
            raw,
            value,
            shrink,
            filter_map,
        }
    }

    /// Get the logical value at the root.
    pub fn value(&self) -> &U {
        &self.value
    }

    /// Get the raw value at the root.
    pub fn raw(&self) -> &T {
        &self.raw
    }

    pub fn into_value(self) -> U {
        self.value
    }

    /// The accepted shrink candidates, in shrinker order.
    pub fn children(&self) -> Box<dyn Iterator<Item = Tree<T, U>>> {
        let shrink = self.shrink.clone();
        let filter_map = self.filter_map.clone();

        Box::new(self.shrink.candidates(&self.raw).filter_map(move |raw| {
            let value = filter_map.apply(&raw)?;
            Some(Tree::new(raw, value, shrink.clone(), filter_map.clone()))
        }))
    }

    /// Check if the tree has any children (shrinks).
    pub fn has_shrinks(&self) -> bool {
        self.children().next().is_some()
    }

    /// The values of the immediate children.
    pub fn shrinks(&self) -> Vec<U> {
        self.children().map(Tree::into_value).collect()
    }

    /// Pre-order walk of values, down to `max_depth` levels below the root.
    pub fn expand(&self, max_depth: usize) -> Vec<U> {
        let mut result = vec![self.value.clone()];
        self.expand_recursive(&mut result, max_depth, 0);
        result
    }

    fn expand_recursive(&self, result: &mut Vec<U>, max_depth: usize, current_depth: usize) {
        if current_depth >= max_depth {
            return;
        }

        for child in self.children() {
            result.push(child.value.clone());
            child.expand_recursive(result, max_depth, current_depth + 1);
        }
    }
}
