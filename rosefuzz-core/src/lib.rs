//! Core functionality for rosefuzz property-based testing.
//!
//! Generators are built from three pieces: a [`Random`] sampler driven by
//! an explicit splittable [`Seed`], a [`Shrink`] producing simpler
//! candidates, and a [`FilterMap`] turning raw samples into the values a
//! property sees. [`Fuzz`] fuses them, and [`Property`] runs a predicate
//! against the result, shrinking any failure it finds.

pub mod data;
pub mod error;
pub mod filter_map;
pub mod fuzz;
pub mod property;
pub mod random;
pub mod schema;
pub mod shrink;
pub mod tree;
pub mod tuple;

// Re-export the main types
pub use data::*;
pub use error::*;
pub use filter_map::FilterMap;
pub use fuzz::{Components, Erased, Field, Fuzz, Record};
pub use property::*;
pub use random::Random;
pub use schema::Schema;
pub use shrink::{Candidates, Shrink};
pub use tree::Tree;
