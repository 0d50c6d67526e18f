//! rosefuzz property-based testing library.
//!
//! This is the main entry point for rosefuzz, re-exporting the core
//! engine: generators, shrinkers, the property runner and schemas.

pub use rosefuzz_core::*;
