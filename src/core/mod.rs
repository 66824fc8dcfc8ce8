//! Core data structures for Depot.
//!
//! - Version markers, the on-disk proof that a dependency is installed
//! - Dependency specifications, one variant per fetch recipe

pub mod dependency;
pub mod marker;

pub use dependency::{Dependency, DependencyKind};
