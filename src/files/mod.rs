//! Directory maintenance tools.

pub mod prune;
pub mod tree;
