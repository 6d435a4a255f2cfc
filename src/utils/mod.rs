//! Shared numeric and sampling helpers.

pub mod linalg;
pub mod sampling;

pub use linalg::{solve_symmetric, weighted_least_squares};
pub use sampling::sample_indices;
