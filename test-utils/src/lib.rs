//! Shared helpers of the tests of the workspace.

mod approx_eq;
pub mod fixture;

pub use approx_eq::ApproxEqIter;
#[doc(hidden)]
pub use float_cmp::approx_eq;
