//! Edge-preserving smoothing
//!
//! The [`BilateralFilter`] removes sensor noise and fine texture before
//! palette construction, so the palette spends its slots on regions rather
//! than on speckle.

mod bilateral;
mod options;

pub use bilateral::BilateralFilter;
pub use options::FilterParameters;
