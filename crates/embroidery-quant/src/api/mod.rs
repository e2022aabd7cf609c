//! Public API for the embroidery-quant crate.
//!
//! This module provides the high-level API: the [`Pipeline`] entry point,
//! its parameters and output, cooperative cancellation, and the
//! [`QuantError`] unified error type.

mod error;
mod pipeline;

pub use error::{QuantError, Stage};
pub use pipeline::{CancelToken, Pipeline, PipelineOutput, PipelineParams};
