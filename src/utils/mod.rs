//! Utility modules for EV scoring
//!
//! Contains shared numeric helpers used across several stages:
//! - Normalization: rescaling raw values onto the 0-5 scale
//! - Percentile: interpolated percentiles for concentration thresholds

pub mod normalization;
pub mod percentile;

// Re-export commonly used items
pub use normalization::{min_max_rescale, rescale, rescale_qualitative, rescale_quantitative, RescaledMatrix};
pub use percentile::percentile;
