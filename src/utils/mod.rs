//! Utility modules shared across the pipeline.

pub mod html;
pub mod path;
