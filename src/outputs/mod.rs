//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`AggregationReport`](crate::models::AggregationReport)
//!   to the well-known JSON file read by the display code
//!
//! # Output Structure
//!
//! ```text
//! ./
//! └── jobs-data.json   # replaced atomically on every run
//! ```

pub mod json;
