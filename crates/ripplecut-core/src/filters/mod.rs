//! Filter Module
//!
//! Filter model definitions and the clip filter pipeline.

mod models;
pub use models::*;
