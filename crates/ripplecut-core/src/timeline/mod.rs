//! Timeline Module
//!
//! Timeline, track and clip model definitions.

mod models;
pub use models::*;
