//! Project Module
//!
//! The project document and its JSON snapshot persistence.

mod state;
pub use state::*;
