//! Input/output helpers.
//!
//! - card file read/write (`cards`)

pub mod cards;

pub use cards::*;
