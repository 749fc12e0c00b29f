//! Data models for the note pool.
//!
//! Field names match the stored column names, which are also the JSON names
//! the site's pages read.

mod feedback;
mod note;
mod snapshot;

pub use feedback::*;
pub use note::*;
pub use snapshot::*;
