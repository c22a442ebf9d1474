//! Module for fusing header, filename and path information into one record per file.
mod error;
mod interpret;
mod logic;
mod merge;
pub use error::ResolveError;
pub use interpret::header_candidates;
pub use logic::RecordResolver;
pub use merge::{Layers, Resolved};
