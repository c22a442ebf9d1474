//! Module for extracting field candidates from file and folder names.
mod filters;
mod logic;
pub mod parsing;
pub use filters::{FilterKeyword, FilterTable};
pub use logic::{KNOWN_GROUPS, PatternMatcher};
