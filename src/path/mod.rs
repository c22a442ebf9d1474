//! Module for inferring object, telescope and session from a file's place in the folder tree.
mod edits;
mod logic;
mod structs;
pub use edits::EditIndex;
pub use logic::PathClassifier;
pub use structs::{PathContext, Placement, SessionInfo};
