//! Module for walking a tree of image files and collecting the records into an inventory.
pub mod export;
mod scanner;
mod structs;
pub use export::COLUMNS;
pub use scanner::{Scan, Scanner};
pub use structs::{CancelToken, Inventory, ScanEvent, SkippedFile};
