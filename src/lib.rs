//! # Astro Inventory
//!
//! Build a metadata inventory of an astrophotography capture archive.
//!
//! The scanner walks an `Object/Telescope/Session/subs` folder tree and produces one record per
//! image file, combining three kinds of evidence:
//!
//! - **Embedded headers**: FITS header cards and EXIF camera tags (through `exiftool`).
//! - **Names**: configurable regexes over file names and folder names, with filter names
//!   normalised through a keyword table.
//! - **Folder layout**: object, telescope and session inferred from the position in the tree,
//!   plus an anomaly flag for files outside a `subs` folder.
//!
//! Every field carries the source it came from. Headers win over file names, file names over
//! folder names, and those over the layout; placeholder header values such as a zero exposure
//! count as absent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use astro_inventory::{ScanEvent, Scanner};
//! use std::path::Path;
//!
//! fn main() -> color_eyre::Result<()> {
//!     let mut scanner = Scanner::builder().build();
//!     let inventory = scanner.run(Path::new("/data/astro"), |event| {
//!         if let ScanEvent::Progress { processed, total } = event {
//!             println!("{processed}/{total}");
//!         }
//!     })?;
//!
//!     println!("{} files, {} skipped", inventory.len(), inventory.skipped.len());
//!     inventory.write_csv(Path::new("inventory.csv"))?;
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod headers;
pub mod inventory;
pub mod path;
pub mod patterns;
pub mod resolver;
pub mod structs;
pub mod utils;

pub use config::{ConfigError, ConfigFile, ScanConfig};
pub use error::InventoryError;
pub use inventory::{CancelToken, Inventory, ScanEvent, Scanner};
pub use structs::{FileFormat, FileRecord, Source, Sourced};
