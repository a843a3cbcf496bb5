//! Filesystem layer for obsidian-sync
//!
//! Provides normalized relative paths, atomic I/O, include/exclude filtering
//! and recursive scanning of the local notes directory.

pub mod checksum;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod path;
pub mod scan;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use filter::FileFilter;
pub use path::{NormalizedPath, validate_relative};
pub use scan::{LocalEntry, scan_dir};
