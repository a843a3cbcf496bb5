//! Command implementations for obsidian-sync

pub mod backup;
pub mod config;
pub mod connection;
pub mod init;
pub mod sync;

pub use backup::run_backup;
pub use config::run_config;
pub use connection::run_test;
pub use init::run_init;
pub use sync::run_sync;
