//! Shared test utilities for the obsidian-sync workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`](project::TestProject) builder for a project
//!   directory with settings and notes
//! - [`time`]: fixed timestamps so tests never depend on the wall clock

pub mod project;
pub mod time;

pub use project::TestProject;
