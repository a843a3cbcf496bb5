//! Bidirectional synchronization
//!
//! A pass lists both sides, plans one action per path, resolves conflicts
//! and applies the plan:
//!
//! ```text
//! Idle -> Listing -> Reconciling -> Applying -> Reporting -> Idle
//! ```

mod engine;
mod lister;
mod merge;
mod reconcile;
mod record;
mod report;
mod resolver;
pub mod watch;

pub use engine::{SyncEngine, SyncOptions, SyncPhase};
pub use lister::{DirectoryLister, Listing};
pub use merge::{MergeConflict, merge_lines};
pub use reconcile::{PlanEntry, PlannedAction, plan};
pub use record::{FileRecord, Side};
pub use report::{
    ConflictOutcome, ConflictRecord, PathAction, SkippedEntry, SyncResult, TransferStats,
};
pub use resolver::{
    Conflict, ConflictPrompt, ConflictResolver, ConflictStrategy, CustomResolveFn, PromptChoice,
    Resolution, ResolvedConflict,
};
