//! `mirrorkit_io_fs` v1:
//! Rust-side one-way directory mirroring engine.
//!
//! Modules:
//! - `skip`     : OS artifact name predicate
//! - `scan`     : recursive tree enumeration
//! - `classify` : mtime + content fingerprint change detection
//! - `dirs`     : directory creation and obsolete-directory pruning
//! - `plan`     : copy/delete planning
//! - `execute`  : bounded parallel execution of a plan
//! - `sync`     : top-level entry points
//! - `event`    : typed run events and sinks
//! - `report`   : run-time report model
//! - `spec`     : options/plan units/errors
//! - `util`     : shared helper functions

pub mod classify;
pub mod dirs;
pub mod event;
pub mod execute;
pub mod plan;
pub mod report;
pub mod scan;
pub mod skip;
pub mod spec;
pub mod sync;
mod util;

pub use classify::{file_fingerprint, should_copy};
pub use dirs::{remove_obsolete_directories, sync_directories};
pub use event::{
    CollectEventSink, EnumSyncEvent, EnumSyncEventLevel, NoopEventSink, SyncEventSink,
    TracingEventSink,
};
pub use execute::execute_plan;
pub use plan::build_sync_plan;
pub use report::{ReportSync, ReportSyncBuilder};
pub use scan::{enumerate_dirs, enumerate_files};
pub use skip::is_junk_name;
pub use spec::{
    N_THREADS_PER_WORKER_DEFAULT, SpecCopyTask, SpecDeleteTask, SpecEntry, SpecObsoleteDir,
    SpecSyncError, SpecSyncOptions, SpecSyncPlan, SyncTreeError,
};
pub use sync::{sync_tree, sync_tree_with_sink};
