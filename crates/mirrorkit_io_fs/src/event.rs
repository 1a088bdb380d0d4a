//! Typed run events and the sinks that receive them.
//!
//! The engine never writes to global output. It hands every event to a
//! caller-supplied [`SyncEventSink`]; [`TracingEventSink`] forwards to
//! `tracing`, [`CollectEventSink`] keeps them in memory.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::report::ReportSync;

/// Severity attached to each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumSyncEventLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Everything observable that happens during one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSyncEvent {
    /// Run accepted; about to scan.
    SyncStarted {
        path_dir_src: PathBuf,
        path_dir_dst: PathBuf,
        if_dry_run: bool,
    },
    /// Non-fatal problem (unreadable directory, pool fallback, ...).
    Warning { message: String },
    DirectoryCreated { path_rel: PathBuf },
    /// The directory pass found nothing to create.
    NoDirectoriesCreated,
    /// Planned copy/delete counts.
    Planned {
        cnt_copy: u64,
        cnt_delete: u64,
        cnt_unchanged: u64,
    },
    FileCopied { path_rel: PathBuf },
    CopyFailed { path: PathBuf, exception: String },
    FileDeleted { path_rel: PathBuf, if_junk: bool },
    DeleteFailed { path: PathBuf, exception: String },
    DirectoryCreateFailed { path: PathBuf, exception: String },
    DirectoryRemoved { path_rel: PathBuf },
    /// Obsolete directory left in place because it still has content.
    DirectoryRetained { path_rel: PathBuf },
    DirectoryRemoveFailed { path: PathBuf, exception: String },
    /// Obsolete-directory pass finished having removed `cnt_removed` directories.
    ObsoleteDirectoriesRemoved { cnt_removed: u64 },
    /// The obsolete-directory pass found nothing to remove.
    NoObsoleteDirectories,
    /// Final counters of the run.
    SyncFinished { report: ReportSync },
}

impl EnumSyncEvent {
    pub fn level(&self) -> EnumSyncEventLevel {
        match self {
            Self::FileCopied { .. } => EnumSyncEventLevel::Debug,
            Self::SyncStarted { .. }
            | Self::DirectoryCreated { .. }
            | Self::NoDirectoriesCreated
            | Self::Planned { .. }
            | Self::FileDeleted { .. }
            | Self::DirectoryRemoved { .. }
            | Self::ObsoleteDirectoriesRemoved { .. }
            | Self::NoObsoleteDirectories
            | Self::SyncFinished { .. } => EnumSyncEventLevel::Info,
            Self::Warning { .. } | Self::DirectoryRetained { .. } => EnumSyncEventLevel::Warning,
            Self::CopyFailed { .. }
            | Self::DeleteFailed { .. }
            | Self::DirectoryCreateFailed { .. }
            | Self::DirectoryRemoveFailed { .. } => EnumSyncEventLevel::Error,
        }
    }
}

/// Receiver of run events. Called concurrently from worker threads.
pub trait SyncEventSink: Send + Sync {
    fn emit(&self, event: &EnumSyncEvent);
}

impl<F> SyncEventSink for F
where
    F: Fn(&EnumSyncEvent) + Send + Sync,
{
    fn emit(&self, event: &EnumSyncEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl SyncEventSink for NoopEventSink {
    fn emit(&self, _event: &EnumSyncEvent) {}
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl SyncEventSink for TracingEventSink {
    fn emit(&self, event: &EnumSyncEvent) {
        match event {
            EnumSyncEvent::SyncStarted {
                path_dir_src,
                path_dir_dst,
                if_dry_run,
            } => tracing::info!(
                source = %path_dir_src.display(),
                destination = %path_dir_dst.display(),
                dry_run = *if_dry_run,
                "Sync started"
            ),
            EnumSyncEvent::Warning { message } => tracing::warn!("{message}"),
            EnumSyncEvent::DirectoryCreated { path_rel } => {
                tracing::info!(path = %path_rel.display(), "Directory created")
            }
            EnumSyncEvent::NoDirectoriesCreated => tracing::info!("No new directories to create"),
            EnumSyncEvent::Planned {
                cnt_copy,
                cnt_delete,
                cnt_unchanged,
            } => tracing::info!(
                copy = *cnt_copy,
                delete = *cnt_delete,
                unchanged = *cnt_unchanged,
                "Plan built"
            ),
            EnumSyncEvent::FileCopied { path_rel } => {
                tracing::debug!(path = %path_rel.display(), "Copied")
            }
            EnumSyncEvent::CopyFailed { path, exception } => {
                tracing::error!(path = %path.display(), error = %exception, "Copy failed")
            }
            EnumSyncEvent::FileDeleted { path_rel, if_junk } => {
                tracing::info!(path = %path_rel.display(), junk = *if_junk, "Removed")
            }
            EnumSyncEvent::DeleteFailed { path, exception } => {
                tracing::error!(path = %path.display(), error = %exception, "Delete failed")
            }
            EnumSyncEvent::DirectoryCreateFailed { path, exception } => tracing::error!(
                path = %path.display(),
                error = %exception,
                "Directory creation failed"
            ),
            EnumSyncEvent::DirectoryRemoved { path_rel } => {
                tracing::info!(path = %path_rel.display(), "Removed obsolete directory")
            }
            EnumSyncEvent::DirectoryRetained { path_rel } => tracing::warn!(
                path = %path_rel.display(),
                "Directory not empty, not removed"
            ),
            EnumSyncEvent::DirectoryRemoveFailed { path, exception } => tracing::error!(
                path = %path.display(),
                error = %exception,
                "Directory removal failed"
            ),
            EnumSyncEvent::ObsoleteDirectoriesRemoved { cnt_removed } => {
                tracing::info!(count = *cnt_removed, "Removed obsolete directories")
            }
            EnumSyncEvent::NoObsoleteDirectories => {
                tracing::info!("No obsolete directories to remove")
            }
            EnumSyncEvent::SyncFinished { report } => tracing::info!("{report}"),
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectEventSink {
    l_events: Mutex<Vec<EnumSyncEvent>>,
}

impl CollectEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<EnumSyncEvent> {
        self.l_events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count_level(&self, enum_level: EnumSyncEventLevel) -> usize {
        self.l_events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| e.level() == enum_level)
            .count()
    }
}

impl SyncEventSink for CollectEventSink {
    fn emit(&self, event: &EnumSyncEvent) {
        self.l_events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{
        CollectEventSink, EnumSyncEvent, EnumSyncEventLevel, SyncEventSink, TracingEventSink,
    };

    #[test]
    fn levels_follow_event_kind() {
        let path = PathBuf::from("a");
        assert_eq!(
            EnumSyncEvent::FileCopied {
                path_rel: path.clone()
            }
            .level(),
            EnumSyncEventLevel::Debug
        );
        assert_eq!(
            EnumSyncEvent::DirectoryRetained {
                path_rel: path.clone()
            }
            .level(),
            EnumSyncEventLevel::Warning
        );
        assert_eq!(
            EnumSyncEvent::CopyFailed {
                path,
                exception: "denied".to_string()
            }
            .level(),
            EnumSyncEventLevel::Error
        );
        assert_eq!(
            EnumSyncEvent::NoDirectoriesCreated.level(),
            EnumSyncEventLevel::Info
        );
        assert_eq!(
            EnumSyncEvent::ObsoleteDirectoriesRemoved { cnt_removed: 2 }.level(),
            EnumSyncEventLevel::Info
        );
    }

    #[test]
    fn collect_sink_keeps_order_and_counts_levels() {
        let sink = CollectEventSink::new();
        sink.emit(&EnumSyncEvent::NoDirectoriesCreated);
        sink.emit(&EnumSyncEvent::Warning {
            message: "w".to_string(),
        });

        let l_events = sink.events();
        assert_eq!(l_events.len(), 2);
        assert_eq!(l_events[0], EnumSyncEvent::NoDirectoriesCreated);
        assert_eq!(sink.count_level(EnumSyncEventLevel::Warning), 1);
        assert_eq!(sink.count_level(EnumSyncEventLevel::Error), 0);
    }

    #[test]
    fn closures_are_sinks() {
        let n_seen = AtomicUsize::new(0);
        let sink = |_: &EnumSyncEvent| {
            n_seen.fetch_add(1, Ordering::SeqCst);
        };
        sink.emit(&EnumSyncEvent::NoDirectoriesCreated);
        sink.emit(&EnumSyncEvent::NoDirectoriesCreated);
        assert_eq!(n_seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn tracing_sink_accepts_every_event_without_subscriber() {
        let sink = TracingEventSink;
        sink.emit(&EnumSyncEvent::FileDeleted {
            path_rel: PathBuf::from("x"),
            if_junk: true,
        });
        sink.emit(&EnumSyncEvent::SyncFinished {
            report: Default::default(),
        });
    }
}
