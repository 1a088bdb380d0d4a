//! Sync report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecSyncError;

/// Aggregate counters and diagnostics for one `sync_tree` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSync {
    /// Source files seen after junk filtering.
    pub cnt_scanned: u64,
    /// Files the plan scheduled for copy.
    pub cnt_planned_copy: u64,
    /// Files the plan scheduled for deletion.
    pub cnt_planned_delete: u64,
    /// Destination directories created.
    pub cnt_dirs_created: u64,
    /// Files copied successfully.
    pub cnt_copied: u64,
    /// Source files left alone because the destination is current.
    pub cnt_skipped: u64,
    /// Destination files deleted (already-missing counts as deleted).
    pub cnt_deleted: u64,
    /// Obsolete destination directories removed.
    pub cnt_dirs_removed: u64,
    /// Obsolete destination directories kept because they were not empty.
    pub cnt_dirs_retained: u64,
    /// Non-fatal warnings collected during scan/execution.
    pub warnings: Vec<String>,
    /// Per-task failures.
    pub errors: Vec<SpecSyncError>,
}

impl ReportSync {
    /// Number of failed tasks.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// `true` when no task failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_planned_copy".to_string(), self.cnt_planned_copy);
        dict_counts.insert("cnt_planned_delete".to_string(), self.cnt_planned_delete);
        dict_counts.insert("cnt_dirs_created".to_string(), self.cnt_dirs_created);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_deleted".to_string(), self.cnt_deleted);
        dict_counts.insert("cnt_dirs_removed".to_string(), self.cnt_dirs_removed);
        dict_counts.insert("cnt_dirs_retained".to_string(), self.cnt_dirs_retained);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} copied={} skipped={} deleted={} dirs_created={} dirs_removed={} dirs_retained={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_skipped,
            self.cnt_deleted,
            self.cnt_dirs_created,
            self.cnt_dirs_removed,
            self.cnt_dirs_retained,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SYNC]"))
    }
}

/// Mutable accumulator for sync statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportSyncBuilder {
    report: ReportSync,
}

impl ReportSyncBuilder {
    /// Increment one or more named counters by `value`.
    ///
    /// Unknown names are ignored.
    pub fn add_counts(&mut self, field_names: &[&str], value: u64) {
        for field_name in field_names {
            match *field_name {
                "cnt_scanned" => self.report.cnt_scanned += value,
                "cnt_planned_copy" => self.report.cnt_planned_copy += value,
                "cnt_planned_delete" => self.report.cnt_planned_delete += value,
                "cnt_dirs_created" => self.report.cnt_dirs_created += value,
                "cnt_copied" => self.report.cnt_copied += value,
                "cnt_skipped" => self.report.cnt_skipped += value,
                "cnt_deleted" => self.report.cnt_deleted += value,
                "cnt_dirs_removed" => self.report.cnt_dirs_removed += value,
                "cnt_dirs_retained" => self.report.cnt_dirs_retained += value,
                _ => {}
            }
        }
    }

    pub fn add_dir_created(&mut self) {
        self.report.cnt_dirs_created += 1;
    }

    pub fn add_copied(&mut self) {
        self.report.cnt_copied += 1;
    }

    pub fn add_deleted(&mut self) {
        self.report.cnt_deleted += 1;
    }

    pub fn add_dir_removed(&mut self) {
        self.report.cnt_dirs_removed += 1;
    }

    pub fn add_dir_retained(&mut self) {
        self.report.cnt_dirs_retained += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.report.errors.push(SpecSyncError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportSync {
        self.report
    }
}
