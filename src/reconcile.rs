//! Directory reconciliation.
//!
//! Makes the output directory contain exactly one wallpaper per current
//! record, rendering only what is missing and deleting what is stale.
//!
//! ## Algorithm
//!
//! 1. **Snapshot** the directory once, before any write or delete. Hidden
//!    files (leading `.`) and subdirectories are not part of it.
//! 2. **Walk** the records in order:
//!    - no backdrop → `NoBackdrop`, not protected from deletion
//!    - canonical filename already claimed by an earlier record → `Duplicate`
//!    - filename in the snapshot → `Skipped`, never re-rendered
//!    - otherwise materialize and write → `Rendered`, or `Failed`
//! 3. **Delete** every snapshot file whose name no record claimed.
//!
//! A failing record or delete is logged and recorded; the pass continues.
//! Only being unable to create or list the directory itself is an error.
//!
//! ## Writes
//!
//! Bytes go to `.<name>.tmp` in the same directory and are renamed into
//! place, so an interrupted write never leaves a partial file under a
//! canonical name, which the next run would take as already materialized.
//!
//! Runs must not overlap on the same directory; nothing here locks it.

use crate::imaging::RenderError;
use crate::source::FetchError;
use crate::types::MediaRecord;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Why a single record could not be materialized.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("record has no backdrop")]
    NoBackdrop,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("write failed: {0}")]
    Filesystem(#[from] io::Error),
}

/// Produces the encoded file contents for one record.
pub trait Materialize {
    fn materialize(&self, record: &MediaRecord) -> Result<Vec<u8>, ItemError>;
}

impl<T: Materialize + ?Sized> Materialize for &T {
    fn materialize(&self, record: &MediaRecord) -> Result<Vec<u8>, ItemError> {
        (**self).materialize(record)
    }
}

/// What happened to one file during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    Rendered,
    Skipped,
    Duplicate,
    NoBackdrop,
    Failed(String),
    Deleted,
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub filename: String,
    /// `None` for deletions, which have no record.
    pub title: Option<String>,
    pub kind: OutcomeKind,
}

/// Counts and per-file outcomes of one pass, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub rendered: usize,
    pub deleted: usize,
    /// Already present, plus duplicates within the batch.
    pub skipped: usize,
    pub outcomes: Vec<Outcome>,
}

impl ReconcileReport {
    /// Records and deletes that failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.kind, OutcomeKind::Failed(_) | OutcomeKind::DeleteFailed(_)))
            .count()
    }

    pub fn no_backdrop(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::NoBackdrop)
            .count()
    }

    fn record(&mut self, filename: &str, title: Option<&str>, kind: OutcomeKind) {
        match kind {
            OutcomeKind::Rendered => self.rendered += 1,
            OutcomeKind::Skipped | OutcomeKind::Duplicate => self.skipped += 1,
            OutcomeKind::Deleted => self.deleted += 1,
            _ => {}
        }
        self.outcomes.push(Outcome {
            filename: filename.to_string(),
            title: title.map(str::to_string),
            kind,
        });
    }
}

/// Names of the visible regular files directly inside `dir`.
pub fn snapshot(dir: &Path) -> io::Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        names.insert(name.into_owned());
    }
    Ok(names)
}

/// Write `bytes` to `dir/name` through a hidden temp file and a rename.
pub fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
    let tmp = dir.join(format!(".{name}.tmp"));
    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, dir.join(name)));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Bring `dir` in line with `records`. See the module docs.
pub fn reconcile<M: Materialize + ?Sized>(
    records: &[MediaRecord],
    dir: &Path,
    maker: &M,
) -> io::Result<ReconcileReport> {
    fs::create_dir_all(dir)?;
    let existing = snapshot(dir)?;
    debug!(dir = %dir.display(), files = existing.len(), "snapshot taken");

    let mut report = ReconcileReport::default();
    let mut claimed: HashSet<String> = HashSet::new();

    for record in records {
        let filename = record.canonical_filename();
        let title = Some(record.title.as_str());

        if record.backdrop.is_none() {
            warn!(title = %record.title, "no backdrop, skipping");
            report.record(&filename, title, OutcomeKind::NoBackdrop);
            continue;
        }
        if !claimed.insert(filename.clone()) {
            warn!(title = %record.title, file = %filename, "another record already maps to this file");
            report.record(&filename, title, OutcomeKind::Duplicate);
            continue;
        }
        if existing.contains(&filename) {
            debug!(title = %record.title, file = %filename, "already present");
            report.record(&filename, title, OutcomeKind::Skipped);
            continue;
        }

        let written = maker
            .materialize(record)
            .and_then(|bytes| write_atomic(dir, &filename, &bytes).map_err(ItemError::from));
        match written {
            Ok(()) => {
                info!(title = %record.title, file = %filename, "rendered");
                report.record(&filename, title, OutcomeKind::Rendered);
            }
            Err(e) => {
                warn!(title = %record.title, error = %e, "render failed");
                report.record(&filename, title, OutcomeKind::Failed(e.to_string()));
            }
        }
    }

    for stale in existing.iter().filter(|name| !claimed.contains(*name)) {
        match fs::remove_file(dir.join(stale)) {
            Ok(()) => {
                info!(file = %stale, "deleted stale wallpaper");
                report.record(stale, None, OutcomeKind::Deleted);
            }
            Err(e) => {
                warn!(file = %stale, error = %e, "delete failed");
                report.record(stale, None, OutcomeKind::DeleteFailed(e.to_string()));
            }
        }
    }

    Ok(report)
}
