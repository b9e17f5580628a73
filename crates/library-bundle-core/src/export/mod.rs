//! Library export pipeline
//!
//! [`LibraryExporter`] runs the whole export once: read the library, project
//! every game into an [`ExportRecord`], stage its images, then hand the
//! records to [`bundle::pack`](crate::bundle::pack).

mod projector;
mod record;
mod stager;

pub use projector::*;
pub use record::*;
pub use stager::*;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bundle::pack;
use crate::config::ExportPaths;
use crate::error::Result;
use crate::source::LibrarySource;

/// Progress callback for export runs
pub type ExportProgressCallback = Box<dyn Fn(ExportProgress) + Send + Sync>;

/// Progress information during an export
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current phase
    pub phase: ExportPhase,
    /// Games processed so far
    pub games_processed: usize,
    /// Total games (known once the library is read)
    pub total_games: Option<usize>,
    /// Name of the game being processed
    pub current_game: Option<String>,
}

/// Phase of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// Reading the library
    Reading,
    /// Projecting records and staging images
    Projecting,
    /// Writing the manifest and archive
    Packaging,
    /// Complete
    Complete,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportPhase::Reading => write!(f, "Reading library..."),
            ExportPhase::Projecting => write!(f, "Exporting games..."),
            ExportPhase::Packaging => write!(f, "Creating archive..."),
            ExportPhase::Complete => write!(f, "Complete"),
        }
    }
}

/// Result of a successful export run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Records written to the manifest
    pub games_exported: usize,
    /// Images copied into the bundle
    pub images_staged: usize,
    /// Images referenced but not found in the content store
    pub images_missing: usize,
    /// Images found but not copied
    pub images_failed: usize,
    /// Id references dropped because they did not resolve
    pub unresolved_ids: usize,
    /// SHA-256 of the manifest text
    pub manifest_sha256: String,
    /// Where the archive was written
    pub archive_path: PathBuf,
    /// Archive size in bytes
    pub archive_size: u64,
}

/// Runs the export pipeline against a [`LibrarySource`]
pub struct LibraryExporter {
    paths: ExportPaths,
    progress_callback: Option<ExportProgressCallback>,
}

impl LibraryExporter {
    /// Create an exporter for the given path layout
    pub fn new(paths: ExportPaths) -> Self {
        Self {
            paths,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress_callback(mut self, callback: ExportProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Export the whole library into a fresh archive.
    ///
    /// The previous archive is removed before anything else, so a failed run
    /// never leaves an archive behind.
    pub fn export(&self, source: &dyn LibrarySource) -> Result<ExportSummary> {
        info!(
            "Starting library export to {}",
            self.paths.archive_path.display()
        );

        self.prepare()?;
        self.report(ExportPhase::Reading, 0, None, None);

        let games = match source.games() {
            Ok(games) => games,
            Err(e) => {
                self.discard_staging();
                return Err(e);
            }
        };
        let total = games.len();

        let mut projector = RecordProjector::new(source);
        let mut stager = AssetStager::new(&self.paths.content_root, self.paths.images_root());
        let mut records = Vec::with_capacity(total);

        for (idx, game) in games.iter().enumerate() {
            self.report(
                ExportPhase::Projecting,
                idx,
                Some(total),
                Some(game.name.clone()),
            );
            debug!("Exporting '{}' ({})", game.name, game.id);

            let mut record = projector.project(game);
            stager.stage(game).apply_to(&mut record);
            records.push(record);
        }

        self.report(ExportPhase::Packaging, total, Some(total), None);
        let packed = pack(&records, &self.paths.staging_root, &self.paths.archive_path)?;

        let staging = stager.stats();
        let summary = ExportSummary {
            games_exported: records.len(),
            images_staged: staging.staged,
            images_missing: staging.missing,
            images_failed: staging.failed,
            unresolved_ids: projector.unresolved_ids(),
            manifest_sha256: packed.manifest_sha256,
            archive_path: self.paths.archive_path.clone(),
            archive_size: packed.archive_size,
        };

        self.report(ExportPhase::Complete, total, Some(total), None);
        info!(
            "Exported {} games ({} images, {} missing, {} failed, {} unresolved ids)",
            summary.games_exported,
            summary.images_staged,
            summary.images_missing,
            summary.images_failed,
            summary.unresolved_ids
        );

        Ok(summary)
    }

    /// Clear leftovers of earlier runs and create an empty staging tree
    fn prepare(&self) -> Result<()> {
        if self.paths.staging_root.exists() {
            fs::remove_dir_all(&self.paths.staging_root)?;
        }
        if self.paths.archive_path.exists() {
            fs::remove_file(&self.paths.archive_path)?;
        }
        fs::create_dir_all(self.paths.images_root())?;
        Ok(())
    }

    fn discard_staging(&self) {
        if let Err(e) = fs::remove_dir_all(&self.paths.staging_root) {
            warn!(
                "Failed to remove staging directory {}: {}",
                self.paths.staging_root.display(),
                e
            );
        }
    }

    fn report(
        &self,
        phase: ExportPhase,
        games_processed: usize,
        total_games: Option<usize>,
        current_game: Option<String>,
    ) {
        if let Some(ref cb) = self.progress_callback {
            cb(ExportProgress {
                phase,
                games_processed,
                total_games,
                current_game,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::source::{InMemoryLibrary, SourceGame};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;
    use uuid::Uuid;

    struct FailingSource;

    impl LibrarySource for FailingSource {
        fn games(&self) -> Result<Vec<SourceGame>> {
            Err(Error::Source("database is locked".to_string()))
        }

        fn lookup(&self, _: crate::source::LookupCategory, _: &Uuid) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_source_failure_removes_previous_archive() {
        let temp_dir = tempdir().unwrap();
        let paths = ExportPaths::new(temp_dir.path().join("files"), temp_dir.path());
        fs::write(&paths.archive_path, b"old archive").unwrap();

        let result = LibraryExporter::new(paths.clone()).export(&FailingSource);

        assert!(matches!(result, Err(Error::Source(_))));
        assert!(!paths.archive_path.exists());
        assert!(!paths.staging_root.exists());
    }

    #[test]
    fn test_progress_phases() {
        let temp_dir = tempdir().unwrap();
        let paths = ExportPaths::new(temp_dir.path().join("files"), temp_dir.path());
        let library = InMemoryLibrary::new()
            .with_game(SourceGame::new(Uuid::from_u128(1), "One"))
            .with_game(SourceGame::new(Uuid::from_u128(2), "Two"));

        let phases = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&phases);
        let exporter = LibraryExporter::new(paths).with_progress_callback(Box::new(move |p| {
            recorded.lock().unwrap().push(p.phase);
        }));

        let summary = exporter.export(&library).unwrap();

        assert_eq!(summary.games_exported, 2);
        assert_eq!(
            *phases.lock().unwrap(),
            vec![
                ExportPhase::Reading,
                ExportPhase::Projecting,
                ExportPhase::Projecting,
                ExportPhase::Packaging,
                ExportPhase::Complete,
            ]
        );
    }

    #[test]
    fn test_stale_staging_tree_is_cleared() {
        let temp_dir = tempdir().unwrap();
        let paths = ExportPaths::new(temp_dir.path().join("files"), temp_dir.path());
        let stale = paths.images_root().join("leftover");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("cover.jpg"), b"old").unwrap();

        let summary = LibraryExporter::new(paths.clone())
            .export(&InMemoryLibrary::new())
            .unwrap();

        let verification = crate::bundle::verify_bundle(&summary.archive_path).unwrap();
        assert_eq!(verification.file_count, 1);
        assert!(!paths.staging_root.exists());
    }
}
