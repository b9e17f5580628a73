//! # library-bundle-core
//!
//! Core library for exporting a game library into a portable bundle: a JSON
//! manifest of denormalized game records plus the games' images, packed into
//! a single zip archive for offline clients.
//!
//! This crate provides:
//! - Read-only access to the library through the [`LibrarySource`] trait
//! - Projection of games into [`ExportRecord`]s with every id resolved to a name
//! - Staging of cover, background and icon images into the bundle tree
//! - Atomic packaging of the manifest and images into one archive
//! - Background execution with a single-run guard, and host integration traits
//!
//! ## Modules
//!
//! - [`bundle`] - Manifest/archive packaging, extraction and verification
//! - [`config`] - Configuration and export path layout
//! - [`error`] - Error types and Result alias
//! - [`export`] - Record projection, image staging and the export pipeline
//! - [`host`] - Host shell trait and the export user action
//! - [`runner`] - Background worker for export runs
//! - [`source`] - Library source trait, in-memory library and JSON snapshots
//!
//! ## Example
//!
//! ```no_run
//! use library_bundle_core::{load_snapshot, Config, LibraryExporter};
//! use std::path::Path;
//!
//! let config = Config::load();
//! let library = load_snapshot(Path::new("library.snapshot.json"))?;
//!
//! let exporter = LibraryExporter::new(config.export_paths()?);
//! let summary = exporter.export(&library)?;
//! println!("Exported {} games to {}", summary.games_exported, summary.archive_path.display());
//! # Ok::<(), library_bundle_core::Error>(())
//! ```

// Module declarations
pub mod bundle;
pub mod config;
pub mod error;
pub mod export;
pub mod host;
pub mod runner;
pub mod source;

// Re-export key types for convenience

// Error types
pub use error::{Error, Result};

// Configuration
pub use config::{
    Config, ExportPaths, ARCHIVE_FILE_NAME, IMAGES_DIR_NAME, MANIFEST_FILE_NAME, STAGING_DIR_NAME,
};

// Library source
pub use source::{
    load_snapshot, GameLink, InMemoryLibrary, LibrarySnapshot, LibrarySource, LookupCategory,
    NamedEntity, SourceGame,
};

// Export pipeline
pub use export::{
    project, AssetStager, ExportPhase, ExportProgress, ExportProgressCallback, ExportRecord,
    ExportSummary, ImageKind, LibraryExporter, RecordProjector, StagedImages, StagingStats,
};

// Bundle packaging
pub use bundle::{
    extract_bundle, pack, verify_bundle, BundleVerification, IssueSeverity, PackSummary,
    VerificationIssue, VerificationStatus,
};

// Background execution and host integration
pub use host::{ExportAction, HostShell, Notification, NotificationLevel};
pub use runner::{ExportRunner, RunClaim, SharedSource};
