//! Bundle packaging and verification
//!
//! A bundle is a zip archive with the manifest at its root and the staged
//! images under `images/<game-id>/`:
//!
//! ```text
//! MobileExport.zip
//! ├── library.json
//! └── images/
//!     └── 6f1c…/
//!         ├── cover.jpg
//!         └── icon.png
//! ```

mod archive;
mod verify;

pub use archive::*;
pub use verify::*;

use serde::Serialize;
use std::fmt;

/// Outcome of packaging a staging tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    /// SHA-256 of the manifest text, lowercase hex
    pub manifest_sha256: String,
    /// Files written into the archive (manifest included)
    pub files_archived: usize,
    /// Size of the archive in bytes
    pub archive_size: u64,
}

/// Status of bundle verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerificationStatus {
    /// Every manifest entry resolves inside the archive
    Valid,
    /// Usable, with oddities worth a look
    Warning,
    /// Broken manifest or dangling image paths
    Invalid,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::Valid => write!(f, "Valid"),
            VerificationStatus::Warning => write!(f, "Warning"),
            VerificationStatus::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Severity of a verification issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Info => write!(f, "Info"),
            IssueSeverity::Warning => write!(f, "Warning"),
            IssueSeverity::Error => write!(f, "Error"),
        }
    }
}

/// Issue found during bundle verification
#[derive(Debug, Clone, Serialize)]
pub struct VerificationIssue {
    pub severity: IssueSeverity,
    pub message: String,
    /// Archive entry or manifest path the issue is about
    pub path: Option<String>,
}

/// Result of bundle verification
#[derive(Debug, Clone, Serialize)]
pub struct BundleVerification {
    pub status: VerificationStatus,
    /// Files in the archive, manifest included
    pub file_count: usize,
    /// Uncompressed size of those files
    pub total_size: u64,
    /// Records listed in the manifest
    pub record_count: usize,
    /// Image paths referenced by the manifest
    pub image_count: usize,
    pub issues: Vec<VerificationIssue>,
}

impl BundleVerification {
    /// Create an empty, valid result
    pub fn valid() -> Self {
        Self {
            status: VerificationStatus::Valid,
            file_count: 0,
            total_size: 0,
            record_count: 0,
            image_count: 0,
            issues: Vec::new(),
        }
    }

    /// Create a result for an archive that cannot be opened
    pub fn cannot_open(message: String) -> Self {
        let mut result = Self::valid();
        result.add_issue(IssueSeverity::Error, message, None);
        result
    }

    /// Add an issue, downgrading the status to match its severity
    pub fn add_issue(&mut self, severity: IssueSeverity, message: String, path: Option<String>) {
        match severity {
            IssueSeverity::Error => self.status = VerificationStatus::Invalid,
            IssueSeverity::Warning => {
                if self.status == VerificationStatus::Valid {
                    self.status = VerificationStatus::Warning;
                }
            }
            IssueSeverity::Info => {}
        }
        self.issues.push(VerificationIssue {
            severity,
            message,
            path,
        });
    }

    /// Check if a client can consume the bundle
    pub fn is_usable(&self) -> bool {
        self.status != VerificationStatus::Invalid
    }
}
