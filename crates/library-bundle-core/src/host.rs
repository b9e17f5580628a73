//! Host integration
//!
//! The host application (menus, dialogs, notifications) is reached only
//! through [`HostShell`]. [`ExportAction`] is the single user-triggered
//! action: ask for confirmation, announce the start, run the export in the
//! background and report exactly one outcome.

use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::error;

use crate::config::ExportPaths;
use crate::error::Result;
use crate::export::{ExportSummary, LibraryExporter};
use crate::runner::{ExportRunner, SharedSource};

/// Notification id sent when an export starts
pub const NOTIFY_STARTED: &str = "library-export-start";
/// Notification id sent when an export succeeds
pub const NOTIFY_SUCCEEDED: &str = "library-export-success";
/// Notification id sent when an export fails
pub const NOTIFY_FAILED: &str = "library-export-error";

const CONFIRM_TITLE: &str = "Start library export?";
const CONFIRM_MESSAGE: &str = "Your library metadata and images will be exported to a single \
    archive for offline clients.\nLarge libraries can take a while.";

/// Severity of a host notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Message shown to the user by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: &'static str,
    pub text: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn info(id: &'static str, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn error(id: &'static str, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// The host application's user-facing surface
pub trait HostShell: Send + Sync {
    /// Ask a yes/no question; `true` means go ahead
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Show a notification
    fn notify(&self, notification: Notification);

    /// Called with the summary of a successful run, before the success
    /// notification
    fn completed(&self, _summary: &ExportSummary) {}
}

/// The "export library" user action
pub struct ExportAction {
    host: Arc<dyn HostShell>,
    runner: ExportRunner,
    paths: ExportPaths,
    source: SharedSource,
}

impl ExportAction {
    /// Create the action for a host, a path layout and a library source
    pub fn new(host: Arc<dyn HostShell>, paths: ExportPaths, source: SharedSource) -> Self {
        Self {
            host,
            runner: ExportRunner::new(),
            paths,
            source,
        }
    }

    /// Whether the action can be triggered (no export in flight).
    ///
    /// Hosts use this to grey out the menu entry.
    pub fn is_enabled(&self) -> bool {
        !self.runner.is_running()
    }

    /// Run the action.
    ///
    /// Returns `Ok(None)` when the user declines, the worker handle when the
    /// export started, and [`Error::ExportInProgress`](crate::Error::ExportInProgress)
    /// when a previous run has not finished or its prompt is still open.
    pub fn trigger(&self) -> Result<Option<JoinHandle<()>>> {
        // Held across the prompt so a second trigger cannot also get through
        let claim = self.runner.claim()?;

        if !self.host.confirm(CONFIRM_TITLE, CONFIRM_MESSAGE) {
            return Ok(None);
        }

        self.host
            .notify(Notification::info(NOTIFY_STARTED, "Library export started..."));

        let host = Arc::clone(&self.host);
        let spawned = claim.spawn(
            LibraryExporter::new(self.paths.clone()),
            Arc::clone(&self.source),
            move |result| report_outcome(host.as_ref(), result),
        );

        match spawned {
            Ok(handle) => Ok(Some(handle)),
            Err(e) => {
                error!("Library export could not start: {}", e);
                self.host
                    .notify(Notification::error(NOTIFY_FAILED, format!("Export failed: {}", e)));
                Err(e)
            }
        }
    }
}

fn report_outcome(host: &dyn HostShell, result: Result<ExportSummary>) {
    match result {
        Ok(summary) => {
            host.completed(&summary);
            let file_name = summary
                .archive_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| summary.archive_path.display().to_string());
            host.notify(Notification::info(
                NOTIFY_SUCCEEDED,
                format!(
                    "Library exported successfully to '{}' ({} games)",
                    file_name, summary.games_exported
                ),
            ));
        }
        Err(e) => {
            error!("Library export failed: {}", e);
            host.notify(Notification::error(
                NOTIFY_FAILED,
                format!("Export failed: {}", e),
            ));
        }
    }
}
