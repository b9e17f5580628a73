//! Terminal implementation of the host shell

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use library_bundle_core::{ExportSummary, HostShell, Notification, NotificationLevel};

/// Host shell that prompts on stdin and prints notifications
pub struct ConsoleHost {
    assume_yes: bool,
    /// Keep stdout free for machine-readable output
    quiet_stdout: bool,
    failed: AtomicBool,
    summary: Mutex<Option<ExportSummary>>,
}

impl ConsoleHost {
    pub fn new(assume_yes: bool, quiet_stdout: bool) -> Self {
        Self {
            assume_yes,
            quiet_stdout,
            failed: AtomicBool::new(false),
            summary: Mutex::new(None),
        }
    }

    /// Whether a failure notification was shown
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Summary of the finished run, if it succeeded
    pub fn take_summary(&self) -> Option<ExportSummary> {
        self.summary.lock().ok().and_then(|mut s| s.take())
    }

    fn read_answer(&self, input: &mut impl BufRead) -> bool {
        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(_) => false,
        }
    }
}

impl HostShell for ConsoleHost {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprintln!("{}", title);
        eprintln!("{}", message);
        eprint!("Continue? [y/N] ");
        let _ = io::stderr().flush();

        self.read_answer(&mut io::stdin().lock())
    }

    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info if !self.quiet_stdout => println!("{}", notification.text),
            NotificationLevel::Info => eprintln!("{}", notification.text),
            NotificationLevel::Error => {
                self.failed.store(true, Ordering::Release);
                eprintln!("{}", notification.text);
            }
        }
    }

    fn completed(&self, summary: &ExportSummary) {
        if let Ok(mut slot) = self.summary.lock() {
            *slot = Some(summary.clone());
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
