//! The single terminal outcome type every download attempt collapses
//! into. The user sees `user_message`; everything diagnostic goes to
//! the log text at the stated severity.

use std::path::Path;

use tracing::{error, info, warn};

/// Log level the outcome should be reported at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Rough shape of the outcome, for exit codes and status styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    /// Neutral: nothing happened (e.g. the user canceled).
    Message,
    Success,
    Failure,
}

/// Terminal result of one download attempt.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    /// Short, human-facing status line.
    pub user_message: String,
    pub severity: Severity,
    /// Full diagnostic text for the log.
    pub log_message: String,
    pub category: OutcomeCategory,
    /// Scales how long a status display lingers; failures stay a
    /// little longer than successes.
    pub display_duration_multiplier: f32,
}

impl DownloadOutcome {
    pub fn finished(path: &Path, url: &str) -> Self {
        Self {
            user_message: "Download Finished".to_string(),
            severity: Severity::Info,
            log_message: format!("[DOWNLOAD FINISHED]\n{}\n{url}", path.display()),
            category: OutcomeCategory::Success,
            display_duration_multiplier: 1.0,
        }
    }

    pub fn failed(path: &Path, url: &str, detail: &str) -> Self {
        Self {
            user_message: "Download Failed".to_string(),
            severity: Severity::Error,
            log_message: format!("[DOWNLOAD FAILED]\n{}\n{url}\n{detail}", path.display()),
            category: OutcomeCategory::Failure,
            display_duration_multiplier: 1.25,
        }
    }

    pub fn errored(path: &Path, url: &str, detail: &str, error: &str) -> Self {
        Self {
            user_message: "Download Errored".to_string(),
            severity: Severity::Error,
            log_message: format!(
                "[DOWNLOAD ERRORED]\n{}\n{url}\n{detail}\n{error}",
                path.display()
            ),
            category: OutcomeCategory::Failure,
            display_duration_multiplier: 1.25,
        }
    }

    pub fn canceled() -> Self {
        Self {
            user_message: "Download Canceled".to_string(),
            severity: Severity::Info,
            log_message: "[SAVE DIALOG CLOSED / DOWNLOAD CANCELED]".to_string(),
            category: OutcomeCategory::Message,
            display_duration_multiplier: 1.25,
        }
    }

    pub fn path_too_long(path: &Path) -> Self {
        Self {
            user_message: "File Path Too Long".to_string(),
            severity: Severity::Warn,
            log_message: format!("[FILE PATH TOO LONG]\n{}", path.display()),
            category: OutcomeCategory::Failure,
            display_duration_multiplier: 1.25,
        }
    }

    pub fn invalid_path(built: &Path, resolved: &Path) -> Self {
        Self {
            user_message: "Invalid File Path".to_string(),
            severity: Severity::Warn,
            log_message: format!(
                "[INVALID FILE PATH]\n{}\n{}",
                built.display(),
                resolved.display()
            ),
            category: OutcomeCategory::Failure,
            display_duration_multiplier: 1.25,
        }
    }

    pub fn invalid_source(detail: &str) -> Self {
        Self {
            user_message: "Invalid Asset Source".to_string(),
            severity: Severity::Warn,
            log_message: format!("[INVALID ASSET SOURCE]\n{detail}"),
            category: OutcomeCategory::Failure,
            display_duration_multiplier: 1.25,
        }
    }

    /// Reports the outcome through tracing at its own severity.
    pub fn emit(&self) {
        match self.severity {
            Severity::Info => info!(outcome = self.user_message.as_str(), "{}", self.log_message),
            Severity::Warn => warn!(outcome = self.user_message.as_str(), "{}", self.log_message),
            Severity::Error => {
                error!(outcome = self.user_message.as_str(), "{}", self.log_message);
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.category == OutcomeCategory::Success
    }
}
