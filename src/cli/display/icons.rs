//! Status icons for CLI output

use crate::domain::stack::StackStatus;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Operation finished as requested
    pub const SUCCESS: &'static str = "✓";

    /// Informational notice
    pub const WARNING: &'static str = "⚠";

    /// Operation failed or rolled back
    pub const ERROR: &'static str = "✗";

    /// Operation still running
    pub const PENDING: &'static str = "⏳";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon for a stack or resource status
    pub fn get_status_icon(status: &StackStatus) -> &'static str {
        if status.is_failure() {
            Self::ERROR
        } else if status.is_terminal() {
            Self::SUCCESS
        } else if status.is_in_progress() {
            Self::PENDING
        } else {
            Self::UNKNOWN
        }
    }

    /// Get a one-word summary of a status
    pub fn get_status_text(status: &StackStatus) -> &'static str {
        if status.is_failure() {
            "Failed"
        } else if status.is_terminal() {
            "Complete"
        } else if status.is_in_progress() {
            "In progress"
        } else {
            "Unknown"
        }
    }
}
