//! Status icons for CLI output

use crate::domain::cluster::ClusterStatus;

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (cluster active)
    pub const SUCCESS: &'static str = "✓";

    /// Error icon (cluster failed)
    pub const ERROR: &'static str = "✗";

    /// Pending icon (still provisioning)
    pub const PENDING: &'static str = "⏳";

    /// Deleting icon
    pub const DELETING: &'static str = "⌫";

    /// Unknown icon
    pub const UNKNOWN: &'static str = "?";

    /// Get status icon for a cluster status
    pub fn get_status_icon(status: &ClusterStatus) -> &'static str {
        match status {
            ClusterStatus::Active => Self::SUCCESS,
            ClusterStatus::Error => Self::ERROR,
            ClusterStatus::Deleting => Self::DELETING,
            s if s.is_in_progress() => Self::PENDING,
            _ => Self::UNKNOWN,
        }
    }
}
