//! Color theme for CLI output

use crate::domain::cluster::ClusterStatus;
use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color based on cluster status
    pub fn get_status_color(&self, status: &ClusterStatus) -> TableColor {
        match status {
            ClusterStatus::Active => self.success,
            ClusterStatus::Error => self.error,
            ClusterStatus::Deleting => self.muted,
            s if s.is_in_progress() => self.warning,
            _ => self.info,
        }
    }
}
