//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::cluster::Cluster;
use crate::infrastructure::constants::COLUMN_HEADERS;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render clusters as a boxed table with a colored status column
    pub fn render_clusters(&self, clusters: &[Cluster]) -> String {
        if clusters.is_empty() {
            return "No Carina clusters found".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                COLUMN_HEADERS
                    .iter()
                    .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
            );

        for cluster in clusters {
            let status_icon = StatusIcon::get_status_icon(&cluster.status);
            let status_color = self.theme.get_status_color(&cluster.status);

            table.add_row(vec![
                Cell::new(&cluster.name),
                Cell::new(&cluster.flavor),
                Cell::new(cluster.node_count).set_alignment(CellAlignment::Right),
                Cell::new(if cluster.autoscale { "on" } else { "off" })
                    .set_alignment(CellAlignment::Center),
                Cell::new(format!("{} {}", status_icon, cluster.status)).fg(status_color),
            ]);
        }

        let mut output = String::new();
        if clusters.len() > 1 {
            output.push_str(&format!(
                "╭─ Carina Clusters {} ─╮\n",
                format!("[{} clusters]", clusters.len()).bright_black()
            ));
        }
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Active  {} In progress  {} Error\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::PENDING.yellow(),
            StatusIcon::ERROR.red()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::ClusterStatus;

    fn cluster(name: &str, status: ClusterStatus) -> Cluster {
        Cluster {
            name: name.to_string(),
            username: None,
            flavor: "container1-4G".to_string(),
            image: None,
            node_count: 3,
            autoscale: true,
            status,
            task_id: None,
        }
    }

    #[test]
    fn test_render_empty_clusters() {
        let renderer = TableRenderer::new();
        let output = renderer.render_clusters(&[]);
        assert!(output.contains("No Carina clusters found"));
    }

    #[test]
    fn test_render_clusters() {
        let renderer = TableRenderer::new();
        let output = renderer.render_clusters(&[
            cluster("alpha", ClusterStatus::Active),
            cluster("beta", ClusterStatus::Building),
        ]);

        assert!(output.contains("CLUSTERNAME"));
        assert!(output.contains("alpha"));
        assert!(output.contains("beta"));
        assert!(output.contains("container1-4G"));
        assert!(output.contains("building"));
        assert!(output.contains("2 clusters"));
    }
}
