//! The single output sink shared by every command

use super::TableRenderer;
use crate::domain::cluster::Cluster;
use crate::domain::credentials::CredentialsSummary;
use crate::infrastructure::constants::COLUMN_HEADERS;
use std::io::{self, Write};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tab separated columns, one cluster per line
    #[default]
    Plain,
    /// Boxed table with colored status
    Table,
    /// JSON for scripting
    Json,
}

/// Buffers what a command wants to print and emits it on flush.
///
/// Rows are only written to the underlying stream by [`ClusterWriter::flush`].
/// Dropping the writer flushes whatever is still pending, so output is not
/// lost on an early return; a command that fails before rendering leaves
/// nothing pending.
pub struct ClusterWriter<W: Write> {
    out: W,
    format: OutputFormat,
    listing: bool,
    clusters: Vec<Cluster>,
    credentials: Option<(CredentialsSummary, String)>,
}

impl<W: Write> ClusterWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            listing: false,
            clusters: Vec::new(),
            credentials: None,
        }
    }

    /// Mark the output as a listing: plain output gets a header row and JSON
    /// output becomes an array.
    pub fn write_header(&mut self) {
        self.listing = true;
    }

    pub fn write_cluster(&mut self, cluster: &Cluster) {
        self.clusters.push(cluster.clone());
    }

    pub fn write_credentials(&mut self, summary: CredentialsSummary, hint: String) {
        self.credentials = Some((summary, hint));
    }

    pub fn flush(&mut self) -> io::Result<()> {
        let listing = std::mem::take(&mut self.listing);
        let clusters = std::mem::take(&mut self.clusters);
        let credentials = self.credentials.take();

        match self.format {
            OutputFormat::Plain => {
                if listing {
                    writeln!(self.out, "{}", COLUMN_HEADERS.join("\t"))?;
                }
                for cluster in &clusters {
                    writeln!(self.out, "{}", cluster.columns().join("\t"))?;
                }
                if let Some((_, hint)) = &credentials {
                    write!(self.out, "{}", hint)?;
                }
            }
            OutputFormat::Table => {
                if listing || !clusters.is_empty() {
                    let rendered = TableRenderer::new().render_clusters(&clusters);
                    write!(self.out, "{}", rendered)?;
                    if !rendered.ends_with('\n') {
                        writeln!(self.out)?;
                    }
                }
                if let Some((_, hint)) = &credentials {
                    write!(self.out, "{}", hint)?;
                }
            }
            OutputFormat::Json => {
                if listing {
                    self.write_json(&clusters)?;
                } else {
                    for cluster in &clusters {
                        self.write_json(cluster)?;
                    }
                }
                if let Some((summary, _)) = &credentials {
                    self.write_json(summary)?;
                }
            }
        }

        self.out.flush()
    }

    fn write_json<T: serde::Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)
    }
}

impl<W: Write> Drop for ClusterWriter<W> {
    fn drop(&mut self) {
        // Nothing useful can be done with a failure here
        let _ = self.flush();
    }
}
