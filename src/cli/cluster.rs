//! Cluster commands, built from layered argument groups
//!
//! Every command runs against a [`Session`]. Commands that act on one
//! cluster add a cluster name on top of it; commands that change a cluster
//! add the `--wait` flag on top of that.

use super::display::ClusterWriter;
use super::session::Session;
use crate::domain::cluster::{Cluster, ClusterReconciler, ClusterValidator, NewCluster, WaitPolicy};
use crate::domain::credentials::{resolve_destination, source_hint, write_bundle};
use crate::infrastructure::api::ClusterClient;
use crate::shared::Result;
use clap::{Args, Parser};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn parse_cluster_name(value: &str) -> std::result::Result<String, String> {
    ClusterValidator::validate_cluster_name(value).map_err(|e| e.to_string())?;
    Ok(value.to_string())
}

/// Arguments shared by every command that targets a single cluster
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// Name of the cluster
    #[arg(value_name = "cluster-name", value_parser = parse_cluster_name)]
    pub cluster_name: String,
}

/// Arguments for commands that change a cluster and may wait for it
#[derive(Args, Debug, Clone)]
pub struct WaitClusterArgs {
    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Wait for the previous cluster operation to complete
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this many seconds (default: wait indefinitely)
    #[arg(
        long,
        value_name = "SECONDS",
        requires = "wait",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub wait_timeout: Option<u64>,
}

/// Innermost layer: access to the session
pub struct BaseCommand<'s, W: Write> {
    session: &'s mut Session<W>,
}

impl<'s, W: Write> BaseCommand<'s, W> {
    pub fn new(session: &'s mut Session<W>) -> Self {
        Self { session }
    }

    pub fn client(&self) -> Arc<dyn ClusterClient> {
        self.session.client()
    }

    pub fn output(&mut self) -> &mut ClusterWriter<W> {
        self.session.output()
    }

    pub fn policy(&self) -> WaitPolicy {
        self.session.policy()
    }
}

/// A base command plus the name of the cluster it acts on
pub struct ClusterCommand<'s, W: Write> {
    base: BaseCommand<'s, W>,
    cluster_name: String,
}

impl<'s, W: Write> ClusterCommand<'s, W> {
    pub fn new(session: &'s mut Session<W>, args: &ClusterArgs) -> Self {
        Self {
            base: BaseCommand::new(session),
            cluster_name: args.cluster_name.clone(),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn client(&self) -> Arc<dyn ClusterClient> {
        self.base.client()
    }

    pub fn output(&mut self) -> &mut ClusterWriter<W> {
        self.base.output()
    }

    pub fn policy(&self) -> WaitPolicy {
        self.base.policy()
    }

    /// Run `op` against the named cluster and render the cluster it returns.
    pub async fn apply<F, Fut>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(Arc<dyn ClusterClient>, String) -> Fut,
        Fut: Future<Output = Result<Cluster>>,
    {
        let cluster = op(self.client(), self.cluster_name.clone()).await?;
        self.render(&cluster)
    }

    fn render(&mut self, cluster: &Cluster) -> Result<()> {
        let output = self.output();
        output.write_cluster(cluster);
        output.flush()?;
        Ok(())
    }
}

/// A cluster command that can block until the cluster settles
pub struct WaitClusterCommand<'s, W: Write> {
    cluster: ClusterCommand<'s, W>,
    wait: bool,
    policy: WaitPolicy,
}

impl<'s, W: Write> WaitClusterCommand<'s, W> {
    pub fn new(session: &'s mut Session<W>, args: &WaitClusterArgs) -> Self {
        let cluster = ClusterCommand::new(session, &args.cluster);
        let policy = cluster
            .policy()
            .with_timeout(args.wait_timeout.map(Duration::from_secs));

        Self {
            cluster,
            wait: args.wait,
            policy,
        }
    }

    pub fn cluster_name(&self) -> &str {
        self.cluster.cluster_name()
    }

    pub fn client(&self) -> Arc<dyn ClusterClient> {
        self.cluster.client()
    }

    /// Run `op`, wait for the cluster to settle when `--wait` was given,
    /// then render the final cluster state.
    pub async fn apply_wait<F, Fut>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(Arc<dyn ClusterClient>, String) -> Fut,
        Fut: Future<Output = Result<Cluster>>,
    {
        let client = self.client();
        let name = self.cluster_name().to_string();

        let outcome = op(Arc::clone(&client), name.clone()).await;
        let cluster = ClusterReconciler::new(client.as_ref(), self.policy)
            .reconcile(&name, outcome, self.wait)
            .await?;

        self.cluster.render(&cluster)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    #[command(flatten)]
    pub target: WaitClusterArgs,

    /// Number of nodes for the initial cluster
    #[arg(long, default_value_t = 1)]
    pub nodes: u32,

    /// Whether autoscale is on or off
    #[arg(long)]
    pub autoscale: bool,
}

impl CreateCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        let request = NewCluster::new(
            self.target.cluster.cluster_name.clone(),
            self.nodes,
            self.autoscale,
        );
        ClusterValidator::validate_new_cluster(&request)?;

        info!(
            "Creating cluster {} with {} node(s)",
            request.name, request.node_count
        );
        WaitClusterCommand::new(session, &self.target)
            .apply_wait(move |client, _| async move { client.create(&request).await })
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GetCommand {
    #[command(flatten)]
    pub target: ClusterArgs,
}

impl GetCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        ClusterCommand::new(session, &self.target)
            .apply(|client, name| async move { client.get(&name).await })
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        let mut command = BaseCommand::new(session);
        let clusters = command.client().list().await?;

        let output = command.output();
        output.write_header();
        for cluster in &clusters {
            output.write_cluster(cluster);
        }
        output.flush()?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GrowCommand {
    #[command(flatten)]
    pub target: ClusterArgs,

    /// Number of nodes to increase the cluster by
    #[arg(long, required = true, allow_negative_numbers = true)]
    pub nodes: i32,
}

impl GrowCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        let nodes = self.nodes;
        info!("Growing cluster {} by {} node(s)", self.target.cluster_name, nodes);
        ClusterCommand::new(session, &self.target)
            .apply(move |client, name| async move { client.grow(&name, nodes).await })
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RebuildCommand {
    #[command(flatten)]
    pub target: WaitClusterArgs,
}

impl RebuildCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        info!("Rebuilding cluster {}", self.target.cluster.cluster_name);
        WaitClusterCommand::new(session, &self.target)
            .apply_wait(|client, name| async move { client.rebuild(&name).await })
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    #[command(flatten)]
    pub target: ClusterArgs,
}

impl DeleteCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        info!("Deleting cluster {}", self.target.cluster_name);
        ClusterCommand::new(session, &self.target)
            .apply(|client, name| async move { client.delete(&name).await })
            .await?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CredentialsCommand {
    #[command(flatten)]
    pub target: ClusterArgs,

    /// Path to write credentials out to (default: ./<cluster-name>)
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl CredentialsCommand {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        let mut command = ClusterCommand::new(session, &self.target);
        let name = command.cluster_name().to_string();

        let bundle = command.client().credentials(&name).await?;
        let dir = resolve_destination(self.path.as_deref(), &name);
        let summary = write_bundle(&bundle, &dir)?;
        info!("Wrote {} credential file(s) to {}", summary.files.len(), summary.path);

        let shell = std::env::var("SHELL").ok();
        let hint = source_hint(&dir, shell.as_deref());

        let output = command.output();
        output.write_credentials(summary, hint);
        output.flush()?;
        Ok(())
    }
}
