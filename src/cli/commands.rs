// CLI command definitions

use super::cluster::{
    CreateCommand, CredentialsCommand, DeleteCommand, GetCommand, GrowCommand, ListCommand,
    RebuildCommand,
};
use super::display::OutputFormat;
use super::session::Session;
use crate::infrastructure::constants::{ENV_API_KEY, ENV_CONFIG_FILE, ENV_USERNAME};
use clap::{Args, CommandFactory, Parser};
use std::io::Write;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    "Version: ",
    env!("CARGO_PKG_VERSION"),
    "\nCommit:  ",
    env!("CARINA_COMMIT")
);

#[derive(Parser, Debug)]
#[command(
    name = "carina",
    version,
    long_version = LONG_VERSION,
    about = "Create and interact with clusters on the Carina service",
    long_about = "Command line client for Carina: create, inspect, grow, rebuild and delete \
                  Docker Swarm clusters, and download the credentials needed to talk to them"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and output options accepted by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Rackspace username
    #[arg(long, global = true, env = ENV_USERNAME)]
    pub username: Option<String>,

    /// Rackspace API key
    #[arg(long, global = true, env = ENV_API_KEY, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Carina API endpoint (default: https://app.getcarina.com)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Path to the config file (default: ~/.carina/config.toml)
    #[arg(long, global = true, env = ENV_CONFIG_FILE, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Cluster(ClusterCommands),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

/// Commands that talk to the Carina API and need an authenticated session
#[derive(clap::Subcommand, Debug)]
pub enum ClusterCommands {
    /// Create a swarm cluster
    Create(CreateCommand),

    /// Get information about a swarm cluster
    Get(GetCommand),

    /// List swarm clusters
    List(ListCommand),

    /// Download credentials for a swarm cluster
    Credentials(CredentialsCommand),

    /// Grow a cluster by the requested number of nodes
    Grow(GrowCommand),

    /// Rebuild a swarm cluster
    Rebuild(RebuildCommand),

    /// Delete a swarm cluster
    Delete(DeleteCommand),
}

impl ClusterCommands {
    pub async fn execute<W: Write>(&self, session: &mut Session<W>) -> anyhow::Result<()> {
        match self {
            ClusterCommands::Create(cmd) => cmd.execute(session).await,
            ClusterCommands::Get(cmd) => cmd.execute(session).await,
            ClusterCommands::List(cmd) => cmd.execute(session).await,
            ClusterCommands::Credentials(cmd) => cmd.execute(session).await,
            ClusterCommands::Grow(cmd) => cmd.execute(session).await,
            ClusterCommands::Rebuild(cmd) => cmd.execute(session).await,
            ClusterCommands::Delete(cmd) => cmd.execute(session).await,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl CompletionsCommand {
    pub fn execute<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let mut command = CliArgs::command();
        clap_complete::generate(self.shell, &mut command, "carina", out);
        Ok(())
    }
}
