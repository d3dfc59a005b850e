// Copyright 2025 The Carina Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cluster snapshot as reported by the Carina API

use crate::infrastructure::constants::{
    STATUS_ACTIVE, STATUS_BUILDING, STATUS_DELETING, STATUS_ERROR, STATUS_NEW,
    STATUS_REBUILDING_SWARM,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lifecycle status of a cluster.
///
/// The backend reports plain strings. The known ones get their own variant,
/// anything else is kept verbatim in `Other` and is always terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClusterStatus {
    New,
    Building,
    RebuildingSwarm,
    Active,
    Deleting,
    Error,
    Other(String),
}

impl ClusterStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => STATUS_NEW,
            Self::Building => STATUS_BUILDING,
            Self::RebuildingSwarm => STATUS_REBUILDING_SWARM,
            Self::Active => STATUS_ACTIVE,
            Self::Deleting => STATUS_DELETING,
            Self::Error => STATUS_ERROR,
            Self::Other(s) => s,
        }
    }

    /// Statuses the backend reports while it is still provisioning the cluster.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::New | Self::Building | Self::RebuildingSwarm)
    }
}

impl Default for ClusterStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for ClusterStatus {
    fn from(s: &str) -> Self {
        match s {
            STATUS_NEW => Self::New,
            STATUS_BUILDING => Self::Building,
            STATUS_REBUILDING_SWARM => Self::RebuildingSwarm,
            STATUS_ACTIVE => Self::Active,
            STATUS_DELETING => Self::Deleting,
            STATUS_ERROR => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ClusterStatus {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<ClusterStatus> for String {
    fn from(status: ClusterStatus) -> Self {
        match status {
            ClusterStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Carina cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(rename = "cluster_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    pub flavor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "nodes", default, deserialize_with = "deserialize_node_count")]
    pub node_count: u64,

    #[serde(default)]
    pub autoscale: bool,

    #[serde(default)]
    pub status: ClusterStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Cluster {
    /// Columns in `ClusterName, Flavor, Nodes, AutoScale, Status` order
    pub fn columns(&self) -> [String; 5] {
        [
            self.name.clone(),
            self.flavor.clone(),
            self.node_count.to_string(),
            self.autoscale.to_string(),
            self.status.to_string(),
        ]
    }
}

/// Request body for cluster creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCluster {
    #[serde(rename = "cluster_name")]
    pub name: String,
    #[serde(rename = "nodes")]
    pub node_count: u32,
    pub autoscale: bool,
}

impl NewCluster {
    pub fn new(name: impl Into<String>, node_count: u32, autoscale: bool) -> Self {
        Self {
            name: name.into(),
            node_count,
            autoscale,
        }
    }
}

// The API has sent `nodes` both as a JSON number and as a numeric string.
fn deserialize_node_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NodeCount {
        Number(u64),
        Text(String),
    }

    match NodeCount::deserialize(deserializer)? {
        NodeCount::Number(n) => Ok(n),
        NodeCount::Text(s) if s.trim().is_empty() => Ok(0),
        NodeCount::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid nodes '{}': {}", s, e))),
    }
}
