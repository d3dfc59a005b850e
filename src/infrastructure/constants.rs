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

use std::time::Duration;

/// Carina API endpoints
pub const BETA_ENDPOINT: &str = "https://app.getcarina.com";

/// Environment variables
pub const ENV_USERNAME: &str = "RACKSPACE_USERNAME";
pub const ENV_API_KEY: &str = "RACKSPACE_APIKEY";
pub const ENV_CONFIG_FILE: &str = "CARINA_CONFIG";

/// Default config file, relative to $HOME
pub const DEFAULT_CONFIG_DIR: &str = ".carina";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// HTTP headers
pub const HEADER_AUTH_TOKEN: &str = "X-Auth-Token";

/// API paths
pub const PATH_TOKENS: &str = "tokens";
pub const PATH_CLUSTERS: &str = "clusters";
pub const PATH_GROW: &str = "grow";
pub const PATH_REBUILD: &str = "rebuild";
pub const PATH_ZIP: &str = "zip";

/// Cluster statuses the backend reports while work is still in flight
pub const STATUS_NEW: &str = "new";
pub const STATUS_BUILDING: &str = "building";
pub const STATUS_REBUILDING_SWARM: &str = "rebuilding-swarm";

/// Terminal cluster statuses
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DELETING: &str = "deleting";
pub const STATUS_ERROR: &str = "error";

/// Wait configuration
pub const STARTUP_GRACE_PERIOD: Duration = Duration::from_secs(40);
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Credential bundle permissions
pub const CREDENTIAL_FILE_MODE: u32 = 0o600;
pub const CREDENTIAL_DIR_MODE: u32 = 0o777;

/// Environment files shipped inside a credential bundle
pub const DOCKER_ENV_FILE: &str = "docker.env";
pub const DOCKER_FISH_FILE: &str = "docker.fish";
pub const DOCKER_PS1_FILE: &str = "docker.ps1";

/// Output column headers
pub const COLUMN_HEADERS: [&str; 5] = ["ClusterName", "Flavor", "Nodes", "AutoScale", "Status"];
