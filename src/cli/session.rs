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

//! Authenticated state shared by every cluster command

use super::commands::GlobalArgs;
use super::display::ClusterWriter;
use crate::domain::cluster::WaitPolicy;
use crate::domain::config::{CarinaConf, ConnectionSettings};
use crate::infrastructure::api::{CarinaClient, ClusterClient};
use crate::shared::Result;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// The API client, the output sink and the wait timing for one invocation.
///
/// Built once before any command action runs; owns the output sink so it is
/// flushed when the session goes away, whichever way the command ended.
pub struct Session<W: Write> {
    client: Arc<dyn ClusterClient>,
    output: ClusterWriter<W>,
    policy: WaitPolicy,
}

impl<W: Write> Session<W> {
    pub fn new(
        client: Arc<dyn ClusterClient>,
        output: ClusterWriter<W>,
        policy: WaitPolicy,
    ) -> Self {
        Self {
            client,
            output,
            policy,
        }
    }

    /// Load configuration, resolve credentials and authenticate.
    ///
    /// Fails before any command runs when credentials are missing or rejected.
    pub async fn connect(args: &GlobalArgs, out: W) -> Result<Self> {
        let conf = CarinaConf::load(args.config.as_deref())?;
        let settings = ConnectionSettings::resolve(
            args.username.clone(),
            args.api_key.clone(),
            args.endpoint.clone(),
            &conf,
        )?;
        debug!("Connecting with {:?}", settings);

        let client = CarinaClient::authenticate(&settings).await?;

        Ok(Self::new(
            Arc::new(client),
            ClusterWriter::new(out, args.format),
            conf.wait.policy(),
        ))
    }

    pub fn client(&self) -> Arc<dyn ClusterClient> {
        Arc::clone(&self.client)
    }

    pub fn output(&mut self) -> &mut ClusterWriter<W> {
        &mut self.output
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }
}
