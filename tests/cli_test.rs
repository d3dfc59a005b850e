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

use carina::cli::display::{ClusterWriter, OutputFormat};
use carina::cli::{CliArgs, Commands, Session};
use carina::*;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

mod test_utils {
    use super::*;
    use std::collections::{BTreeMap, HashMap, VecDeque};
    use std::io::{self, Write};
    use std::sync::Mutex;

    /// Output sink the test can read back after the session is gone
    #[derive(Clone, Default)]
    pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// In-memory stand-in for the Carina API.
    ///
    /// Mutating calls answer from `replies`; `get` answers from a per-cluster
    /// script and repeats the last entry once the script runs out.
    #[derive(Default)]
    pub struct FakeClusterClient {
        pub clusters: Mutex<Vec<Cluster>>,
        pub replies: Mutex<HashMap<&'static str, Result<Cluster>>>,
        pub gets: Mutex<VecDeque<Result<Cluster>>>,
        pub calls: Mutex<Vec<String>>,
        pub fetched_at: Mutex<Vec<Instant>>,
        pub bundle: Mutex<Option<CredentialsBundle>>,
    }

    impl FakeClusterClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, call: &'static str, outcome: Result<Cluster>) -> Self {
            self.replies.lock().unwrap().insert(call, outcome);
            self
        }

        pub fn then_get(self, outcome: Result<Cluster>) -> Self {
            self.gets.lock().unwrap().push_back(outcome);
            self
        }

        pub fn with_clusters(self, clusters: Vec<Cluster>) -> Self {
            *self.clusters.lock().unwrap() = clusters;
            self
        }

        pub fn with_bundle(self, files: &[(&str, &str)]) -> Self {
            let files: BTreeMap<String, Vec<u8>> = files
                .iter()
                .map(|(name, body)| (name.to_string(), body.as_bytes().to_vec()))
                .collect();
            *self.bundle.lock().unwrap() = Some(CredentialsBundle { files });
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn fetch_offsets(&self, start: Instant) -> Vec<u64> {
            self.fetched_at
                .lock()
                .unwrap()
                .iter()
                .map(|at| at.duration_since(start).as_secs())
                .collect()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn take_reply(&self, call: &str) -> Result<Cluster> {
            self.replies
                .lock()
                .unwrap()
                .remove(call)
                .unwrap_or_else(|| panic!("no reply scripted for {}", call))
        }
    }

    fn copy(outcome: &Result<Cluster>) -> Result<Cluster> {
        match outcome {
            Ok(cluster) => Ok(cluster.clone()),
            Err(e) => Err(CarinaError::Protocol(e.to_string())),
        }
    }

    #[async_trait::async_trait]
    impl ClusterClient for FakeClusterClient {
        async fn list(&self) -> Result<Vec<Cluster>> {
            self.record("list".to_string());
            Ok(self.clusters.lock().unwrap().clone())
        }

        async fn get(&self, name: &str) -> Result<Cluster> {
            self.record(format!("get {}", name));
            self.fetched_at.lock().unwrap().push(Instant::now());

            let mut gets = self.gets.lock().unwrap();
            match gets.len() {
                0 => Err(CarinaError::api(404, format!("/clusters/jdoe/{}", name), "not found")),
                1 => copy(&gets[0]),
                _ => gets.pop_front().unwrap(),
            }
        }

        async fn create(&self, cluster: &NewCluster) -> Result<Cluster> {
            self.record(format!(
                "create {} {} {}",
                cluster.name, cluster.node_count, cluster.autoscale
            ));
            self.take_reply("create")
        }

        async fn grow(&self, name: &str, nodes: i32) -> Result<Cluster> {
            self.record(format!("grow {} {}", name, nodes));
            self.take_reply("grow")
        }

        async fn rebuild(&self, name: &str) -> Result<Cluster> {
            self.record(format!("rebuild {}", name));
            self.take_reply("rebuild")
        }

        async fn delete(&self, name: &str) -> Result<Cluster> {
            self.record(format!("delete {}", name));
            self.take_reply("delete")
        }

        async fn credentials(&self, name: &str) -> Result<CredentialsBundle> {
            self.record(format!("credentials {}", name));
            self.bundle
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| CarinaError::api(404, "/zip", "no credentials"))
        }
    }

    pub fn cluster(name: &str, status: &str) -> Cluster {
        Cluster {
            name: name.to_string(),
            username: Some("jdoe".to_string()),
            flavor: "container1-4G".to_string(),
            image: None,
            node_count: 1,
            autoscale: false,
            status: ClusterStatus::from(status),
            task_id: None,
        }
    }

    /// Parse `argv` and run the cluster command against `client`.
    pub async fn run(
        client: Arc<FakeClusterClient>,
        format: OutputFormat,
        argv: &[&str],
    ) -> (anyhow::Result<()>, String) {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let buf = SharedBuf::default();

        let result = {
            let mut session = Session::new(
                client,
                ClusterWriter::new(buf.clone(), format),
                WaitPolicy::default(),
            );
            match args.command {
                Commands::Cluster(cmd) => cmd.execute(&mut session).await,
                Commands::Completions(_) => panic!("completions do not run in a session"),
            }
        };

        (result, buf.contents())
    }
}

use test_utils::*;

#[tokio::test(start_paused = true)]
async fn test_create_without_wait_prints_initial_status() {
    let client = Arc::new(FakeClusterClient::new().reply("create", Ok(cluster("foo", "new"))));
    let start = Instant::now();

    let (result, output) =
        run(client.clone(), OutputFormat::Plain, &["carina", "create", "foo"]).await;

    result.unwrap();
    assert_eq!(output, "foo\tcontainer1-4G\t1\tfalse\tnew\n");
    assert_eq!(client.calls(), vec!["create foo 1 false"]);
    assert_eq!(Instant::now().duration_since(start), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_create_with_wait_polls_until_active() {
    let client = Arc::new(
        FakeClusterClient::new()
            .reply("create", Ok(cluster("foo", "new")))
            .then_get(Ok(cluster("foo", "building")))
            .then_get(Ok(cluster("foo", "active"))),
    );
    let start = Instant::now();

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "create", "--wait", "--nodes", "1", "foo"],
    )
    .await;

    result.unwrap();
    assert_eq!(output, "foo\tcontainer1-4G\t1\tfalse\tactive\n");
    assert_eq!(client.calls(), vec!["create foo 1 false", "get foo", "get foo"]);
    assert_eq!(client.fetch_offsets(start), vec![50, 60]);
}

#[tokio::test(start_paused = true)]
async fn test_rebuild_with_wait_stops_on_error_status() {
    let client = Arc::new(
        FakeClusterClient::new()
            .reply("rebuild", Ok(cluster("foo", "rebuilding-swarm")))
            .then_get(Ok(cluster("foo", "rebuilding-swarm")))
            .then_get(Ok(cluster("foo", "error"))),
    );

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "rebuild", "--wait", "foo"],
    )
    .await;

    // A cluster that ends in error is still reported, not failed on
    result.unwrap();
    assert_eq!(output, "foo\tcontainer1-4G\t1\tfalse\terror\n");
    assert_eq!(client.calls(), vec!["rebuild foo", "get foo", "get foo"]);
}

#[tokio::test(start_paused = true)]
async fn test_wait_on_failed_call_returns_error_without_polling() {
    let client = Arc::new(FakeClusterClient::new().reply(
        "rebuild",
        Err(CarinaError::api(409, "/clusters/jdoe/foo/rebuild", "busy")),
    ));
    let start = Instant::now();

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "rebuild", "--wait", "foo"],
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("busy"));
    assert!(output.is_empty());
    assert_eq!(client.calls(), vec!["rebuild foo"]);
    assert_eq!(Instant::now().duration_since(start), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_wait_timeout_gives_up() {
    let client = Arc::new(
        FakeClusterClient::new()
            .reply("create", Ok(cluster("foo", "new")))
            .then_get(Ok(cluster("foo", "building"))),
    );

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "create", "--wait", "--wait-timeout", "45", "foo"],
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("still building"));
    assert!(output.is_empty());
    assert_eq!(client.calls(), vec!["create foo 1 false", "get foo"]);
}

#[tokio::test]
async fn test_create_with_zero_nodes_makes_no_call() {
    let client = Arc::new(FakeClusterClient::new());

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "create", "--nodes", "0", "foo"],
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("nodes must be >= 1"));
    assert!(output.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_list_prints_header_and_rows() {
    let client = Arc::new(
        FakeClusterClient::new()
            .with_clusters(vec![cluster("foo", "active"), cluster("bar", "building")]),
    );

    let (result, output) = run(client.clone(), OutputFormat::Plain, &["carina", "list"]).await;

    result.unwrap();
    assert_eq!(
        output,
        "ClusterName\tFlavor\tNodes\tAutoScale\tStatus\n\
         foo\tcontainer1-4G\t1\tfalse\tactive\n\
         bar\tcontainer1-4G\t1\tfalse\tbuilding\n"
    );
}

#[tokio::test]
async fn test_list_empty_prints_header_only() {
    let client = Arc::new(FakeClusterClient::new());

    let (result, output) = run(client, OutputFormat::Plain, &["carina", "list"]).await;

    result.unwrap();
    assert_eq!(output, "ClusterName\tFlavor\tNodes\tAutoScale\tStatus\n");
}

#[tokio::test]
async fn test_list_as_json() {
    let client = Arc::new(FakeClusterClient::new().with_clusters(vec![cluster("foo", "active")]));

    let (result, output) = run(client, OutputFormat::Json, &["carina", "list"]).await;

    result.unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["cluster_name"], "foo");
}

#[tokio::test]
async fn test_get_missing_cluster_fails() {
    let client = Arc::new(FakeClusterClient::new());

    let (result, output) =
        run(client.clone(), OutputFormat::Plain, &["carina", "get", "nope"]).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("404"));
    assert!(output.is_empty());
    assert_eq!(client.calls(), vec!["get nope"]);
}

#[tokio::test]
async fn test_grow_and_delete_report_returned_cluster() {
    let mut grown = cluster("foo", "building");
    grown.node_count = 3;
    let client = Arc::new(
        FakeClusterClient::new()
            .reply("grow", Ok(grown))
            .reply("delete", Ok(cluster("foo", "deleting"))),
    );

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "grow", "--nodes", "2", "foo"],
    )
    .await;
    result.unwrap();
    assert_eq!(output, "foo\tcontainer1-4G\t3\tfalse\tbuilding\n");

    let (result, output) =
        run(client.clone(), OutputFormat::Plain, &["carina", "delete", "foo"]).await;
    result.unwrap();
    assert_eq!(output, "foo\tcontainer1-4G\t1\tfalse\tdeleting\n");

    assert_eq!(client.calls(), vec!["grow foo 2", "delete foo"]);
}

#[tokio::test]
async fn test_credentials_written_to_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("creds");
    let client = Arc::new(FakeClusterClient::new().with_bundle(&[
        ("ca.pem", "ca"),
        ("docker.env", "export DOCKER_HOST=tcp://1.2.3.4:2376\n"),
    ]));

    let target_arg = target.to_str().unwrap();
    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "credentials", "--path", target_arg, "foo"],
    )
    .await;

    result.unwrap();
    assert_eq!(
        std::fs::read_to_string(target.join("docker.env")).unwrap(),
        "export DOCKER_HOST=tcp://1.2.3.4:2376\n"
    );
    assert_eq!(std::fs::read_to_string(target.join("ca.pem")).unwrap(), "ca");
    assert!(output.contains(&format!("# Credentials written to \"{}\"", target.display())));
    assert!(output.contains("# Run the command above to get your Docker environment"));
    assert_eq!(client.calls(), vec!["credentials foo"]);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(target.join("ca.pem")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test]
async fn test_credentials_download_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("creds");
    let client = Arc::new(FakeClusterClient::new());

    let (result, output) = run(
        client,
        OutputFormat::Plain,
        &["carina", "credentials", "--path", target.to_str().unwrap(), "foo"],
    )
    .await;

    assert!(result.is_err());
    assert!(output.is_empty());
    assert!(!target.exists());
}

#[tokio::test(start_paused = true)]
async fn test_create_already_active_prints_row_without_sleeping() {
    let mut active = cluster("foo", "active");
    active.node_count = 3;
    active.autoscale = true;
    let client = Arc::new(FakeClusterClient::new().reply("create", Ok(active)));
    let start = Instant::now();

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "create", "foo", "--nodes=3", "--autoscale"],
    )
    .await;

    result.unwrap();
    assert_eq!(output, "foo\tcontainer1-4G\t3\ttrue\tactive\n");
    assert_eq!(client.calls(), vec!["create foo 3 true"]);
    assert_eq!(Instant::now().duration_since(start), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_create_with_wait_sleeps_grace_then_one_poll_per_observation() {
    let client = Arc::new(
        FakeClusterClient::new()
            .reply("create", Ok(cluster("foo", "new")))
            .then_get(Ok(cluster("foo", "building")))
            .then_get(Ok(cluster("foo", "building")))
            .then_get(Ok(cluster("foo", "active"))),
    );
    let start = Instant::now();

    let (result, output) =
        run(client.clone(), OutputFormat::Plain, &["carina", "create", "foo", "--wait"]).await;

    result.unwrap();
    assert!(output.ends_with("\tactive\n"));
    assert_eq!(client.fetch_offsets(start), vec![50, 60, 70]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refetch_aborts_wait_without_output() {
    // No scripted gets: every re-fetch answers 404
    let client = Arc::new(FakeClusterClient::new().reply("create", Ok(cluster("foo", "building"))));

    let (result, output) =
        run(client.clone(), OutputFormat::Plain, &["carina", "create", "--wait", "foo"]).await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(output.is_empty());
    assert_eq!(client.calls(), vec!["create foo 1 false", "get foo"]);
}

#[tokio::test]
async fn test_grow_against_failing_backend_prints_nothing() {
    let client = Arc::new(FakeClusterClient::new().reply(
        "grow",
        Err(CarinaError::api(500, "/clusters/jdoe/foo/grow", "internal error")),
    ));

    let (result, output) = run(
        client.clone(),
        OutputFormat::Plain,
        &["carina", "grow", "foo", "--nodes=2"],
    )
    .await;

    assert!(result.unwrap_err().to_string().contains("internal error"));
    assert!(output.is_empty());
    assert_eq!(client.calls(), vec!["grow foo 2"]);
}
