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

use crate::domain::cluster::{Cluster, NewCluster};
use crate::domain::config::ConnectionSettings;
use crate::domain::credentials::CredentialsBundle;
use crate::infrastructure::constants::{
    HEADER_AUTH_TOKEN, PATH_CLUSTERS, PATH_GROW, PATH_REBUILD, PATH_TOKENS, PATH_ZIP,
};
use crate::shared::error::CarinaError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;

#[async_trait::async_trait]
pub trait ClusterClient: Send + Sync {
    async fn list(&self) -> Result<Vec<Cluster>, CarinaError>;

    async fn get(&self, name: &str) -> Result<Cluster, CarinaError>;

    async fn create(&self, cluster: &NewCluster) -> Result<Cluster, CarinaError>;

    async fn grow(&self, name: &str, nodes: i32) -> Result<Cluster, CarinaError>;

    async fn rebuild(&self, name: &str) -> Result<Cluster, CarinaError>;

    async fn delete(&self, name: &str) -> Result<Cluster, CarinaError>;

    async fn credentials(&self, name: &str) -> Result<CredentialsBundle, CarinaError>;
}

#[derive(Serialize)]
struct UserAuth<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct GrowRequest {
    nodes: i32,
}

#[derive(Deserialize)]
struct ZipUrl {
    zip_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// HTTP client for the Carina cluster API
pub struct CarinaClient {
    http: reqwest::Client,
    endpoint: Url,
    username: String,
    token: HeaderValue,
}

impl CarinaClient {
    /// Exchange username and API key for a token and build a client that sends it.
    pub async fn authenticate(settings: &ConnectionSettings) -> Result<Self, CarinaError> {
        let endpoint = Url::parse(&settings.endpoint).map_err(|e| {
            CarinaError::config_error(format!("Invalid endpoint '{}': {}", settings.endpoint, e))
        })?;

        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let anonymous = reqwest::Client::builder()
            .user_agent(user_agent.as_str())
            .build()?;

        let tokens_url = join_path(&endpoint, &[PATH_TOKENS])?;
        debug!("Authenticating {} against {}", settings.username, tokens_url);

        let resp = anonymous
            .post(tokens_url)
            .json(&UserAuth {
                username: &settings.username,
                password: &settings.api_key,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CarinaError::Authentication(format!(
                "{} {}",
                status,
                error_message(&body)
            )));
        }

        let mut token = resp
            .headers()
            .get(HEADER_AUTH_TOKEN)
            .cloned()
            .ok_or_else(|| {
                CarinaError::Authentication(format!(
                    "response did not include an {} header",
                    HEADER_AUTH_TOKEN
                ))
            })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            endpoint,
            username: settings.username.clone(),
            token,
        })
    }

    fn cluster_url(&self, segments: &[&str]) -> Result<Url, CarinaError> {
        let mut path = vec![PATH_CLUSTERS, self.username.as_str()];
        path.extend_from_slice(segments);
        join_path(&self.endpoint, &path)
    }

    /// The token is only sent to the API's own origin.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let same_origin = url.origin() == self.endpoint.origin();
        let req = self.http.request(method, url);
        if same_origin {
            req.header(HEADER_AUTH_TOKEN, self.token.clone())
        } else {
            req
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, CarinaError> {
        let resp = check(req.send().await?).await?;
        let url = resp.url().to_string();
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            CarinaError::Protocol(format!("could not decode response from {}: {}", url, e))
        })
    }
}

#[async_trait::async_trait]
impl ClusterClient for CarinaClient {
    async fn list(&self) -> Result<Vec<Cluster>, CarinaError> {
        let url = self.cluster_url(&[])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn get(&self, name: &str) -> Result<Cluster, CarinaError> {
        let url = self.cluster_url(&[name])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    async fn create(&self, cluster: &NewCluster) -> Result<Cluster, CarinaError> {
        let url = self.cluster_url(&[])?;
        self.send_json(self.request(Method::POST, url).json(cluster))
            .await
    }

    async fn grow(&self, name: &str, nodes: i32) -> Result<Cluster, CarinaError> {
        let url = self.cluster_url(&[name, PATH_GROW])?;
        self.send_json(self.request(Method::POST, url).json(&GrowRequest { nodes }))
            .await
    }

    async fn rebuild(&self, name: &str) -> Result<Cluster, CarinaError> {
        let url = self.cluster_url(&[name, PATH_REBUILD])?;
        self.send_json(self.request(Method::POST, url)).await
    }

    async fn delete(&self, name: &str) -> Result<Cluster, CarinaError> {
        let url = self.cluster_url(&[name])?;
        self.send_json(self.request(Method::DELETE, url)).await
    }

    async fn credentials(&self, name: &str) -> Result<CredentialsBundle, CarinaError> {
        let url = self.cluster_url(&[name, PATH_ZIP])?;
        let location: ZipUrl = self.send_json(self.request(Method::GET, url)).await?;

        let zip_url = Url::parse(&location.zip_url).map_err(|e| {
            CarinaError::Protocol(format!("invalid zip_url '{}': {}", location.zip_url, e))
        })?;
        let resp = check(self.request(Method::GET, zip_url).send().await?).await?;
        let archive = resp.bytes().await?;

        unpack_credentials(&archive)
    }
}

fn join_path(base: &Url, segments: &[&str]) -> Result<Url, CarinaError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            CarinaError::config_error(format!("Endpoint '{}' cannot be a base URL", base))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn check(resp: Response) -> Result<Response, CarinaError> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status().as_u16();
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    debug!("Response from {} ({}): {}", url, status, body);

    Err(CarinaError::api(status, url, error_message(&body)))
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Unpack a credentials zip, keying every file by its base name.
pub(crate) fn unpack_credentials(archive: &[u8]) -> Result<CredentialsBundle, CarinaError> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut bundle = CredentialsBundle::default();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let Some(name) = Path::new(entry.name())
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
        else {
            continue;
        };

        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        bundle.files.insert(name, contents);
    }

    Ok(bundle)
}
