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
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CarinaError>;

#[derive(Error, Debug)]
pub enum CarinaError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Carina API error ({status}) at '{url}': {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from Carina API: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cluster '{cluster}' still {status} after waiting {waited:?}")]
    Timeout {
        cluster: String,
        status: String,
        waited: Duration,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for CarinaError {
    fn from(err: zip::result::ZipError) -> Self {
        CarinaError::Protocol(format!("invalid credentials archive: {}", err))
    }
}

impl CarinaError {
    pub fn validation(context: impl Into<String>) -> Self {
        Self::Validation(context.into())
    }

    pub fn config_error(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn api(status: u16, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            url: url.into(),
            message: message.into(),
        }
    }
}
