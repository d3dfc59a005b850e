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

//! Cluster credential bundles and how they land on disk

use crate::infrastructure::constants::{
    CREDENTIAL_DIR_MODE, CREDENTIAL_FILE_MODE, DOCKER_ENV_FILE, DOCKER_FISH_FILE,
    DOCKER_PS1_FILE,
};
use crate::shared::error::{CarinaError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Certificates and environment scripts needed to talk to a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsBundle {
    pub files: BTreeMap<String, Vec<u8>>,
}

/// What ended up on disk, for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialsSummary {
    pub path: String,
    pub files: Vec<String>,
}

/// Destination directory: the explicit path if given, the cluster name otherwise.
pub fn resolve_destination(path: Option<&Path>, cluster_name: &str) -> PathBuf {
    match path {
        Some(p) if !p.as_os_str().is_empty() => clean_path(p),
        _ => clean_path(Path::new(cluster_name)),
    }
}

/// Lexically normalise a path: drop `.` components and fold `..` where possible.
/// An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}

/// Write every file of the bundle into `dir`, creating it first if needed.
///
/// Files are written one by one; a failure leaves the earlier ones in place.
pub fn write_bundle(bundle: &CredentialsBundle, dir: &Path) -> Result<CredentialsSummary> {
    if dir != Path::new(".") {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(CREDENTIAL_DIR_MODE);
        }
        builder.create(dir)?;
    }

    let mut written = Vec::with_capacity(bundle.files.len());
    for (name, contents) in &bundle.files {
        let target = dir.join(checked_file_name(name)?);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(CREDENTIAL_FILE_MODE);
        }

        let mut file = options.open(&target)?;
        // The creation mode does not apply to a file left by an earlier download
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(CREDENTIAL_FILE_MODE))?;
        }
        file.write_all(contents)?;
        debug!("Wrote {}", target.display());
        written.push(name.clone());
    }

    Ok(CredentialsSummary {
        path: dir.display().to_string(),
        files: written,
    })
}

fn checked_file_name(name: &str) -> Result<&Path> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(CarinaError::Protocol(format!(
            "refusing to write credential file with unsafe name '{}'",
            name
        ))),
    }
}

/// Shell-specific instructions for loading the downloaded environment.
pub fn source_hint(dir: &Path, shell: Option<&str>) -> String {
    let shell_name = shell
        .map(|s| {
            Path::new(s)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(s)
                .to_ascii_lowercase()
        })
        .unwrap_or_default();

    let (command, env_file) = if shell_name.starts_with("fish") {
        ("source", DOCKER_FISH_FILE)
    } else if shell_name.starts_with("pwsh") || shell_name.starts_with("powershell") {
        (".", DOCKER_PS1_FILE)
    } else {
        ("source", DOCKER_ENV_FILE)
    };

    format!(
        "#\n# Credentials written to \"{dir}\"\n#\n{command} \"{file}\"\n\
         # Run the command above to get your Docker environment variables set\n",
        dir = dir.display(),
        command = command,
        file = dir.join(env_file).display(),
    )
}
