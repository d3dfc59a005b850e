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

use super::model::NewCluster;
use crate::shared::error::CarinaError;

/// Checks run locally, before anything is sent to the backend
pub struct ClusterValidator;

impl ClusterValidator {
    pub fn validate_new_cluster(cluster: &NewCluster) -> Result<(), CarinaError> {
        Self::validate_cluster_name(&cluster.name)?;

        if cluster.node_count < 1 {
            return Err(CarinaError::validation("nodes must be >= 1"));
        }

        Ok(())
    }

    pub fn validate_cluster_name(name: &str) -> Result<(), CarinaError> {
        if name.trim().is_empty() {
            return Err(CarinaError::validation("cluster name must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_new_cluster() {
        assert!(ClusterValidator::validate_new_cluster(&NewCluster::new("foo", 1, false)).is_ok());
        assert!(ClusterValidator::validate_new_cluster(&NewCluster::new("foo", 10, true)).is_ok());
    }

    #[test]
    fn test_zero_nodes_rejected() {
        let err = ClusterValidator::validate_new_cluster(&NewCluster::new("foo", 0, false))
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: nodes must be >= 1");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(
            ClusterValidator::validate_cluster_name("  "),
            Err(CarinaError::Validation(_))
        ));
    }
}
