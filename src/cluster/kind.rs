// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kind cluster create, delete and list

use crate::constants::PROVIDER_ENV;
use crate::error::Result;
use crate::process::{run_checked, CommandRunner, ExternalCommand};
use crate::types::ClusterName;
use tracing::{info, instrument};

/// Result of a create request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Wraps the `kind` binary with the container provider selected
pub struct KindCluster<R> {
    runner: R,
    provider: String,
}

impl<R: CommandRunner> KindCluster<R> {
    pub fn new(runner: R, provider: impl Into<String>) -> Self {
        Self {
            runner,
            provider: provider.into(),
        }
    }

    fn kind<const N: usize>(&self, args: [&str; N]) -> ExternalCommand {
        ExternalCommand::new("kind")
            .args(args)
            .env(PROVIDER_ENV, &self.provider)
    }

    /// Names of all Kind clusters known to the provider
    #[instrument(skip(self))]
    pub async fn list_clusters(&self) -> Result<Vec<String>> {
        let output = run_checked(&self.runner, &self.kind(["get", "clusters"])).await?;
        Ok(parse_cluster_list(&output.stdout))
    }

    pub async fn exists(&self, name: &ClusterName) -> Result<bool> {
        Ok(self
            .list_clusters()
            .await?
            .iter()
            .any(|c| c == name.as_str()))
    }

    /// Create the cluster unless one with the same name already exists
    #[instrument(skip(self), fields(cluster = %name))]
    pub async fn create_cluster(&self, name: &ClusterName) -> Result<CreateOutcome> {
        if self.exists(name).await? {
            info!("Kind cluster {} already exists", name);
            return Ok(CreateOutcome::AlreadyExists);
        }

        info!(
            "Creating Kind cluster {} with provider {}",
            name, self.provider
        );
        run_checked(
            &self.runner,
            &self.kind(["create", "cluster", "--name", name.as_str()]),
        )
        .await?;
        info!("Kind cluster {} created", name);
        Ok(CreateOutcome::Created)
    }

    #[instrument(skip(self), fields(cluster = %name))]
    pub async fn delete_cluster(&self, name: &ClusterName) -> Result<()> {
        info!("Deleting Kind cluster {}", name);
        run_checked(
            &self.runner,
            &self.kind(["delete", "cluster", "--name", name.as_str()]),
        )
        .await?;
        Ok(())
    }
}

/// `kind get clusters` prints one name per line and reports an empty list on stderr
fn parse_cluster_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UbikindError;
    use crate::test_utils::FakeRunner;

    fn cluster(name: &str) -> ClusterName {
        ClusterName::new(name).unwrap()
    }

    #[test]
    fn test_parse_cluster_list() {
        assert_eq!(parse_cluster_list("kind\nubi-lab\n"), vec!["kind", "ubi-lab"]);
        assert_eq!(parse_cluster_list("  ubi-lab  \n\n"), vec!["ubi-lab"]);
        assert!(parse_cluster_list("").is_empty());
    }

    #[tokio::test]
    async fn test_every_kind_call_sets_provider() {
        let runner = FakeRunner::new();
        let kind = KindCluster::new(&runner, "podman");

        kind.create_cluster(&cluster("ubi-lab")).await.unwrap();
        kind.delete_cluster(&cluster("ubi-lab")).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        for call in &calls {
            assert_eq!(call.program, "kind");
            assert_eq!(call.env_value(PROVIDER_ENV), Some("podman"));
        }
    }

    #[tokio::test]
    async fn test_create_cluster() {
        let runner = FakeRunner::new().on(
            "kind get clusters",
            0,
            "",
            "No kind clusters found.\n",
        );
        let kind = KindCluster::new(&runner, "podman");

        let outcome = kind.create_cluster(&cluster("ubi-lab")).await.unwrap();

        assert_eq!(outcome, CreateOutcome::Created);
        assert_eq!(
            runner.command_lines(),
            vec!["kind get clusters", "kind create cluster --name ubi-lab"]
        );
    }

    #[tokio::test]
    async fn test_create_existing_cluster_is_skipped() {
        let runner = FakeRunner::new().on("kind get clusters", 0, "kind\nubi-lab\n", "");
        let kind = KindCluster::new(&runner, "podman");

        let outcome = kind.create_cluster(&cluster("ubi-lab")).await.unwrap();

        assert_eq!(outcome, CreateOutcome::AlreadyExists);
        assert_eq!(runner.command_lines(), vec!["kind get clusters"]);
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_stderr() {
        let stderr = "ERROR: failed to create cluster: running kind with rootless provider requires cgroup v2\n";
        let runner = FakeRunner::new().on("kind create cluster", 1, "", stderr);
        let kind = KindCluster::new(&runner, "podman");

        let err = kind.create_cluster(&cluster("ubi-lab")).await.unwrap_err();

        match err {
            UbikindError::CommandFailed {
                command,
                exit_code,
                stderr: reported,
            } => {
                assert_eq!(command, "kind create cluster --name ubi-lab");
                assert_eq!(exit_code, Some(1));
                assert_eq!(reported, stderr);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
