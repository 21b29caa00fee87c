// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequences the full workflow: podman machine, Kind cluster, UBI pod, port-forward.

use crate::access::SshTarget;
use crate::cluster::{KindCluster, PodmanMachine};
use crate::config::Config;
use crate::constants::readiness::POLL_INTERVAL_MILLIS;
use crate::error::Result;
use crate::forward::{ForwardTarget, PortForwarder};
use crate::kubernetes::{
    apply_pod, client_for_cluster, delete_pod, ensure_namespace_exists, render_pod,
    wait_for_pod_ready, ManifestSettings,
};
use crate::process::{CommandRunner, ExternalCommand};
use k8s_openapi::api::core::v1::Pod;
use kube::Client;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Result of probing one external tool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCheck {
    pub tool: &'static str,
    pub ok: bool,
    /// First line of the version output, or the failure
    pub detail: String,
}

/// Outcome of `up`
#[derive(Clone, Debug)]
pub struct UpSummary {
    pub forward_pid: u32,
    pub ssh: SshTarget,
}

pub struct Orchestrator<R> {
    runner: R,
    config: Config,
    /// Used instead of loading the kubeconfig when set
    client: Option<Client>,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, config: Config) -> Self {
        Self {
            runner,
            config,
            client: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn machine(&self) -> PodmanMachine<&R> {
        PodmanMachine::new(&self.runner)
    }

    pub fn kind(&self) -> KindCluster<&R> {
        KindCluster::new(&self.runner, self.config.provider.clone())
    }

    pub fn forwarder(&self) -> PortForwarder<&R> {
        PortForwarder::new(&self.runner)
    }

    pub fn forward_target(&self) -> ForwardTarget {
        ForwardTarget {
            context: self.config.cluster_name.kube_context(),
            namespace: self.config.namespace.clone(),
            pod: self.config.pod_name.to_string(),
            local_port: self.config.local_port,
            remote_port: self.config.remote_port,
        }
    }

    pub fn ssh_target(&self) -> SshTarget {
        SshTarget {
            user: self.config.ssh_user.clone(),
            port: self.config.local_port,
            identity: self.config.ssh_key.clone(),
        }
    }

    pub fn manifest_settings(&self) -> anyhow::Result<ManifestSettings> {
        Ok(ManifestSettings::from_config(
            &self.config,
            self.config.authorized_key()?,
        ))
    }

    pub async fn client(&self) -> Result<Client> {
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => client_for_cluster(&self.config.cluster_name).await,
        }
    }

    /// Create the namespace if needed and apply the rendered pod
    #[instrument(skip(self, client, settings), fields(pod = %settings.name))]
    pub async fn apply(&self, client: &Client, settings: &ManifestSettings) -> Result<Pod> {
        let pod = render_pod(settings)?;
        ensure_namespace_exists(client, &self.config.namespace).await?;
        apply_pod(client, &self.config.namespace, &pod).await
    }

    /// Apply the pod and wait until it reports ready
    #[instrument(skip(self, client, settings), fields(pod = %settings.name))]
    pub async fn deploy_pod(&self, client: &Client, settings: &ManifestSettings) -> Result<()> {
        self.apply(client, settings).await?;

        info!(
            "Waiting up to {:?} for pod {} to become ready",
            self.config.ready_timeout, settings.name
        );
        wait_for_pod_ready(
            client,
            &self.config.namespace,
            self.config.pod_name.as_str(),
            self.config.ready_timeout,
            Duration::from_millis(POLL_INTERVAL_MILLIS),
        )
        .await?;
        Ok(())
    }

    /// Machine, cluster, pod, forward
    #[instrument(skip(self))]
    pub async fn up(&self, skip_machine: bool) -> anyhow::Result<UpSummary> {
        if skip_machine {
            info!("Skipping podman machine start");
        } else {
            self.machine().start().await?;
        }

        self.kind().create_cluster(&self.config.cluster_name).await?;

        let client = self.client().await?;
        let settings = self.manifest_settings()?;
        self.deploy_pod(&client, &settings).await?;

        let forward_pid = self.forwarder().start(&self.forward_target()).await?;

        Ok(UpSummary {
            forward_pid,
            ssh: self.ssh_target(),
        })
    }

    /// Stop the forward and delete the pod, and the cluster too when asked
    #[instrument(skip(self))]
    pub async fn down(&self, delete_cluster: bool) -> Result<()> {
        self.forwarder().stop(&self.forward_target()).await?;

        if delete_cluster {
            // Deleting the cluster takes the pod with it
            return self.kind().delete_cluster(&self.config.cluster_name).await;
        }

        let client = self.client().await?;
        delete_pod(
            &client,
            &self.config.namespace,
            self.config.pod_name.as_str(),
        )
        .await?;
        Ok(())
    }

    /// Check every external tool the workflow needs
    pub async fn doctor(&self) -> Vec<ToolCheck> {
        // procps and BSD pkill share no version flag; signal 0 to nothing exits 1
        let tools: [(&'static str, &[&str], &[i32]); 5] = [
            ("podman", &["--version"], &[0]),
            ("kind", &["version"], &[0]),
            ("kubectl", &["version", "--client"], &[0]),
            ("ssh", &["-V"], &[0]),
            ("pkill", &["-0", "-f", "^ubikind-doctor-no-such-process$"], &[0, 1]),
        ];

        let mut checks = Vec::with_capacity(tools.len());
        for (tool, args, accepted) in tools {
            let cmd = ExternalCommand::new(tool).args(args.iter().copied());
            let check = match self.runner.output(&cmd).await {
                Ok(output) if output.exit_code.is_some_and(|code| accepted.contains(&code)) => {
                    ToolCheck {
                        tool,
                        ok: true,
                        // ssh -V prints its version on stderr
                        detail: first_line(&output.stdout)
                            .or_else(|| first_line(&output.stderr))
                            .unwrap_or_else(|| "available".to_string()),
                    }
                }
                Ok(output) => ToolCheck {
                    tool,
                    ok: false,
                    detail: first_line(&output.stderr)
                        .unwrap_or_else(|| format!("exited with {:?}", output.exit_code)),
                },
                Err(e) => ToolCheck {
                    tool,
                    ok: false,
                    detail: e.to_string(),
                },
            };
            if !check.ok {
                warn!("{} check failed: {}", tool, check.detail);
            }
            checks.push(check);
        }
        checks
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
