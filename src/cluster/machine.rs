// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Podman machine (the VM hosting the container engine on macOS)

use crate::error::Result;
use crate::process::{run_checked, CommandRunner, ExternalCommand};
use serde::Deserialize;
use tracing::{info, instrument};

/// One entry of `podman machine list --format json`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MachineInfo {
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub starting: bool,
}

/// Machine sizing for `podman machine init`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MachineResources {
    pub cpus: u32,
    pub memory_mib: u32,
    pub rootful: bool,
}

pub struct PodmanMachine<R> {
    runner: R,
}

impl<R: CommandRunner> PodmanMachine<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn podman<const N: usize>(args: [&str; N]) -> ExternalCommand {
        ExternalCommand::new("podman").arg("machine").args(args)
    }

    /// All machines podman knows about
    #[instrument(skip(self))]
    pub async fn status(&self) -> Result<Vec<MachineInfo>> {
        let output = run_checked(&self.runner, &Self::podman(["list", "--format", "json"])).await?;
        parse_machine_list(&output.stdout)
    }

    #[instrument(skip(self))]
    pub async fn init(&self, resources: MachineResources) -> Result<()> {
        let mut cmd = Self::podman(["init"])
            .arg("--cpus")
            .arg(resources.cpus.to_string())
            .arg("--memory")
            .arg(resources.memory_mib.to_string());
        if resources.rootful {
            cmd = cmd.arg("--rootful");
        }

        info!("Initializing podman machine");
        run_checked(&self.runner, &cmd).await?;
        Ok(())
    }

    /// Start the default machine unless one is already running; returns whether it was started
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<bool> {
        let machines = self.status().await?;
        if let Some(running) = machines.iter().find(|m| m.running) {
            info!("Podman machine {} is already running", running.name);
            return Ok(false);
        }

        info!("Starting podman machine");
        run_checked(&self.runner, &Self::podman(["start"])).await?;
        Ok(true)
    }
}

/// Podman prints `null` rather than `[]` on some versions when no machine exists
fn parse_machine_list(stdout: &str) -> Result<Vec<MachineInfo>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let machines: Option<Vec<MachineInfo>> = serde_json::from_str(trimmed)?;
    Ok(machines.unwrap_or_default())
}
