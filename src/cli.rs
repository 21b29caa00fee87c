// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definitions.

use crate::config::Config;
use crate::types::{ClusterName, PodName};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::time::Duration;

/// ubikind - Kind on Podman with a UBI pod reachable over SSH or exec.
#[derive(Parser, Debug)]
#[command(name = "ubikind")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags that take precedence over the UBIKIND_* environment
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Kind cluster name
    #[arg(long, global = true, value_parser = parse_cluster_name)]
    pub cluster_name: Option<ClusterName>,

    /// Pod name
    #[arg(long, global = true, value_parser = parse_pod_name)]
    pub pod_name: Option<PodName>,

    /// Namespace the pod is deployed into
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    /// Local port for the port-forward
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..))]
    pub local_port: Option<u16>,

    /// Pod readiness timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(cluster_name) = self.cluster_name {
            config.cluster_name = cluster_name;
        }
        if let Some(pod_name) = self.pod_name {
            config.pod_name = pod_name;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(local_port) = self.local_port {
            config.local_port = local_port;
        }
        if let Some(timeout) = self.timeout {
            config.ready_timeout = Duration::from_secs(timeout);
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the machine, create the cluster, deploy the pod and forward its SSH port
    Up {
        /// Assume the podman machine is already running (or not needed)
        #[arg(long)]
        skip_machine: bool,
    },

    /// Stop the port-forward and delete the pod
    Down {
        /// Delete the whole Kind cluster instead of only the pod
        #[arg(long)]
        cluster: bool,
    },

    /// Manage the podman machine
    #[command(subcommand)]
    Machine(MachineCommand),

    /// Manage the Kind cluster
    #[command(subcommand)]
    Cluster(ClusterCommand),

    /// Manage the UBI pod
    #[command(subcommand)]
    Pod(PodCommand),

    /// Manage the background port-forward
    #[command(subcommand)]
    Forward(ForwardCommand),

    /// Open a shell (or run a command) in the pod with kubectl exec
    Exec {
        /// Command to run instead of /bin/bash
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// SSH into the pod through the port-forward
    Ssh {
        /// Print the ssh command instead of running it
        #[arg(long)]
        print: bool,
    },

    /// Print an Ansible inventory for the forwarded pod
    Inventory,

    /// Print the rendered pod manifest
    Manifest,

    /// Check that the required external tools are installed
    Doctor,
}

/// Subcommands for `ubikind machine`
#[derive(Subcommand, Debug)]
pub enum MachineCommand {
    /// Create the podman machine
    Init {
        /// Run containers as root inside the machine (needed by Kind)
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        rootful: bool,
    },
    /// Start the podman machine if it is not running
    Start,
    /// List podman machines
    Status,
}

/// Subcommands for `ubikind cluster`
#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// Create the Kind cluster
    Create,
    /// Delete the Kind cluster
    Delete,
    /// List Kind clusters
    List,
}

/// Subcommands for `ubikind pod`
#[derive(Subcommand, Debug)]
pub enum PodCommand {
    /// Apply the pod manifest
    Apply,
    /// Wait for the pod to become ready
    Wait,
    /// Delete the pod
    Delete,
    /// Show pod phase and readiness
    Status,
}

/// Subcommands for `ubikind forward`
#[derive(Subcommand, Debug)]
pub enum ForwardCommand {
    /// Start (or restart) the port-forward
    Start,
    /// Stop the port-forward
    Stop,
}

fn parse_cluster_name(value: &str) -> Result<ClusterName, String> {
    ClusterName::new(value).map_err(|e| e.to_string())
}

fn parse_pod_name(value: &str) -> Result<PodName, String> {
    PodName::new(value).map_err(|e| e.to_string())
}
