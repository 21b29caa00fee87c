// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UbikindError {
    #[error("Invalid cluster name '{0}': must be non-empty and match ^[a-z0-9.-]+$")]
    InvalidClusterName(String),

    #[error("Invalid pod name '{0}': must be a lowercase DNS-1123 subdomain")]
    InvalidPodName(String),

    #[error("Invalid port {0}: must be between 1 and 65535")]
    InvalidPort(u32),

    #[error("Failed to run '{program}' (is it installed and in PATH?): {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}:\n{stderr}", describe_exit(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Manifest for pod '{name}' rejected by the API server: {message}")]
    ManifestRejected { name: String, message: String },

    #[error("Invalid pod manifest template: {0}")]
    ManifestTemplate(String),

    #[error("Pod '{name}' not ready after {timeout:?}")]
    ReadinessTimeout { name: String, timeout: Duration },

    #[error("Pod '{name}' terminated in phase {phase}")]
    PodTerminated { name: String, phase: String },

    #[error("Local port {0} is already in use")]
    PortInUse(u16),

    #[error("Port-forward to local port {port} did not come up: {reason}")]
    PortForwardFailed { port: u16, reason: String },

    #[error("Failed to create namespace '{name}': {source}")]
    Namespace {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, UbikindError>;
