// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, env as keys};
use crate::types::{validate_port, ClusterName, PodName};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Tool configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub cluster_name: ClusterName,
    pub pod_name: PodName,
    pub namespace: String,
    pub image: String,
    /// Local end of the port-forward
    pub local_port: u16,
    /// Port sshd listens on inside the pod
    pub remote_port: u16,
    pub ready_timeout: Duration,
    /// Value exported as KIND_EXPERIMENTAL_PROVIDER for kind invocations
    pub provider: String,
    pub ssh_user: String,
    /// Private key used for ssh; `<key>.pub` is installed in the pod
    pub ssh_key: Option<PathBuf>,
    pub machine_cpus: u32,
    pub machine_memory_mib: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cluster_name = ClusterName::new(string(keys::CLUSTER_NAME, defaults::CLUSTER_NAME))
            .with_context(|| format!("{} is invalid", keys::CLUSTER_NAME))?;
        let pod_name = PodName::new(string(keys::POD_NAME, defaults::POD_NAME))
            .with_context(|| format!("{} is invalid", keys::POD_NAME))?;

        let local_port = parse_or(&lookup, keys::LOCAL_PORT, u32::from(defaults::LOCAL_PORT))?;
        let local_port = validate_port(local_port)
            .with_context(|| format!("{} is invalid", keys::LOCAL_PORT))?;
        let remote_port = parse_or(&lookup, keys::REMOTE_PORT, u32::from(defaults::REMOTE_PORT))?;
        let remote_port = validate_port(remote_port)
            .with_context(|| format!("{} is invalid", keys::REMOTE_PORT))?;

        let ready_timeout = Duration::from_secs(parse_or(
            &lookup,
            keys::READY_TIMEOUT_SECS,
            defaults::READY_TIMEOUT_SECS,
        )?);

        Ok(Config {
            cluster_name,
            pod_name,
            namespace: string(keys::NAMESPACE, defaults::NAMESPACE),
            image: string(keys::IMAGE, defaults::IMAGE),
            local_port,
            remote_port,
            ready_timeout,
            provider: string(keys::PROVIDER, defaults::PROVIDER),
            ssh_user: string(keys::SSH_USER, defaults::SSH_USER),
            ssh_key: lookup(keys::SSH_KEY)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            machine_cpus: parse_or(&lookup, keys::MACHINE_CPUS, defaults::MACHINE_CPUS)?,
            machine_memory_mib: parse_or(
                &lookup,
                keys::MACHINE_MEMORY_MIB,
                defaults::MACHINE_MEMORY_MIB,
            )?,
        })
    }

    /// Public key to install for `ssh_user`, read from `<ssh_key>.pub`
    pub fn authorized_key(&self) -> Result<Option<String>> {
        let Some(key) = &self.ssh_key else {
            return Ok(None);
        };

        let mut public = key.clone().into_os_string();
        public.push(".pub");
        let public = PathBuf::from(public);

        let contents = std::fs::read_to_string(&public)
            .with_context(|| format!("Failed to read public key {}", public.display()))?;
        Ok(Some(contents.trim().to_string()))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
