// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "ubikind";

/// Environment variable selecting Kind's container provider backend
pub const PROVIDER_ENV: &str = "KIND_EXPERIMENTAL_PROVIDER";

/// Kind names the kubeconfig context of a cluster `<prefix><cluster name>`
pub const KIND_CONTEXT_PREFIX: &str = "kind-";

/// Environment variable keys read by `Config::from_env`
pub mod env {
    pub const CLUSTER_NAME: &str = "UBIKIND_CLUSTER_NAME";
    pub const POD_NAME: &str = "UBIKIND_POD_NAME";
    pub const NAMESPACE: &str = "UBIKIND_NAMESPACE";
    pub const IMAGE: &str = "UBIKIND_IMAGE";
    pub const LOCAL_PORT: &str = "UBIKIND_LOCAL_PORT";
    pub const REMOTE_PORT: &str = "UBIKIND_REMOTE_PORT";
    pub const READY_TIMEOUT_SECS: &str = "UBIKIND_READY_TIMEOUT_SECS";
    pub const PROVIDER: &str = "UBIKIND_PROVIDER";
    pub const SSH_USER: &str = "UBIKIND_SSH_USER";
    pub const SSH_KEY: &str = "UBIKIND_SSH_KEY";
    pub const MACHINE_CPUS: &str = "UBIKIND_MACHINE_CPUS";
    pub const MACHINE_MEMORY_MIB: &str = "UBIKIND_MACHINE_MEMORY_MIB";
}

/// Defaults used when the matching environment variable is unset
pub mod defaults {
    pub const CLUSTER_NAME: &str = "ubi-lab";
    pub const POD_NAME: &str = "ubi-pod";
    pub const NAMESPACE: &str = "default";
    pub const IMAGE: &str = "registry.access.redhat.com/ubi9/ubi:latest";
    pub const LOCAL_PORT: u16 = 2222;
    pub const REMOTE_PORT: u16 = 22;
    pub const READY_TIMEOUT_SECS: u64 = 300;
    pub const PROVIDER: &str = "podman";
    pub const SSH_USER: &str = "root";
    pub const MACHINE_CPUS: u32 = 4;
    pub const MACHINE_MEMORY_MIB: u32 = 8192;
}

/// Pod readiness polling
pub mod readiness {
    /// Interval between pod status polls in milliseconds
    pub const POLL_INTERVAL_MILLIS: u64 = 2000;
}

/// Port-forward supervision
pub mod forward {
    /// How long to wait for a spawned port-forward to accept connections
    pub const SETTLE_TIMEOUT_MILLIS: u64 = 10_000;
    /// Interval between local port probes
    pub const PROBE_INTERVAL_MILLIS: u64 = 100;
}
