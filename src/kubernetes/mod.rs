// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, manifest rendering, pod lifecycle and namespace management.

pub mod client;
pub mod manifest;
pub mod namespaces;
pub mod pod;

pub use client::client_for_cluster;
pub use manifest::{render_pod, render_pod_yaml, ManifestSettings};
pub use namespaces::ensure_namespace_exists;
pub use pod::{apply_pod, delete_pod, pod_status, wait_for_pod_ready, PodSummary};
