// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Podman machine and Kind cluster lifecycle, driven through their CLIs.

pub mod kind;
pub mod machine;

pub use kind::{CreateOutcome, KindCluster};
pub use machine::{MachineInfo, MachineResources, PodmanMachine};
