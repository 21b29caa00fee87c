// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Validated names used across cluster and pod operations.

pub mod names;

pub use names::{validate_port, ClusterName, PodName};
