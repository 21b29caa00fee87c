// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Invocation of external binaries (podman, kind, kubectl, ssh, pkill).

pub mod command;
pub mod runner;

pub use command::{CommandOutput, ExternalCommand};
pub use runner::{run_checked, CommandRunner, SystemRunner};
