// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ways into the running pod: `kubectl exec`, ssh over the port-forward, and an
//! Ansible inventory pointing at that forward.

pub mod exec;
pub mod inventory;
pub mod ssh;

pub use exec::{exec_command, DEFAULT_SHELL};
pub use inventory::ansible_inventory;
pub use ssh::SshTarget;
