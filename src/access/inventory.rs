// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ansible YAML inventory for the forwarded pod

use super::ssh::{SshTarget, FORWARD_HOST, SSH_OPTIONS};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inventory group holding the pod
pub const INVENTORY_GROUP: &str = "ubikind";

#[derive(Serialize)]
struct Inventory {
    all: AllGroup,
}

#[derive(Serialize)]
struct AllGroup {
    children: BTreeMap<String, Group>,
}

#[derive(Serialize)]
struct Group {
    hosts: BTreeMap<String, HostVars>,
}

#[derive(Serialize)]
struct HostVars {
    ansible_host: String,
    ansible_port: u16,
    ansible_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ansible_ssh_private_key_file: Option<String>,
    ansible_ssh_common_args: String,
}

/// Render an inventory with the pod as the only host of group `ubikind`
pub fn ansible_inventory(host_name: &str, target: &SshTarget) -> Result<String> {
    let vars = HostVars {
        ansible_host: FORWARD_HOST.to_string(),
        ansible_port: target.port,
        ansible_user: target.user.clone(),
        ansible_ssh_private_key_file: target
            .identity
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
        ansible_ssh_common_args: SSH_OPTIONS.join(" "),
    };

    let inventory = Inventory {
        all: AllGroup {
            children: BTreeMap::from([(
                INVENTORY_GROUP.to_string(),
                Group {
                    hosts: BTreeMap::from([(host_name.to_string(), vars)]),
                },
            )]),
        },
    };

    Ok(serde_yaml::to_string(&inventory)?)
}
