// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::process::ExternalCommand;
use std::path::PathBuf;

/// Host key checking is off because the pod generates fresh host keys on every start
pub const SSH_OPTIONS: [&str; 4] = [
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
];

pub const FORWARD_HOST: &str = "127.0.0.1";

/// SSH endpoint exposed by the port-forward
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SshTarget {
    pub user: String,
    pub port: u16,
    pub identity: Option<PathBuf>,
}

impl SshTarget {
    pub fn command(&self) -> ExternalCommand {
        let mut cmd = ExternalCommand::new("ssh")
            .arg("-p")
            .arg(self.port.to_string())
            .args(SSH_OPTIONS);
        if let Some(identity) = &self.identity {
            cmd = cmd.arg("-i").arg(identity.to_string_lossy());
        }
        cmd.arg(format!("{}@{}", self.user, FORWARD_HOST))
    }
}
