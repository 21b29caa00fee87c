// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::process::ExternalCommand;

pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Interactive `kubectl exec` into the pod's first container
pub fn exec_command(context: &str, namespace: &str, pod: &str, command: &[String]) -> ExternalCommand {
    let cmd = ExternalCommand::new("kubectl").args([
        "--context", context, "-n", namespace, "exec", "-it", pod, "--",
    ]);

    if command.is_empty() {
        cmd.arg(DEFAULT_SHELL)
    } else {
        cmd.args(command.iter().cloned())
    }
}
