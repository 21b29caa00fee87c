// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Background `kubectl port-forward` to the pod.
//!
//! The forward runs detached so it outlives the CLI invocation. It is found again
//! by its command line, which makes `start` idempotent: a previous instance with
//! the same target is killed before a new one is spawned.

use crate::constants::forward::{PROBE_INTERVAL_MILLIS, SETTLE_TIMEOUT_MILLIS};
use crate::error::{Result, UbikindError};
use crate::process::{CommandRunner, ExternalCommand};
use std::io::ErrorKind;
use std::net::TcpListener;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// What to forward: pod port `remote_port` to `127.0.0.1:local_port`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardTarget {
    pub context: String,
    pub namespace: String,
    pub pod: String,
    pub local_port: u16,
    pub remote_port: u16,
}

impl ForwardTarget {
    pub fn command(&self) -> ExternalCommand {
        ExternalCommand::new("kubectl").args([
            "--context".to_string(),
            self.context.clone(),
            "-n".to_string(),
            self.namespace.clone(),
            "port-forward".to_string(),
            format!("pod/{}", self.pod),
            format!("{}:{}", self.local_port, self.remote_port),
        ])
    }

    /// Extended regex matching the command line of `command()`. Anchored at the
    /// end so `2222:22` does not also match a forward to `2222:2200`; the start
    /// stays open since kubectl may be invoked through an absolute path.
    pub fn match_pattern(&self) -> String {
        format!("{}$", escape_ere(&self.command().command_line()))
    }
}

/// Starts and stops the port-forward process
pub struct PortForwarder<R> {
    runner: R,
    settle_timeout: Duration,
}

impl<R: CommandRunner> PortForwarder<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            settle_timeout: Duration::from_millis(SETTLE_TIMEOUT_MILLIS),
        }
    }

    pub fn with_settle_timeout(mut self, settle_timeout: Duration) -> Self {
        self.settle_timeout = settle_timeout;
        self
    }

    /// Replace any running forward for `target` with a fresh one and return its pid
    #[instrument(skip(self))]
    pub async fn start(&self, target: &ForwardTarget) -> Result<u32> {
        if self.stop(target).await? {
            wait_for_port_release(target.local_port, self.settle_timeout).await;
        }
        ensure_port_free(target.local_port)?;

        let pid = self.runner.spawn_detached(&target.command())?;
        info!(
            pid,
            "Started port-forward 127.0.0.1:{} -> pod/{}:{}",
            target.local_port,
            target.pod,
            target.remote_port
        );

        if let Err(e) = wait_for_listener(target.local_port, self.settle_timeout).await {
            warn!("Port-forward did not come up, stopping it");
            self.stop(target).await?;
            return Err(e);
        }
        Ok(pid)
    }

    /// Kill a running forward for `target`; returns whether one was running
    #[instrument(skip(self))]
    pub async fn stop(&self, target: &ForwardTarget) -> Result<bool> {
        let cmd = ExternalCommand::new("pkill").args(["-f".to_string(), target.match_pattern()]);
        let output = self.runner.output(&cmd).await?;

        // pkill exits 1 when nothing matched
        match output.exit_code {
            Some(0) => {
                info!("Stopped port-forward on local port {}", target.local_port);
                Ok(true)
            }
            Some(1) => {
                debug!("No port-forward running for local port {}", target.local_port);
                Ok(false)
            }
            exit_code => Err(UbikindError::CommandFailed {
                command: cmd.command_line(),
                exit_code,
                stderr: output.stderr,
            }),
        }
    }
}

fn ensure_port_free(port: u16) -> Result<()> {
    match TcpListener::bind(("127.0.0.1", port)) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AddrInUse => Err(UbikindError::PortInUse(port)),
        Err(e) => Err(e.into()),
    }
}

async fn wait_for_port_release(port: u16, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while TcpListener::bind(("127.0.0.1", port)).is_err() && Instant::now() < deadline {
        sleep(Duration::from_millis(PROBE_INTERVAL_MILLIS)).await;
    }
}

async fn wait_for_listener(port: u16, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(UbikindError::PortForwardFailed {
                port,
                reason: format!("nothing listening after {:?}", timeout),
            });
        }
        sleep(Duration::from_millis(PROBE_INTERVAL_MILLIS)).await;
    }
}

fn escape_ere(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.^$|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{free_port, FakeRunner};

    fn target(local_port: u16) -> ForwardTarget {
        ForwardTarget {
            context: "kind-ubi-lab".to_string(),
            namespace: "default".to_string(),
            pod: "ubi-pod".to_string(),
            local_port,
            remote_port: 22,
        }
    }

    #[test]
    fn test_forward_command_line() {
        assert_eq!(
            target(2222).command().command_line(),
            "kubectl --context kind-ubi-lab -n default port-forward pod/ubi-pod 2222:22"
        );
    }

    #[test]
    fn test_match_pattern_escapes_regex_metacharacters() {
        let mut t = target(2222);
        t.pod = "ubi.pod".to_string();

        assert_eq!(
            t.match_pattern(),
            "kubectl --context kind-ubi-lab -n default port-forward pod/ubi\\.pod 2222:22$"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_match_pattern_does_not_match_longer_remote_port() {
        use crate::process::SystemRunner;

        let mut other = target(2222);
        other.remote_port = 2200;
        let lines = format!(
            "{}\n/usr/local/bin/{}\n",
            other.command().command_line(),
            target(2222).command().command_line()
        );
        let grep = ExternalCommand::new("sh").args([
            "-c".to_string(),
            "printf %s \"$1\" | grep -E -- \"$2\"".to_string(),
            "sh".to_string(),
            lines,
            target(2222).match_pattern(),
        ]);

        let output = SystemRunner.output(&grep).await.unwrap();

        assert_eq!(output.exit_code, Some(0));
        assert_eq!(
            output.stdout,
            "/usr/local/bin/kubectl --context kind-ubi-lab -n default port-forward pod/ubi-pod 2222:22\n"
        );
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let port = free_port();
        let runner = FakeRunner::new().listen_on_spawn(port);
        let forwarder = PortForwarder::new(&runner).with_settle_timeout(Duration::from_secs(2));
        let target = target(port);

        forwarder.start(&target).await.unwrap();
        forwarder.start(&target).await.unwrap();

        let calls = runner.calls();
        let programs: Vec<&str> = calls.iter().map(|c| c.program.as_str()).collect();
        assert_eq!(programs, vec!["pkill", "kubectl", "pkill", "kubectl"]);
        assert_eq!(calls[0], calls[2]);
        assert_eq!(calls[1], calls[3]);
        assert_eq!(calls[0].args, vec!["-f".to_string(), target.match_pattern()]);
    }

    #[tokio::test]
    async fn test_start_fails_when_port_in_use() {
        let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();
        let runner = FakeRunner::new();
        let forwarder = PortForwarder::new(&runner);

        let err = forwarder.start(&target(port)).await.unwrap_err();

        assert!(matches!(err, UbikindError::PortInUse(p) if p == port));
        assert_eq!(runner.command_lines().len(), 1, "must not spawn kubectl");
    }

    #[tokio::test]
    async fn test_start_fails_when_forward_never_listens() {
        let port = free_port();
        let runner = FakeRunner::new();
        let forwarder = PortForwarder::new(&runner).with_settle_timeout(Duration::from_millis(200));

        let err = forwarder.start(&target(port)).await.unwrap_err();

        assert!(matches!(err, UbikindError::PortForwardFailed { port: p, .. } if p == port));
        let programs: Vec<String> = runner.calls().into_iter().map(|c| c.program).collect();
        assert_eq!(programs, vec!["pkill", "kubectl", "pkill"]);
    }

    #[tokio::test]
    async fn test_stop_reports_whether_anything_was_killed() {
        let port = free_port();
        let runner = FakeRunner::new().listen_on_spawn(port);
        let forwarder = PortForwarder::new(&runner).with_settle_timeout(Duration::from_secs(2));
        let target = target(port);

        assert!(!forwarder.stop(&target).await.unwrap());
        forwarder.start(&target).await.unwrap();
        assert!(forwarder.stop(&target).await.unwrap());
    }
}
