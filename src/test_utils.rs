// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses and external commands.

use crate::error::Result;
use crate::process::{CommandOutput, CommandRunner, ExternalCommand};
use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PATCH requests (server-side apply) matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Number of requests received for a method and path
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let (status, body) = self
            .find_response(&method, &path)
            .unwrap_or_else(|| (404, status_json(404, "NotFound", "not found")));

        Box::pin(async move {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock pod JSON response
pub fn pod_json(name: &str, phase: &str, ready: bool) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": "default",
            "uid": "test-uid"
        },
        "spec": {
            "containers": [{"name": "ubi", "image": "registry.access.redhat.com/ubi9/ubi:latest"}]
        },
        "status": {
            "phase": phase,
            "podIP": "10.244.0.7",
            "conditions": [
                {"type": "PodScheduled", "status": "True"},
                {"type": "Ready", "status": if ready { "True" } else { "False" }}
            ]
        }
    })
    .to_string()
}

/// Create a Status failure response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Records external commands instead of running them.
///
/// Responses are matched on the longest registered command-line prefix; unmatched
/// commands succeed with empty output. `pkill` releases ports bound by earlier
/// spawns, standing in for the killed `kubectl port-forward`.
#[derive(Default)]
pub struct FakeRunner {
    responses: Mutex<Vec<(String, CommandOutput)>>,
    calls: Mutex<Vec<ExternalCommand>>,
    listen_on_spawn: Mutex<Option<u16>>,
    listeners: Mutex<Vec<TcpListener>>,
    next_pid: Mutex<u32>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to commands whose command line starts with `prefix`
    pub fn on(self, prefix: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.lock().unwrap().push((
            prefix.to_string(),
            CommandOutput {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    /// Bind this local port whenever a command is spawned in the background
    pub fn listen_on_spawn(self, port: u16) -> Self {
        *self.listen_on_spawn.lock().unwrap() = Some(port);
        self
    }

    pub fn calls(&self) -> Vec<ExternalCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ExternalCommand::command_line).collect()
    }

    fn respond(&self, cmd: &ExternalCommand) -> CommandOutput {
        self.calls.lock().unwrap().push(cmd.clone());

        if cmd.program == "pkill" {
            let mut listeners = self.listeners.lock().unwrap();
            let killed = !listeners.is_empty();
            listeners.clear();
            return CommandOutput {
                exit_code: Some(if killed { 0 } else { 1 }),
                ..Default::default()
            };
        }

        let line = cmd.command_line();
        self.responses
            .lock()
            .unwrap()
            .iter()
            .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| output.clone())
            .unwrap_or(CommandOutput {
                exit_code: Some(0),
                ..Default::default()
            })
    }
}

impl CommandRunner for FakeRunner {
    async fn output(&self, cmd: &ExternalCommand) -> Result<CommandOutput> {
        Ok(self.respond(cmd))
    }

    async fn interactive(&self, cmd: &ExternalCommand) -> Result<Option<i32>> {
        Ok(self.respond(cmd).exit_code)
    }

    fn spawn_detached(&self, cmd: &ExternalCommand) -> Result<u32> {
        self.calls.lock().unwrap().push(cmd.clone());

        if let Some(port) = *self.listen_on_spawn.lock().unwrap() {
            let listener = TcpListener::bind(("127.0.0.1", port))?;
            self.listeners.lock().unwrap().push(listener);
        }

        let mut pid = self.next_pid.lock().unwrap();
        *pid += 1;
        Ok(1000 + *pid)
    }
}

/// Reserve a free local port and release it again
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}
