// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod apply, readiness wait, status and deletion

use crate::constants::FIELD_MANAGER;
use crate::error::{Result, UbikindError};
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{DeleteParams, Patch, PatchParams},
    runtime::wait::Condition,
    Api, Client, ResourceExt,
};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

/// Phase, readiness and address of a pod
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PodSummary {
    pub name: String,
    pub phase: String,
    pub ready: bool,
    pub pod_ip: Option<String>,
}

impl PodSummary {
    fn from_pod(pod: &Pod) -> Self {
        let status = pod.status.as_ref();
        Self {
            name: pod.name_any(),
            phase: status
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            ready: is_pod_ready().matches_object(Some(pod)),
            pod_ip: status.and_then(|s| s.pod_ip.clone()),
        }
    }
}

/// Pod has a `Ready` condition with status `True`
pub fn is_pod_ready() -> impl Condition<Pod> {
    |obj: Option<&Pod>| {
        obj.and_then(|pod| pod.status.as_ref())
            .and_then(|status| status.conditions.as_ref())
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.type_ == "Ready" && c.status == "True")
            })
    }
}

/// Phase of a pod that will never become ready
fn terminal_phase(pod: &Pod) -> Option<&str> {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .filter(|phase| matches!(*phase, "Failed" | "Succeeded"))
}

/// Server-side apply the pod into `namespace`
#[instrument(skip(client, pod), fields(pod = %pod.name_any()))]
pub async fn apply_pod(client: &Client, namespace: &str, pod: &Pod) -> Result<Pod> {
    let name = pod.name_any();
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pp = PatchParams::apply(FIELD_MANAGER).force();

    let applied = pods
        .patch(&name, &pp, &Patch::Apply(pod))
        .await
        .map_err(|e| match e {
            // Invalid object, missing namespace or field conflict
            kube::Error::Api(err) if matches!(err.code, 400 | 404 | 409 | 422) => {
                UbikindError::ManifestRejected {
                    name: name.clone(),
                    message: err.message,
                }
            }
            other => UbikindError::Kube(other),
        })?;

    info!("Applied pod {}/{}", namespace, name);
    Ok(applied)
}

/// Poll the pod until it is ready, giving up once `timeout` has elapsed
#[instrument(skip(client))]
pub async fn wait_for_pod_ready(
    client: &Client,
    namespace: &str,
    name: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Pod> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let ready = is_pod_ready();
    let deadline = Instant::now() + timeout;

    loop {
        match pods.get_opt(name).await? {
            Some(pod) if ready.matches_object(Some(&pod)) => {
                info!("Pod {}/{} is ready", namespace, name);
                return Ok(pod);
            }
            Some(pod) => {
                if let Some(phase) = terminal_phase(&pod) {
                    return Err(UbikindError::PodTerminated {
                        name: name.to_string(),
                        phase: phase.to_string(),
                    });
                }
                debug!(
                    "Pod {}/{} not ready yet (phase {})",
                    namespace,
                    name,
                    PodSummary::from_pod(&pod).phase
                );
            }
            None => debug!("Pod {}/{} not found yet", namespace, name),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(UbikindError::ReadinessTimeout {
                name: name.to_string(),
                timeout,
            });
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Delete the pod; returns false when it did not exist
#[instrument(skip(client))]
pub async fn delete_pod(client: &Client, namespace: &str, name: &str) -> Result<bool> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);

    match pods.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            info!("Deleted pod {}/{}", namespace, name);
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("Pod {}/{} already gone", namespace, name);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Current status of the pod, `None` when it does not exist
#[instrument(skip(client))]
pub async fn pod_status(client: &Client, namespace: &str, name: &str) -> Result<Option<PodSummary>> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    Ok(pods.get_opt(name).await?.as_ref().map(PodSummary::from_pod))
}
