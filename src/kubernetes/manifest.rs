// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendering of the embedded UBI pod manifest

use crate::config::Config;
use crate::error::{Result, UbikindError};
use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar, Pod};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

const POD_TEMPLATE: &str = include_str!("../../manifests/ubi-pod.yaml");

const SSH_PORT_ENV: &str = "SSH_PORT";
const AUTHORIZED_KEY_ENV: &str = "AUTHORIZED_KEY";

/// Values substituted into the pod template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestSettings {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub port: u16,
    pub authorized_key: Option<String>,
}

impl ManifestSettings {
    pub fn from_config(config: &Config, authorized_key: Option<String>) -> Self {
        Self {
            name: config.pod_name.to_string(),
            namespace: config.namespace.clone(),
            image: config.image.clone(),
            port: config.remote_port,
            authorized_key,
        }
    }
}

/// Parse the embedded template and apply the settings to it
pub fn render_pod(settings: &ManifestSettings) -> Result<Pod> {
    let mut pod: Pod = serde_yaml::from_str(POD_TEMPLATE)
        .map_err(|e| UbikindError::ManifestTemplate(e.to_string()))?;

    pod.metadata.name = Some(settings.name.clone());
    pod.metadata.namespace = Some(settings.namespace.clone());

    let container = pod
        .spec
        .as_mut()
        .and_then(|spec| spec.containers.first_mut())
        .ok_or_else(|| UbikindError::ManifestTemplate("template declares no container".to_string()))?;

    container.image = Some(settings.image.clone());
    container.ports = Some(vec![ContainerPort {
        name: Some("ssh".to_string()),
        container_port: i32::from(settings.port),
        protocol: Some("TCP".to_string()),
        ..Default::default()
    }]);

    if let Some(tcp) = container
        .readiness_probe
        .as_mut()
        .and_then(|probe| probe.tcp_socket.as_mut())
    {
        tcp.port = IntOrString::Int(i32::from(settings.port));
    }

    set_env(container, SSH_PORT_ENV, settings.port.to_string());
    set_env(
        container,
        AUTHORIZED_KEY_ENV,
        settings.authorized_key.clone().unwrap_or_default(),
    );

    Ok(pod)
}

/// Render the pod as YAML, as it would be applied
pub fn render_pod_yaml(settings: &ManifestSettings) -> Result<String> {
    Ok(serde_yaml::to_string(&render_pod(settings)?)?)
}

fn set_env(container: &mut Container, name: &str, value: String) {
    let env = container.env.get_or_insert_with(Vec::new);
    match env.iter_mut().find(|var| var.name == name) {
        Some(var) => {
            var.value = Some(value);
            var.value_from = None;
        }
        None => env.push(EnvVar {
            name: name.to_string(),
            value: Some(value),
            value_from: None,
        }),
    }
}
