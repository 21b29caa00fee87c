// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation for the kubeconfig context Kind writes

use crate::error::{Result, UbikindError};
use crate::types::ClusterName;
use kube::{config::KubeConfigOptions, Client, Config as KConfig};
use tracing::{debug, instrument};

/// Create a Kubernetes client bound to the `kind-<cluster>` context
#[instrument(skip(cluster), fields(cluster = %cluster))]
pub async fn client_for_cluster(cluster: &ClusterName) -> Result<Client> {
    let options = kube_config_options(cluster);
    debug!("Loading kubeconfig context {:?}", options.context);

    let config = KConfig::from_kubeconfig(&options).await.map_err(|e| {
        UbikindError::Kubeconfig(format!(
            "Failed to load context {} (does the cluster exist?): {}",
            cluster.kube_context(),
            e
        ))
    })?;

    Client::try_from(config)
        .map_err(|e| UbikindError::Kubeconfig(format!("Failed to create client: {}", e)))
}

fn kube_config_options(cluster: &ClusterName) -> KubeConfigOptions {
    KubeConfigOptions {
        context: Some(cluster.kube_context()),
        ..Default::default()
    }
}
