// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Target namespace for the pod

use crate::error::{Result, UbikindError};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument};

/// Create `namespace` unless the API server reports it already exists.
/// Returns whether it was created.
#[instrument(skip(client))]
pub async fn ensure_namespace_exists(client: &Client, namespace: &str) -> Result<bool> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    match namespaces.create(&PostParams::default(), &ns).await {
        Ok(_) => {
            info!("Created namespace {}", namespace);
            Ok(true)
        }
        Err(kube::Error::Api(err)) if err.code == 409 => {
            debug!("Namespace {} present", namespace);
            Ok(false)
        }
        Err(e) => Err(UbikindError::Namespace {
            name: namespace.to_string(),
            source: e,
        }),
    }
}
