// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Key/value lookups against Secrets and ConfigMaps
//!
//! The resolver only sees the [`KeyValueStore`] trait. One call returns the
//! whole data map of one object, so callers can cache per object name.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{Api, Client};
use thiserror::Error;
use tracing::debug;

use super::client::{get_with_retry, is_not_found};

/// Data of a single Secret or ConfigMap, values decoded to text
pub type ObjectData = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch every key of a Secret
    async fn secret_data(&self, namespace: &str, name: &str) -> Result<ObjectData, StoreError>;

    /// Fetch every key of a ConfigMap
    async fn config_map_data(&self, namespace: &str, name: &str) -> Result<ObjectData, StoreError>;
}

/// Store backed by the Kubernetes API
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn map_get_error(kind: &'static str, name: &str, err: kube::Error) -> StoreError {
    if is_not_found(&err) {
        StoreError::NotFound {
            kind,
            name: name.to_string(),
        }
    } else {
        StoreError::Kube(err)
    }
}

/// Secret bytes as text; invalid UTF-8 is replaced rather than dropped
fn secret_to_data(secret: Secret) -> ObjectData {
    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, bytes)| (key, String::from_utf8_lossy(&bytes.0).into_owned()))
        .collect()
}

/// ConfigMap `data`, with `binaryData` filling in keys `data` does not have
fn config_map_to_data(config_map: ConfigMap) -> ObjectData {
    let mut data = config_map.data.unwrap_or_default();
    for (key, bytes) in config_map.binary_data.unwrap_or_default() {
        data.entry(key)
            .or_insert_with(|| String::from_utf8_lossy(&bytes.0).into_owned());
    }
    data
}

#[async_trait]
impl KeyValueStore for KubeStore {
    async fn secret_data(&self, namespace: &str, name: &str) -> Result<ObjectData, StoreError> {
        debug!(namespace = %namespace, secret = %name, "Fetching secret");
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = get_with_retry(&api, name)
            .await
            .map_err(|e| map_get_error("secret", name, e))?;
        Ok(secret_to_data(secret))
    }

    async fn config_map_data(&self, namespace: &str, name: &str) -> Result<ObjectData, StoreError> {
        debug!(namespace = %namespace, configmap = %name, "Fetching configmap");
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let config_map = get_with_retry(&api, name)
            .await
            .map_err(|e| map_get_error("configmap", name, e))?;
        Ok(config_map_to_data(config_map))
    }
}
