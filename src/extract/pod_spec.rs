// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Pod spec -> environment records
//!
//! Walks init containers then regular containers in declaration order and turns
//! every `env` and `envFrom` entry into an [`EnvVar`]. Nothing here talks to a
//! cluster: references are left as placeholders for the resolver.

use k8s_openapi::api::core::v1::{Container, EnvFromSource, EnvVar as K8sEnvVar, PodSpec};

use super::record::EnvVar;

/// Extract environment records from a pod spec
///
/// With a non-empty `container` filter only the first container carrying that
/// name is processed, and a filter that matches nothing yields an empty vector.
pub fn extract_pod_spec(spec: &PodSpec, container: Option<&str>) -> Vec<EnvVar> {
    let filter = container.filter(|name| !name.is_empty());

    let mut containers = spec
        .init_containers
        .iter()
        .flatten()
        .chain(spec.containers.iter());

    match filter {
        Some(name) => containers
            .find(|c| c.name == name)
            .map(extract_container)
            .unwrap_or_default(),
        None => containers.flat_map(extract_container).collect(),
    }
}

/// All `env` records of one container followed by its `envFrom` records
fn extract_container(container: &Container) -> Vec<EnvVar> {
    let env = container.env.iter().flatten().map(from_env_entry);
    let env_from = container.env_from.iter().flatten().filter_map(from_env_from_entry);
    env.chain(env_from).collect()
}

fn from_env_entry(entry: &K8sEnvVar) -> EnvVar {
    if let Some(value) = entry.value.as_deref().filter(|v| !v.is_empty()) {
        return EnvVar::direct(&entry.name, value);
    }

    let Some(source) = entry.value_from.as_ref() else {
        return EnvVar::direct(&entry.name, "");
    };

    if let Some(secret) = &source.secret_key_ref {
        EnvVar::from_secret(&entry.name, &secret.name, &secret.key)
    } else if let Some(config_map) = &source.config_map_key_ref {
        EnvVar::from_config_map(&entry.name, &config_map.name, &config_map.key)
    } else {
        // fieldRef / resourceFieldRef: keep the name visible with an empty value
        EnvVar::direct(&entry.name, "")
    }
}

fn from_env_from_entry(entry: &EnvFromSource) -> Option<EnvVar> {
    let prefix = entry.prefix.clone().filter(|p| !p.is_empty());

    if let Some(secret) = &entry.secret_ref {
        Some(EnvVar::secret_import(&secret.name, prefix))
    } else {
        entry
            .config_map_ref
            .as_ref()
            .map(|config_map| EnvVar::config_map_import(&config_map.name, prefix))
    }
}
