// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Reference resolution
//!
//! Replaces `<name:key>` placeholders with the values held in the referenced
//! Secrets and ConfigMaps. Each object is fetched at most once per call; a
//! failed lookup only affects the records that point at it.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::extract::{EnvSource, EnvVar, KeyRef};
use crate::kubernetes::{KeyValueStore, ObjectData};

/// Non-fatal problem met while resolving one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The Secret/ConfigMap itself could not be fetched
    FetchFailed {
        source: EnvSource,
        object: String,
        reason: String,
    },
    /// The object exists but lacks the requested key
    KeyMissing {
        source: EnvSource,
        object: String,
        key: String,
    },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::FetchFailed {
                source,
                object,
                reason,
            } => write!(f, "failed to get {} {}: {}", source, object, reason),
            ResolveWarning::KeyMissing {
                source,
                object,
                key,
            } => write!(f, "key {} not found in {} {}", key, source, object),
        }
    }
}

/// Records after resolution, in input order, plus what went wrong on the way
#[derive(Debug, Default)]
pub struct Resolution {
    pub vars: Vec<EnvVar>,
    pub warnings: Vec<ResolveWarning>,
}

/// Which store lookup an [`ObjectCache`] goes through
#[derive(Clone, Copy)]
enum ObjectKind {
    Secret,
    ConfigMap,
}

/// Read-through cache for one object kind; failures are remembered too
struct ObjectCache {
    kind: ObjectKind,
    objects: HashMap<String, Result<ObjectData, String>>,
}

impl ObjectCache {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            objects: HashMap::new(),
        }
    }

    async fn get<S>(
        &mut self,
        store: &S,
        namespace: &str,
        name: &str,
    ) -> &Result<ObjectData, String>
    where
        S: KeyValueStore + ?Sized,
    {
        if !self.objects.contains_key(name) {
            let fetched = match self.kind {
                ObjectKind::Secret => store.secret_data(namespace, name).await,
                ObjectKind::ConfigMap => store.config_map_data(namespace, name).await,
            };
            self.objects
                .insert(name.to_string(), fetched.map_err(|e| e.to_string()));
        }
        &self.objects[name]
    }
}

/// Resolve every Secret/ConfigMap reference in `vars` against `store`
///
/// Direct records, `envFrom` imports (key `*`) and records without a
/// reference pass through untouched. Only `value` is ever rewritten.
pub async fn resolve_all<S>(vars: Vec<EnvVar>, store: &S, namespace: &str) -> Resolution
where
    S: KeyValueStore + ?Sized,
{
    let mut secrets = ObjectCache::new(ObjectKind::Secret);
    let mut config_maps = ObjectCache::new(ObjectKind::ConfigMap);
    let mut warnings = Vec::new();

    let mut resolved = Vec::with_capacity(vars.len());
    for mut var in vars {
        let source = var.source();
        let (cache, reference) = match source {
            EnvSource::Direct => (None, None),
            EnvSource::Secret => (Some(&mut secrets), var.secret_ref().cloned()),
            EnvSource::ConfigMap => (Some(&mut config_maps), var.config_ref().cloned()),
        };

        if let Some(reference) = &reference
            && reference.is_all_keys()
        {
            debug!(
                object = %reference.name,
                source = %source,
                prefix = ?var.prefix(),
                "Leaving bulk import unexpanded"
            );
        } else if let (Some(cache), Some(reference)) = (cache, reference) {
            let object = cache.get(store, namespace, &reference.name).await;
            match lookup(object, source, &reference) {
                Ok(value) => var.value = value,
                Err(warning) => {
                    debug!(variable = %var.name, "{}", warning);
                    warnings.push(warning);
                }
            }
        }

        resolved.push(var);
    }

    debug!(
        records = resolved.len(),
        secrets = secrets.objects.len(),
        configmaps = config_maps.objects.len(),
        warnings = warnings.len(),
        "Resolution complete"
    );

    Resolution {
        vars: resolved,
        warnings,
    }
}

fn lookup(
    object: &Result<ObjectData, String>,
    source: EnvSource,
    reference: &KeyRef,
) -> Result<String, ResolveWarning> {
    let data = object.as_ref().map_err(|reason| ResolveWarning::FetchFailed {
        source,
        object: reference.name.clone(),
        reason: reason.clone(),
    })?;

    data.get(&reference.key)
        .cloned()
        .ok_or_else(|| ResolveWarning::KeyMissing {
            source,
            object: reference.name.clone(),
            key: reference.key.clone(),
        })
}
