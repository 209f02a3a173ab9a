// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Manifest stream decoding
//!
//! Splits a YAML or JSON stream into documents, turns each into a typed
//! [`Workload`] and runs the pod spec extractor over it. A single bad document
//! fails the whole stream.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::pod_spec::extract_pod_spec;
use super::record::EnvVar;
use super::workload::{Workload, WorkloadKind, WorkloadKindError};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to decode manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to decode manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document {index} has no kind")]
    MissingKind { index: usize },

    #[error(transparent)]
    Unsupported(#[from] WorkloadKindError),

    #[error("failed to decode {kind} in document {index}: {source}")]
    Object {
        kind: WorkloadKind,
        index: usize,
        source: serde_json::Error,
    },

    #[error("no environment variables found")]
    NoEnvVars,
}

/// Split a stream into non-empty documents
///
/// A stream starting with `{` is read as concatenated JSON objects, anything
/// else as multi-document YAML (which also covers `---` separated JSON).
fn split_documents(input: &str) -> Result<Vec<serde_json::Value>, ManifestError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let documents: Vec<serde_json::Value> = if input.trim_start().starts_with('{') {
        serde_json::Deserializer::from_str(input)
            .into_iter::<serde_json::Value>()
            .collect::<Result<_, _>>()?
    } else {
        serde_yaml::Deserializer::from_str(input)
            .map(serde_json::Value::deserialize)
            .collect::<Result<_, _>>()?
    };

    Ok(documents.into_iter().filter(|doc| !doc.is_null()).collect())
}

/// Decode every document in the stream into a workload
pub fn decode_workloads(input: &str) -> Result<Vec<Workload>, ManifestError> {
    split_documents(input)?
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let kind = document
                .get("kind")
                .and_then(|k| k.as_str())
                .ok_or(ManifestError::MissingKind { index })?;
            let kind = WorkloadKind::from_manifest_kind(kind)
                .ok_or_else(|| WorkloadKindError(kind.to_string()))?;

            let workload = Workload::from_value(kind, document)
                .map_err(|source| ManifestError::Object { kind, index, source })?;
            debug!(index, kind = %kind, name = ?workload.name(), "Decoded workload");
            Ok(workload)
        })
        .collect()
}

/// Extract environment records from every workload in a manifest stream
///
/// Records are concatenated in document order. An empty result is an error:
/// it almost always means the wrong file or container name was given.
pub fn decode_manifests(
    input: &str,
    container: Option<&str>,
) -> Result<Vec<EnvVar>, ManifestError> {
    let vars: Vec<EnvVar> = decode_workloads(input)?
        .iter()
        .filter_map(Workload::pod_spec)
        .flat_map(|spec| extract_pod_spec(spec, container))
        .collect();

    if vars.is_empty() {
        return Err(ManifestError::NoEnvVars);
    }

    Ok(vars)
}
