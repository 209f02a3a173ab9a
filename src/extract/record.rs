// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Normalized environment variable record
//!
//! Every declaration found in a pod spec becomes one `EnvVar`, tagged with the
//! mechanism that produced it. The provenance is fixed by the constructor that
//! created the record; later stages may only rewrite the value.

use std::fmt;

/// Key used for `envFrom` imports, meaning "every key of the referenced object"
pub const ALL_KEYS: &str = "*";

/// Which declaration slot produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvSource {
    /// Literal `value`
    Direct,
    /// `valueFrom.secretKeyRef` or `envFrom.secretRef`
    Secret,
    /// `valueFrom.configMapKeyRef` or `envFrom.configMapRef`
    ConfigMap,
}

impl fmt::Display for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvSource::Direct => write!(f, "direct"),
            EnvSource::Secret => write!(f, "secret"),
            EnvSource::ConfigMap => write!(f, "configmap"),
        }
    }
}

/// Coordinates of a single entry in a Secret or ConfigMap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyRef {
    pub name: String,
    pub key: String,
}

impl KeyRef {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// True for the `envFrom` sentinel that stands for all keys of the object
    pub fn is_all_keys(&self) -> bool {
        self.key == ALL_KEYS
    }

    /// Human readable stand-in used until the value is resolved
    pub fn placeholder(&self) -> String {
        format!("<{}:{}>", self.name, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
    source: EnvSource,
    reference: Option<KeyRef>,
    prefix: Option<String>,
}

impl EnvVar {
    /// Literal value declared inline
    pub fn direct(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            source: EnvSource::Direct,
            reference: None,
            prefix: None,
        }
    }

    /// Single key pulled from a Secret; value starts as the placeholder
    pub fn from_secret(
        name: impl Into<String>,
        secret: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::keyed(name.into(), EnvSource::Secret, KeyRef::new(secret, key))
    }

    /// Single key pulled from a ConfigMap; value starts as the placeholder
    pub fn from_config_map(
        name: impl Into<String>,
        config_map: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::keyed(name.into(), EnvSource::ConfigMap, KeyRef::new(config_map, key))
    }

    /// Bulk `envFrom.secretRef` import, kept as one synthetic record
    pub fn secret_import(secret: impl Into<String>, prefix: Option<String>) -> Self {
        let secret = secret.into();
        Self {
            name: format!("# from secret: {}", secret),
            value: String::new(),
            source: EnvSource::Secret,
            reference: Some(KeyRef::new(secret, ALL_KEYS)),
            prefix,
        }
    }

    /// Bulk `envFrom.configMapRef` import, kept as one synthetic record
    pub fn config_map_import(config_map: impl Into<String>, prefix: Option<String>) -> Self {
        let config_map = config_map.into();
        Self {
            name: format!("# from configmap: {}", config_map),
            value: String::new(),
            source: EnvSource::ConfigMap,
            reference: Some(KeyRef::new(config_map, ALL_KEYS)),
            prefix,
        }
    }

    fn keyed(name: String, source: EnvSource, reference: KeyRef) -> Self {
        Self {
            name,
            value: reference.placeholder(),
            source,
            reference: Some(reference),
            prefix: None,
        }
    }

    pub fn source(&self) -> EnvSource {
        self.source
    }

    /// Secret-sourced values are masked when redaction is requested
    pub fn is_secret(&self) -> bool {
        self.source == EnvSource::Secret
    }

    pub fn secret_ref(&self) -> Option<&KeyRef> {
        match self.source {
            EnvSource::Secret => self.reference.as_ref(),
            _ => None,
        }
    }

    pub fn config_ref(&self) -> Option<&KeyRef> {
        match self.source {
            EnvSource::ConfigMap => self.reference.as_ref(),
            _ => None,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Synthetic `envFrom` records carry a comment-style name
    pub fn is_comment(&self) -> bool {
        self.name.starts_with('#')
    }
}
