// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for kenv
//!
//! Saved defaults live under ~/.kenv/:
//! - ~/.kenv/config.json - user configuration
//! - ~/.kenv/log/ - rolling log files

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;

/// Get the base kenv directory (~/.kenv/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".kenv"))
        .context("Could not determine home directory")
}

/// kenv configuration; every field is optional and flags take precedence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Default output format name; unknown names fall back to docker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Mask secret values by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redact: Option<bool>,

    /// Prefix shell lines with `export` by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<bool>,

    /// Kubeconfig context to use instead of the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Namespace to use instead of the context's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get the config file path (~/.kenv/config.json)
    pub fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }

    /// Validate and store a default format; unknown names are rejected here
    pub fn set_format(&mut self, name: &str) -> Result<OutputFormat> {
        let format = OutputFormat::from_name(name).ok_or_else(|| {
            let known: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.as_str()).collect();
            anyhow!("unknown format '{}', expected one of: {}", name, known.join(", "))
        })?;
        self.format = Some(format.to_string());
        Ok(format)
    }

    /// Pretty JSON as written to disk
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }
}
