// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::fmt;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kenv")]
#[command(author, version, about = "Extract environment variables from Kubernetes workloads")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Only read variables from this container (init containers included)
    #[arg(short, long, global = true)]
    pub container: Option<String>,

    /// Output format: docker, env, shell, dotenv, compose
    #[arg(short, long, global = true, value_name = "FORMAT")]
    pub output: Option<String>,

    /// Prefix shell output lines with `export`
    #[arg(short, long, global = true)]
    pub export: bool,

    /// Mask values that come from Secrets
    #[arg(long, global = true)]
    pub redact: bool,

    /// Kubernetes context to use (defaults to the kubeconfig current context)
    #[arg(long, global = true, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Namespace for workloads, Secrets and ConfigMaps
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Print `<name:key>` placeholders instead of contacting the cluster
    #[arg(long, global = true)]
    pub no_resolve: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract variables from a manifest file
    Extract {
        /// Manifest path, or `-` for stdin
        #[arg(short, long, value_name = "FILE")]
        file: String,
    },

    /// Extract variables from a workload running in the cluster
    Get {
        /// TYPE/NAME or TYPE NAME, e.g. deployment/my-app
        #[arg(required = true, num_args = 1..=2, value_name = "RESOURCE")]
        target: Vec<String>,
    },

    /// Show or change saved defaults
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config file
    Show,

    /// Persist the default output format
    SetFormat {
        #[arg(value_name = "FORMAT")]
        format: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Docker,
    Env,
    Shell,
    Dotenv,
    Compose,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Docker,
        OutputFormat::Env,
        OutputFormat::Shell,
        OutputFormat::Dotenv,
        OutputFormat::Compose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Docker => "docker",
            OutputFormat::Env => "env",
            OutputFormat::Shell => "shell",
            OutputFormat::Dotenv => "dotenv",
            OutputFormat::Compose => "compose",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_from_name() {
        assert_eq!(OutputFormat::from_name("docker"), Some(OutputFormat::Docker));
        assert_eq!(OutputFormat::from_name("SHELL"), Some(OutputFormat::Shell));
        assert_eq!(OutputFormat::from_name(" compose "), Some(OutputFormat::Compose));
        assert_eq!(OutputFormat::from_name("xml"), None);
        assert_eq!(OutputFormat::from_name(""), None);
    }

    #[test]
    fn test_names_roundtrip() {
        for format in OutputFormat::ALL {
            assert_eq!(OutputFormat::from_name(&format.to_string()), Some(format));
        }
    }

    #[test]
    fn test_parse_extract() {
        let args =
            Args::try_parse_from(["kenv", "extract", "-f", "deploy.yaml", "-o", "shell", "-e"])
                .unwrap();
        assert!(matches!(args.command, Command::Extract { ref file } if file == "deploy.yaml"));
        assert_eq!(args.output.as_deref(), Some("shell"));
        assert!(args.export);
        assert!(!args.redact);
    }

    #[test]
    fn test_parse_get_forms() {
        let args =
            Args::try_parse_from(["kenv", "get", "deployment/my-app", "-n", "prod"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Get { ref target } if target == &["deployment/my-app"]
        ));
        assert_eq!(args.namespace.as_deref(), Some("prod"));

        let args =
            Args::try_parse_from(["kenv", "--redact", "get", "sts", "db", "-c", "app"]).unwrap();
        assert!(matches!(args.command, Command::Get { ref target } if target.len() == 2));
        assert!(args.redact);
        assert_eq!(args.container.as_deref(), Some("app"));

        assert!(Args::try_parse_from(["kenv", "get"]).is_err());
    }

    #[test]
    fn test_parse_config() {
        let args = Args::try_parse_from(["kenv", "config", "set-format", "dotenv"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Config {
                command: ConfigCommand::SetFormat { ref format }
            } if format == "dotenv"
        ));
    }

    #[test]
    fn test_unknown_output_is_accepted_by_parser() {
        let args = Args::try_parse_from(["kenv", "extract", "-f", "-", "-o", "xml"]).unwrap();
        assert_eq!(args.output.as_deref(), Some("xml"));
    }
}
