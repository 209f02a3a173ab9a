// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
pub mod config;
mod extract;
mod kubernetes;
mod output;
pub mod progress;
mod resolve;

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;

use cli::{Args, Command, ConfigCommand, OutputFormat};
use config::Config;
use extract::{EnvVar, ManifestError, decode_manifests, extract_pod_spec};
use kubernetes::{ClusterClient, KubeStore, WorkloadRef, fetch_workload};
use output::FormatOptions;
use progress::with_spinner;
use resolve::resolve_all;

/// Initialize logging with file output and optional stderr
fn init_logging(verbose: bool) {
    use tracing_rolling_file::{RollingConditionBase, RollingFileAppenderBase};
    use tracing_subscriber::fmt::format::FmtSpan;

    let log_dir = config::base_dir()
        .map(|p| p.join("log"))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return;
    }

    // Rotate daily or at 10MB, keep 5 files
    let log_path = log_dir.join("kenv.log");
    let condition = RollingConditionBase::new()
        .daily()
        .max_size(10 * 1024 * 1024);

    let file_appender = match RollingFileAppenderBase::new(log_path, condition, 5) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {}", e);
            return;
        }
    };

    let (non_blocking, _guard) = file_appender.get_non_blocking_appender();
    // Leak the guard to keep the background writer alive
    std::mem::forget(_guard);

    let filter = if verbose { "kenv=debug" } else { "kenv=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::NONE)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

/// Log a warning, and print it unless the verbose stderr layer already does
fn report_warning(verbose: bool, message: &str) {
    warn!("{}", message);
    if !verbose {
        eprintln!("Warning: {}", message);
    }
}

/// Effective options after merging flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    format: OutputFormat,
    options: FormatOptions,
    context: Option<String>,
    namespace: Option<String>,
    verbose: bool,
}

impl Settings {
    fn new(args: &Args, config: &Config) -> Self {
        // -o wins over the config file; either may hold an unknown name
        let format = args
            .output
            .as_deref()
            .or(config.format.as_deref())
            .map(|name| {
                OutputFormat::from_name(name).unwrap_or_else(|| {
                    let message = format!("unknown output format '{}', using docker", name);
                    report_warning(args.verbose, &message);
                    OutputFormat::Docker
                })
            })
            .unwrap_or_default();

        Self {
            format,
            options: FormatOptions {
                redact: args.redact || config.redact.unwrap_or(false),
                export: args.export || config.export.unwrap_or(false),
            },
            context: args.context.clone().or_else(|| config.context.clone()),
            namespace: args.namespace.clone().or_else(|| config.namespace.clone()),
            verbose: args.verbose,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    // Install rustls crypto provider (aws-lc-rs); fails only if one is already set
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;

    match &args.command {
        Command::Config { command } => run_config(&mut config, command),
        Command::Extract { file } => {
            let settings = Settings::new(&args, &config);
            let input = read_input(file)?;
            let vars = decode_manifests(&input, args.container.as_deref())?;
            info!(records = vars.len(), source = %file, "Extracted variables from manifest");

            let vars = if args.no_resolve {
                vars
            } else {
                resolve_from_manifest(vars, &settings).await
            };
            print_output(&vars, &settings);
            Ok(())
        }
        Command::Get { target } => {
            let settings = Settings::new(&args, &config);
            let target = WorkloadRef::from_args(target)?;
            let cluster =
                ClusterClient::connect(settings.context.as_deref(), settings.namespace.as_deref())
                    .await?;
            info!(
                context = %cluster.context(),
                namespace = %cluster.namespace(),
                kind = %target.kind,
                name = %target.name,
                "Fetching live workload"
            );

            let message = format!(
                "Fetching {}/{}...",
                target.kind.as_str().to_lowercase(),
                target.name
            );
            let workload = with_spinner(
                &message,
                fetch_workload(cluster.client(), cluster.namespace(), &target),
            )
            .await?;

            let spec = workload.pod_spec().ok_or_else(|| {
                anyhow!("{} {} has no pod template", workload.kind(), target.name)
            })?;
            let vars = extract_pod_spec(spec, args.container.as_deref());
            if vars.is_empty() {
                return Err(ManifestError::NoEnvVars.into());
            }

            let vars = if args.no_resolve {
                vars
            } else {
                resolve_with(vars, &cluster, &settings).await
            };
            print_output(&vars, &settings);
            Ok(())
        }
    }
}

fn run_config(config: &mut Config, command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("{}", config.to_json()?);
        }
        ConfigCommand::SetFormat { format } => {
            let format = config.set_format(format)?;
            config.save()?;
            info!(format = %format, "Saved default output format");
            println!("Default output format set to {}", format);
        }
    }
    Ok(())
}

/// Read a manifest from a path, or stdin for `-`
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read manifest from stdin")?;
        Ok(input)
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read manifest file: {}", file))
    }
}

/// Resolve against the cluster if one is configured, otherwise keep placeholders
async fn resolve_from_manifest(vars: Vec<EnvVar>, settings: &Settings) -> Vec<EnvVar> {
    let connected =
        ClusterClient::connect(settings.context.as_deref(), settings.namespace.as_deref()).await;
    match connected {
        Ok(cluster) => resolve_with(vars, &cluster, settings).await,
        Err(e) => {
            debug!(error = %format!("{:#}", e), "Cluster unavailable, leaving placeholders");
            vars
        }
    }
}

async fn resolve_with(
    vars: Vec<EnvVar>,
    cluster: &ClusterClient,
    settings: &Settings,
) -> Vec<EnvVar> {
    if !vars.iter().any(|v| v.secret_ref().is_some() || v.config_ref().is_some()) {
        return vars;
    }

    let store = KubeStore::new(cluster.client());
    let resolution = with_spinner(
        "Resolving secrets and configmaps...",
        resolve_all(vars, &store, cluster.namespace()),
    )
    .await;

    for warning in &resolution.warnings {
        report_warning(settings.verbose, &warning.to_string());
    }
    resolution.vars
}

fn print_output(vars: &[EnvVar], settings: &Settings) {
    let rendered = output::format(vars, settings.format, &settings.options);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubernetes::MemoryStore;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::new(&parse(&["kenv", "extract", "-f", "-"]), &Config::default());
        assert_eq!(settings.format, OutputFormat::Docker);
        assert!(!settings.options.redact);
        assert!(!settings.options.export);
        assert_eq!(settings.namespace, None);
    }

    #[test]
    fn test_settings_flags_override_config() {
        let config = Config {
            format: Some("dotenv".to_string()),
            namespace: Some("from-config".to_string()),
            context: Some("cfg-ctx".to_string()),
            redact: Some(true),
            ..Default::default()
        };

        let args = parse(&["kenv", "get", "pod/x", "-o", "shell", "-n", "flag-ns"]);
        let settings = Settings::new(&args, &config);
        assert_eq!(settings.format, OutputFormat::Shell);
        assert_eq!(settings.namespace.as_deref(), Some("flag-ns"));
        assert_eq!(settings.context.as_deref(), Some("cfg-ctx"));
        assert!(settings.options.redact);

        let settings = Settings::new(&parse(&["kenv", "get", "pod/x"]), &config);
        assert_eq!(settings.format, OutputFormat::Dotenv);
        assert_eq!(settings.namespace.as_deref(), Some("from-config"));
    }

    #[test]
    fn test_unknown_format_falls_back_to_docker() {
        let config = Config {
            format: Some("compose".to_string()),
            ..Default::default()
        };
        let settings = Settings::new(&parse(&["kenv", "extract", "-f", "-", "-o", "xml"]), &config);
        assert_eq!(settings.format, OutputFormat::Docker);
    }

    #[test]
    fn test_unknown_config_format_falls_back_to_docker() {
        let config = Config {
            format: Some("xml".to_string()),
            ..Default::default()
        };
        let settings = Settings::new(&parse(&["kenv", "extract", "-f", "-"]), &config);
        assert_eq!(settings.format, OutputFormat::Docker);

        let settings = Settings::new(&parse(&["kenv", "extract", "-f", "-", "-o", "env"]), &config);
        assert_eq!(settings.format, OutputFormat::Env);
    }

    #[tokio::test]
    async fn test_unknown_context_keeps_placeholders() {
        let args = parse(&["kenv", "extract", "-f", "-"]);
        let mut settings = Settings::new(&args, &Config::default());
        settings.context = Some("kenv-no-such-context".to_string());
        let vars = vec![
            EnvVar::direct("FOO", "bar"),
            EnvVar::from_secret("S", "s", "k"),
            EnvVar::from_config_map("C", "cfg", "level"),
        ];

        let resolved = resolve_from_manifest(vars.clone(), &settings).await;

        assert_eq!(resolved, vars);
        assert_eq!(resolved[1].value, "<s:k>");
    }

    #[tokio::test]
    async fn test_deployment_to_docker() {
        let manifest = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
        - name: web
          image: nginx
          env:
            - name: FOO
              value: bar
            - name: BAZ
              value: qux
"#;
        let vars = decode_manifests(manifest, None).unwrap();
        let resolution = resolve_all(vars, &MemoryStore::new(), "default").await;
        let options = FormatOptions::default();
        let out = output::format(&resolution.vars, OutputFormat::Docker, &options);
        assert_eq!(out, r#"-e FOO="bar" -e BAZ="qux""#);
    }

    #[test]
    fn test_pod_container_filter() {
        let manifest = r#"
apiVersion: v1
kind: Pod
metadata:
  name: multi
spec:
  containers:
    - name: app1
      env:
        - name: APP1_VAR
          value: value1
    - name: app2
      env:
        - name: APP2_VAR
          value: value2
"#;
        let vars = decode_manifests(manifest, Some("app1")).unwrap();
        assert_eq!(vars, vec![EnvVar::direct("APP1_VAR", "value1")]);
    }

    #[tokio::test]
    async fn test_secret_resolved_then_redacted() {
        let manifest = r#"
apiVersion: v1
kind: Pod
metadata:
  name: app
spec:
  containers:
    - name: app
      env:
        - name: SECRET_VALUE
          valueFrom:
            secretKeyRef:
              name: my-secret
              key: password
"#;
        let store =
            MemoryStore::new().with_secret("default", "my-secret", &[("password", "s3cr3t")]);
        let vars = decode_manifests(manifest, None).unwrap();
        let resolution = resolve_all(vars, &store, "default").await;
        assert_eq!(resolution.vars[0].value, "s3cr3t");

        let options = FormatOptions {
            redact: true,
            ..Default::default()
        };
        let out = output::format(&resolution.vars, OutputFormat::Docker, &options);
        assert_eq!(out, r#"-e SECRET_VALUE="***REDACTED***""#);
    }

    #[test]
    fn test_service_manifest_rejected() {
        let manifest = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n";
        let err = decode_manifests(manifest, None).unwrap_err();
        assert_eq!(err.to_string(), "unsupported resource type: Service");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_input("/nonexistent/kenv/manifest.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest file"));
    }
}
