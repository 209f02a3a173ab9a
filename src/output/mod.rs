mod compose;
mod docker;
mod dotenv;
mod env;
mod shell;

pub use compose::ComposeFormatter;
pub use docker::DockerFormatter;
pub use dotenv::DotenvFormatter;
pub use env::EnvFormatter;
pub use shell::ShellFormatter;

use std::borrow::Cow;

use crate::cli::OutputFormat;
use crate::extract::EnvVar;

/// Shown instead of a secret's value when redaction is on
pub const REDACTED: &str = "***REDACTED***";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Mask values of secret-sourced records
    pub redact: bool,
    /// Prefix shell lines with `export `
    pub export: bool,
}

pub trait OutputFormatter {
    fn format(vars: &[EnvVar], options: &FormatOptions) -> String;
}

/// Render records in the requested format
pub fn format(vars: &[EnvVar], format: OutputFormat, options: &FormatOptions) -> String {
    match format {
        OutputFormat::Docker => DockerFormatter::format(vars, options),
        OutputFormat::Env => EnvFormatter::format(vars, options),
        OutputFormat::Shell => ShellFormatter::format(vars, options),
        OutputFormat::Dotenv => DotenvFormatter::format(vars, options),
        OutputFormat::Compose => ComposeFormatter::format(vars, options),
    }
}

/// Records that name a real variable (bulk `envFrom` markers are skipped)
fn variables(vars: &[EnvVar]) -> impl Iterator<Item = &EnvVar> {
    vars.iter().filter(|v| !v.is_comment())
}

/// Value to print, masked if redaction applies
fn display_value<'a>(var: &'a EnvVar, options: &FormatOptions) -> &'a str {
    if options.redact && var.is_secret() {
        REDACTED
    } else {
        &var.value
    }
}

fn escape_double_quotes(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(value.replace('"', "\\\""))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<EnvVar> {
        let mut secret = EnvVar::from_secret("SECRET_VALUE", "my-secret", "password");
        secret.value = "s3cr3t".to_string();
        vec![
            EnvVar::direct("FOO", "bar"),
            secret,
            EnvVar::secret_import("bulk", None),
        ]
    }

    #[test]
    fn test_escape_double_quotes() {
        assert!(matches!(escape_double_quotes("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape_double_quotes(r#"say "hi""#), r#"say \"hi\""#);
    }

    #[test]
    fn test_redaction_never_leaks_in_any_format() {
        let options = FormatOptions {
            redact: true,
            export: true,
        };
        for fmt in OutputFormat::ALL {
            let first = format(&sample(), fmt, &options);
            let second = format(&sample(), fmt, &options);
            assert_eq!(first, second, "{:?} output must be stable", fmt);
            assert!(!first.contains("s3cr3t"), "{:?} leaked a secret", fmt);
            assert!(first.contains(REDACTED), "{:?} lost the marker", fmt);
            assert!(first.contains("bar"), "{:?} masked a direct value", fmt);
        }
    }

    #[test]
    fn test_comment_records_skipped_everywhere() {
        for fmt in OutputFormat::ALL {
            let out = format(&sample(), fmt, &FormatOptions::default());
            assert!(!out.contains('#'), "{:?} rendered a comment record", fmt);
        }
    }

    #[test]
    fn test_empty_input() {
        let options = FormatOptions::default();
        assert_eq!(format(&[], OutputFormat::Docker, &options), "");
        assert_eq!(format(&[], OutputFormat::Env, &options), "");
        assert_eq!(format(&[], OutputFormat::Shell, &options), "");
        assert_eq!(format(&[], OutputFormat::Dotenv, &options), "");
        assert_eq!(format(&[], OutputFormat::Compose, &options), "environment:");
    }
}
