use super::{FormatOptions, OutputFormatter, display_value, escape_double_quotes, variables};
use crate::extract::EnvVar;

/// `docker run` flags: `-e NAME="value"` joined by spaces
pub struct DockerFormatter;

impl OutputFormatter for DockerFormatter {
    fn format(vars: &[EnvVar], options: &FormatOptions) -> String {
        variables(vars)
            .map(|var| {
                let value = escape_double_quotes(display_value(var, options));
                format!("-e {}=\"{}\"", var.name, value)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
