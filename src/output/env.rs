use super::{FormatOptions, OutputFormatter, display_value, escape_double_quotes, variables};
use crate::extract::EnvVar;

/// `NAME="value"` pairs on one line, ready to prefix a command
pub struct EnvFormatter;

impl OutputFormatter for EnvFormatter {
    fn format(vars: &[EnvVar], options: &FormatOptions) -> String {
        variables(vars)
            .map(|var| {
                let value = escape_double_quotes(display_value(var, options));
                format!("{}=\"{}\"", var.name, value)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
