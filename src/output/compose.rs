use super::{FormatOptions, OutputFormatter, display_value, variables};
use crate::extract::EnvVar;

/// `environment:` block for a docker-compose service
pub struct ComposeFormatter;

/// Escape for a YAML double-quoted scalar, where `\` starts an escape sequence
fn yaml_double_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl OutputFormatter for ComposeFormatter {
    fn format(vars: &[EnvVar], options: &FormatOptions) -> String {
        let mut lines = vec!["environment:".to_string()];

        for var in variables(vars) {
            let value = display_value(var, options);
            if value.contains('\n') {
                // block literal keeps embedded newlines intact
                lines.push(format!("  {}: |", var.name));
                lines.extend(value.split('\n').map(|line| format!("    {}", line)));
            } else {
                lines.push(format!("  {}: \"{}\"", var.name, yaml_double_quoted(value)));
            }
        }

        lines.join("\n")
    }
}
