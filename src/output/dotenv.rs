use super::{FormatOptions, OutputFormatter, display_value, escape_double_quotes, variables};
use crate::extract::EnvVar;

/// `.env` file: `NAME="value"` per line
pub struct DotenvFormatter;

impl OutputFormatter for DotenvFormatter {
    fn format(vars: &[EnvVar], options: &FormatOptions) -> String {
        variables(vars)
            .map(|var| {
                let value = escape_double_quotes(display_value(var, options));
                format!("{}=\"{}\"", var.name, value)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotenv_lines() {
        let vars = vec![
            EnvVar::secret_import("bulk", None),
            EnvVar::direct("FOO", "bar"),
            EnvVar::direct("JSON", r#"{"a":1}"#),
        ];
        let out = DotenvFormatter::format(&vars, &FormatOptions::default());
        assert_eq!(out, "FOO=\"bar\"\nJSON=\"{\\\"a\\\":1}\"");
    }
}
