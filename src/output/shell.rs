use super::{FormatOptions, OutputFormatter, display_value, variables};
use crate::extract::EnvVar;

/// One `NAME='value'` assignment per line, optionally exported
pub struct ShellFormatter;

/// Single-quote a value for POSIX shells: `'` becomes `'\''`
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl OutputFormatter for ShellFormatter {
    fn format(vars: &[EnvVar], options: &FormatOptions) -> String {
        let export = if options.export { "export " } else { "" };
        variables(vars)
            .map(|var| {
                format!(
                    "{}{}={}",
                    export,
                    var.name,
                    shell_quote(display_value(var, options))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$HOME \"x\""), "'$HOME \"x\"'");
    }

    #[test]
    fn test_lines() {
        let vars = vec![
            EnvVar::direct("FOO", "bar"),
            EnvVar::config_map_import("cfg", None),
            EnvVar::direct("BAZ", "qux"),
        ];
        let out = ShellFormatter::format(&vars, &FormatOptions::default());
        assert_eq!(out, "FOO='bar'\nBAZ='qux'");
    }

    #[test]
    fn test_export_prefix() {
        let vars = vec![EnvVar::direct("FOO", "bar"), EnvVar::direct("BAZ", "qux")];
        let options = FormatOptions {
            export: true,
            ..Default::default()
        };
        let out = ShellFormatter::format(&vars, &options);
        assert_eq!(out, "export FOO='bar'\nexport BAZ='qux'");
    }
}
