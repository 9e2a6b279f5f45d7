//! `logscout config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use logscout_core::config::LogscoutConfig;
use logscout_engine::EngineConfig;

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::commands::load_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show`.
const SECTIONS: &[&str] = &["general", "patterns", "recommend"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

fn source_label(config_path: Option<&Path>) -> String {
    config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned())
}

/// Load the configuration and run the engine-level checks on top of the core ones.
///
/// # Errors
///
/// Returns `CliError::Config` after rendering the report when validation fails.
async fn execute_validate(config_path: Option<&Path>, writer: &OutputWriter) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(path = %source, "validating configuration");

    let errors = match load_config(config_path).await {
        Ok(config) => match EngineConfig::from_core(&config).validate() {
            Ok(()) => Vec::new(),
            Err(e) => vec![e.to_string()],
        },
        Err(e) => vec![e.to_string()],
    };

    let report = ConfigValidationReport {
        source,
        valid: errors.is_empty(),
        errors,
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Show the effective configuration, optionally one section only.
async fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let source = source_label(config_path);
    info!(path = %source, "loading configuration");

    let config = load_config(config_path).await?;
    let config_toml = render_section(&config, section.as_deref())?;

    let report = ConfigReport {
        source,
        section,
        config_toml,
    };
    writer.render(&report)?;

    Ok(())
}

fn render_section(config: &LogscoutConfig, section: Option<&str>) -> Result<String, CliError> {
    let rendered = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("patterns") => toml::to_string_pretty(&config.patterns),
        Some("recommend") => toml::to_string_pretty(&config.recommend),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {other} (expected: {})",
                SECTIONS.join(", ")
            )));
        }
    };
    rendered.map_err(|e| CliError::Command(format!("failed to serialize configuration: {e}")))
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{section}]");
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    #[test]
    fn test_render_section_known_sections() {
        let config = LogscoutConfig::default();
        let patterns = render_section(&config, Some("patterns")).expect("patterns section");
        assert!(patterns.contains("include_builtin"));

        let recommend = render_section(&config, Some("recommend")).expect("recommend section");
        assert!(recommend.contains("max_results"));

        let full = render_section(&config, None).expect("full config");
        assert!(full.contains("[general]"));
        assert!(full.contains("[recommend]"));
    }

    #[test]
    fn test_render_section_unknown_section_fails() {
        let err = render_section(&LogscoutConfig::default(), Some("ebpf"))
            .expect_err("unknown section should fail");
        assert!(err.to_string().contains("unknown section"));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_validate_reports_engine_level_errors() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("logscout.toml");
        std::fs::write(&path, "[patterns]\ninclude_builtin = false\n").expect("should write");

        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_validate(Some(&path), &writer)
            .await
            .expect_err("no format source should be invalid");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_validate_valid_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("logscout.toml");
        std::fs::write(&path, "[recommend]\nmax_results = 3\n").expect("should write");

        let writer = OutputWriter::new(OutputFormat::Json);
        execute_validate(Some(&path), &writer)
            .await
            .expect("config should be valid");
    }

    #[test]
    fn test_config_report_render_text_specific_section() {
        let report = ConfigReport {
            source: "/etc/logscout.toml".to_owned(),
            section: Some("patterns".to_owned()),
            config_toml: "strict_types = true".to_owned(),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("[patterns]"), "should show section name");
        assert!(output.contains("strict_types"), "should show config content");
    }

    #[test]
    fn test_config_report_json_skips_toml() {
        let report = ConfigReport {
            source: "test.toml".to_owned(),
            section: None,
            config_toml: "x = 1".to_owned(),
        };
        let parsed = serde_json::to_value(&report).expect("JSON serialization should succeed");
        assert_eq!(parsed["source"].as_str(), Some("test.toml"));
        assert!(parsed.get("config_toml").is_none());
        assert!(parsed.get("section").is_none());
    }

    #[test]
    fn test_config_validation_report_invalid() {
        let report = ConfigValidationReport {
            source: "bad.toml".to_owned(),
            valid: false,
            errors: vec!["recommend.max_results: must be 1-1000".to_owned()],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("INVALID"));
        assert!(output.contains("max_results"));
    }
}
