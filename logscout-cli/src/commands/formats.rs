//! `logscout formats` command handler

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use tracing::info;

use logscout_core::config::LogscoutConfig;
use logscout_core::types::SkippedFormat;
use logscout_engine::{
    Catalog, FieldTypeRegistry, FormatValidation, Specificity, ValidationStatus,
    ValidationSummary,
};

use crate::cli::{FormatSourceArgs, FormatsAction, FormatsArgs};
use crate::commands::engine_config;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, or_dash};

/// Execute the `formats` command.
pub async fn execute(
    args: FormatsArgs,
    config: &LogscoutConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        FormatsAction::List {
            group,
            vendor,
            sources,
        } => execute_list(config, &sources, group.as_deref(), vendor.as_deref(), writer).await,
        FormatsAction::Stats { sources } => execute_stats(config, &sources, writer).await,
        FormatsAction::Validate { sources } => execute_validate(config, &sources, writer).await,
    }
}

async fn execute_list(
    config: &LogscoutConfig,
    sources: &FormatSourceArgs,
    group: Option<&str>,
    vendor: Option<&str>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = engine_config(config, sources);
    let catalog = Catalog::load(&engine).await?.filter(group, vendor);
    let registry = FieldTypeRegistry::with_builtin();

    let report = FormatListReport {
        total: catalog.formats().len(),
        formats: catalog
            .formats()
            .iter()
            .map(|f| {
                let specificity = Specificity::of(&f.template, &registry);
                FormatEntry {
                    name: f.name.clone(),
                    group: f.group.clone(),
                    vendor: f.vendor.clone(),
                    description: f.description.clone(),
                    template: f.template.clone(),
                    specificity: specificity.score,
                    overly_generic: specificity.overly_generic,
                }
            })
            .collect(),
    };

    writer.render(&report)?;
    Ok(())
}

async fn execute_stats(
    config: &LogscoutConfig,
    sources: &FormatSourceArgs,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = engine_config(config, sources);
    let (recommender, init) = Catalog::load(&engine).await?.into_recommender(&engine)?;

    let report = FormatStatsReport {
        compiled: init.compiled_count,
        skipped: init.skipped,
        groups: recommender.group_statistics()?,
        vendors: recommender.vendor_statistics()?,
    };

    writer.render(&report)?;
    Ok(())
}

async fn execute_validate(
    config: &LogscoutConfig,
    sources: &FormatSourceArgs,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = engine_config(config, sources);
    let catalog = Catalog::load(&engine).await?;

    info!(formats = catalog.formats().len(), "validating format catalog");
    let results = catalog.validate(&FieldTypeRegistry::with_builtin());

    let report = FormatValidationReport {
        summary: ValidationSummary::of(&results),
        results,
    };
    writer.render(&report)?;

    if report.summary.failed > 0 {
        return Err(CliError::Command(format!(
            "{} formats failed validation",
            report.summary.failed
        )));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct FormatListReport {
    pub total: usize,
    pub formats: Vec<FormatEntry>,
}

#[derive(Serialize)]
pub struct FormatEntry {
    pub name: String,
    pub group: Option<String>,
    pub vendor: Option<String>,
    pub description: Option<String>,
    pub template: String,
    pub specificity: f64,
    pub overly_generic: bool,
}

impl Render for FormatListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Formats ({} total)", self.total.to_string().bold())?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<24} {:<16} {:<14} {:>11}  Description",
            "Name", "Group", "Vendor", "Specificity"
        )?;
        writeln!(w, "{}", "-".repeat(90))?;

        for f in &self.formats {
            let specificity = format!("{:>11.2}", f.specificity);
            let specificity = if f.overly_generic {
                specificity.yellow()
            } else {
                specificity.normal()
            };
            writeln!(
                w,
                "{:<24} {:<16} {:<14} {}  {}",
                f.name,
                or_dash(f.group.as_deref()),
                or_dash(f.vendor.as_deref()),
                specificity,
                or_dash(f.description.as_deref()),
            )?;
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct FormatStatsReport {
    pub compiled: usize,
    pub skipped: Vec<SkippedFormat>,
    pub groups: BTreeMap<String, usize>,
    pub vendors: BTreeMap<String, usize>,
}

impl Render for FormatStatsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Formats: {} compiled, {} skipped",
            self.compiled.to_string().green(),
            if self.skipped.is_empty() {
                "0".normal()
            } else {
                self.skipped.len().to_string().red()
            }
        )?;

        for (title, counts) in [("Groups", &self.groups), ("Vendors", &self.vendors)] {
            writeln!(w)?;
            writeln!(w, "{}", title.bold())?;
            for (name, count) in counts {
                writeln!(w, "  {name:<24} {count:>5}")?;
            }
        }

        if !self.skipped.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", "Skipped".bold())?;
            for s in &self.skipped {
                writeln!(w, "  {}: {}", s.format_name.red(), s.reason)?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct FormatValidationReport {
    pub summary: ValidationSummary,
    pub results: Vec<FormatValidation>,
}

impl Render for FormatValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for r in &self.results {
            let status = match r.status {
                ValidationStatus::Pass => r.status.to_string().green(),
                ValidationStatus::Warning => r.status.to_string().yellow(),
                ValidationStatus::Fail => r.status.to_string().red().bold(),
            };
            writeln!(
                w,
                "[{status:^7}] {} (specificity {:.2})",
                r.format_name, r.specificity.score
            )?;
            for e in &r.errors {
                writeln!(w, "    error: {}", e.red())?;
            }
            for warning in &r.warnings {
                writeln!(w, "    warning: {warning}")?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "Validation: {} total, {} passed, {} warnings, {} failed",
            self.summary.total,
            self.summary.passed.to_string().green(),
            self.summary.warnings.to_string().yellow(),
            if self.summary.failed > 0 {
                self.summary.failed.to_string().red()
            } else {
                self.summary.failed.to_string().normal()
            }
        )?;

        Ok(())
    }
}
