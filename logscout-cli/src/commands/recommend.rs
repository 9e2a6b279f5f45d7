//! `logscout recommend` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use logscout_core::config::LogscoutConfig;
use logscout_core::types::{FormatRecommendation, SkippedFormat};
use logscout_engine::Catalog;

use crate::cli::RecommendArgs;
use crate::commands::{engine_config, ranking_options};
use crate::error::CliError;
use crate::output::{OutputWriter, Render, confidence_colored, or_dash};

/// Execute the `recommend` command.
///
/// # Errors
///
/// Returns `CliError::NoMatch` (exit 3) after rendering when no format matches.
pub async fn execute(
    args: RecommendArgs,
    config: &LogscoutConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let engine = engine_config(config, &args.sources);
    let (recommender, init) = Catalog::load(&engine).await?.into_recommender(&engine)?;

    let mut options = ranking_options(&engine.default_options, &args.ranking);
    options.group = args.group;
    options.vendor = args.vendor;

    let recommendations = recommender.recommend(&args.line, &options)?;
    info!(
        results = recommendations.len(),
        top = recommendations.first().map(|r| r.format_name.as_str()),
        "recommend command complete"
    );

    let report = RecommendReport {
        line: args.line,
        recommendations,
        skipped_formats: init.skipped,
    };
    writer.render(&report)?;

    if report.recommendations.is_empty() {
        return Err(CliError::NoMatch(
            "the line matched none of the loaded formats".to_owned(),
        ));
    }

    Ok(())
}

/// Ranked recommendations for one line.
#[derive(Serialize)]
pub struct RecommendReport {
    pub line: String,
    pub recommendations: Vec<FormatRecommendation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_formats: Vec<SkippedFormat>,
}

impl Render for RecommendReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Line: {}", self.line.bold())?;
        writeln!(w)?;

        if self.recommendations.is_empty() {
            writeln!(w, "{}", "No matching format found.".yellow())?;
        } else {
            writeln!(
                w,
                "{:<4} {:<24} {:>6} {:>11} {:<16} Vendor",
                "#", "Format", "Conf", "Specificity", "Group"
            )?;
            writeln!(w, "{}", "-".repeat(80))?;

            for (rank, r) in self.recommendations.iter().enumerate() {
                writeln!(
                    w,
                    "{:<4} {:<24} {} {:>11.2} {:<16} {}",
                    rank + 1,
                    r.format_name,
                    confidence_colored(r.confidence),
                    r.specificity,
                    or_dash(r.group.as_deref()),
                    or_dash(r.vendor.as_deref()),
                )?;
            }

            if let Some(top) = self.recommendations.first() {
                writeln!(w)?;
                writeln!(w, "Fields ({}):", top.format_name.bold())?;
                for (name, value) in &top.matched_fields {
                    writeln!(w, "  {:<20} {}", name.cyan(), value)?;
                }
            }
        }

        if !self.skipped_formats.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "{} {} formats skipped at load:",
                "warning:".yellow().bold(),
                self.skipped_formats.len()
            )?;
            for s in &self.skipped_formats {
                writeln!(w, "  {}: {}", s.format_name, s.reason)?;
            }
        }

        Ok(())
    }
}
