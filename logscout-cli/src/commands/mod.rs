//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod config;
pub mod formats;
pub mod recommend;

use std::path::Path;

use tracing::debug;

use logscout_core::config::LogscoutConfig;
use logscout_core::types::RecommendOptions;
use logscout_engine::EngineConfig;

use crate::cli::{DEFAULT_CONFIG_PATH, FormatSourceArgs, RankingArgs};
use crate::error::CliError;

/// Load the effective configuration.
///
/// An explicitly given path must exist; the default path falls back to
/// defaults plus environment overrides when the file is missing.
pub async fn load_config(path: Option<&Path>) -> Result<LogscoutConfig, CliError> {
    let config = match path {
        Some(path) => LogscoutConfig::load(path).await?,
        None => LogscoutConfig::load_or_default(DEFAULT_CONFIG_PATH).await?,
    };
    Ok(config)
}

/// Build the engine configuration, placing `--formats` paths ahead of the configured ones.
pub fn engine_config(config: &LogscoutConfig, sources: &FormatSourceArgs) -> EngineConfig {
    let mut engine = EngineConfig::from_core(config);
    if !sources.formats.is_empty() {
        let mut paths: Vec<String> = sources
            .formats
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        paths.append(&mut engine.format_paths);
        engine.format_paths = paths;
    }
    debug!(
        format_paths = ?engine.format_paths,
        include_builtin = engine.include_builtin,
        "engine configuration resolved"
    );
    engine
}

/// Apply CLI ranking flags on top of the configured defaults.
pub fn ranking_options(base: &RecommendOptions, ranking: &RankingArgs) -> RecommendOptions {
    let mut options = base.clone();
    if let Some(top) = ranking.top {
        options.max_results = top;
    }
    if let Some(min) = ranking.min_confidence {
        options.min_confidence = Some(min);
    }
    if ranking.include_generic {
        options.exclude_overly_generic = false;
    }
    options
}
