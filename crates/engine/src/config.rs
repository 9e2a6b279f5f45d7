//! 추천 엔진 설정
//!
//! [`EngineConfig`]는 core의 [`LogscoutConfig`](logscout_core::config::LogscoutConfig)에서
//! 패턴 관련 설정과 추천 관련 설정을 모아 엔진 조립에 필요한 형태로 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logscout_core::config::LogscoutConfig;
//! use logscout_engine::config::EngineConfig;
//!
//! let core_config = LogscoutConfig::default();
//! let config = EngineConfig::from_core(&core_config);
//! ```

use serde::{Deserialize, Serialize};

use logscout_core::config::{LogscoutConfig, MAX_BATCH_LINES, MAX_REGEX_SIZE_LIMIT, MAX_RESULTS_LIMIT};
use logscout_core::types::RecommendOptions;

use crate::error::EngineError;
use crate::grok::DEFAULT_REGEX_SIZE_LIMIT;
use crate::matcher::DEFAULT_MAX_LINE_BYTES;

/// 추천 엔진 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 포맷 정의 파일 또는 디렉토리 경로
    pub format_paths: Vec<String>,
    /// 사용자 grok 패턴 파일 경로
    pub custom_pattern_paths: Vec<String>,
    /// 내장 포맷 카탈로그 포함 여부
    pub include_builtin: bool,
    /// 알 수 없는 TYPE 을 컴파일 에러로 처리할지 여부
    pub strict_types: bool,
    /// 정규식 프로그램 크기 제한 (바이트)
    pub regex_size_limit: usize,
    /// 매칭을 시도할 최대 라인 길이 (바이트)
    pub max_line_bytes: usize,
    /// 기본 추천 옵션
    pub default_options: RecommendOptions,
    /// 배치 분석 최대 라인 수
    pub batch_max_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            format_paths: Vec::new(),
            custom_pattern_paths: Vec::new(),
            include_builtin: true,
            strict_types: true,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            default_options: RecommendOptions::default(),
            batch_max_lines: 100,
        }
    }
}

impl EngineConfig {
    /// core 설정에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &LogscoutConfig) -> Self {
        let patterns = &core.patterns;
        let recommend = &core.recommend;

        Self {
            format_paths: patterns.format_paths.clone(),
            custom_pattern_paths: patterns.custom_pattern_paths.clone(),
            include_builtin: patterns.include_builtin,
            strict_types: patterns.strict_types,
            regex_size_limit: patterns.regex_size_limit,
            max_line_bytes: recommend.max_line_bytes,
            default_options: RecommendOptions {
                max_results: recommend.max_results,
                min_confidence: recommend.min_confidence,
                exclude_overly_generic: recommend.exclude_overly_generic,
                group: None,
                vendor: None,
            },
            batch_max_lines: recommend.batch_max_lines,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (field, paths) in [
            ("format_paths", &self.format_paths),
            ("custom_pattern_paths", &self.custom_pattern_paths),
        ] {
            if paths.iter().any(|p| p.trim().is_empty()) {
                return Err(EngineError::Config {
                    field: field.to_owned(),
                    reason: "path must not be empty".to_owned(),
                });
            }
        }

        if self.regex_size_limit == 0 || self.regex_size_limit > MAX_REGEX_SIZE_LIMIT {
            return Err(EngineError::Config {
                field: "regex_size_limit".to_owned(),
                reason: format!("must be 1-{MAX_REGEX_SIZE_LIMIT}"),
            });
        }

        if self.max_line_bytes == 0 {
            return Err(EngineError::Config {
                field: "max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.default_options.max_results > MAX_RESULTS_LIMIT {
            return Err(EngineError::Config {
                field: "max_results".to_owned(),
                reason: format!("must be 1-{MAX_RESULTS_LIMIT}"),
            });
        }

        if self.batch_max_lines == 0 || self.batch_max_lines > MAX_BATCH_LINES {
            return Err(EngineError::Config {
                field: "batch_max_lines".to_owned(),
                reason: format!("must be 1-{MAX_BATCH_LINES}"),
            });
        }

        if !self.include_builtin && self.format_paths.is_empty() {
            return Err(EngineError::Config {
                field: "format_paths".to_owned(),
                reason: "no formats configured: set format_paths or enable include_builtin"
                    .to_owned(),
            });
        }

        crate::recommender::validate_options(&self.default_options)
    }
}
