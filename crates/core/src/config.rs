//! 설정 관리 — logscout.toml 파싱 및 런타임 설정
//!
//! [`LogscoutConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGSCOUT_RECOMMEND_MAX_RESULTS=10` 형식)
//! 3. 설정 파일 (`logscout.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logscout_core::error::LogscoutError> {
//! use logscout_core::config::LogscoutConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogscoutConfig::load("logscout.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogscoutConfig::parse("[recommend]\nmax_results = 3")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogscoutError};

/// `max_results` 상한
pub const MAX_RESULTS_LIMIT: usize = 1_000;

/// 정규식 프로그램 크기 상한 (바이트)
pub const MAX_REGEX_SIZE_LIMIT: usize = 256 * 1024 * 1024;

/// 배치 분석 라인 수 상한
pub const MAX_BATCH_LINES: usize = 100_000;

/// logscout 통합 설정
///
/// `logscout.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogscoutConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 패턴/포맷 정의 설정
    #[serde(default)]
    pub patterns: PatternsConfig,
    /// 추천 설정
    #[serde(default)]
    pub recommend: RecommendConfig,
}

impl LogscoutConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogscoutError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    ///
    /// CLI 가 기본 경로(`logscout.toml`)를 사용할 때 호출합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LogscoutError> {
        match Self::load(path).await {
            Err(LogscoutError::Config(ConfigError::FileNotFound { .. })) => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogscoutError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogscoutError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogscoutError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogscoutError> {
        toml::from_str(toml_str).map_err(|e| {
            LogscoutError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGSCOUT_{SECTION}_{FIELD}`
    /// 예: `LOGSCOUT_PATTERNS_FORMAT_PATHS=/etc/logscout/formats`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGSCOUT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGSCOUT_GENERAL_LOG_FORMAT");

        // Patterns
        override_csv(
            &mut self.patterns.format_paths,
            "LOGSCOUT_PATTERNS_FORMAT_PATHS",
        );
        override_csv(
            &mut self.patterns.custom_pattern_paths,
            "LOGSCOUT_PATTERNS_CUSTOM_PATTERN_PATHS",
        );
        override_bool(
            &mut self.patterns.include_builtin,
            "LOGSCOUT_PATTERNS_INCLUDE_BUILTIN",
        );
        override_bool(
            &mut self.patterns.strict_types,
            "LOGSCOUT_PATTERNS_STRICT_TYPES",
        );
        override_usize(
            &mut self.patterns.regex_size_limit,
            "LOGSCOUT_PATTERNS_REGEX_SIZE_LIMIT",
        );

        // Recommend
        override_usize(
            &mut self.recommend.max_results,
            "LOGSCOUT_RECOMMEND_MAX_RESULTS",
        );
        override_opt_f64(
            &mut self.recommend.min_confidence,
            "LOGSCOUT_RECOMMEND_MIN_CONFIDENCE",
        );
        override_bool(
            &mut self.recommend.exclude_overly_generic,
            "LOGSCOUT_RECOMMEND_EXCLUDE_OVERLY_GENERIC",
        );
        override_usize(
            &mut self.recommend.max_line_bytes,
            "LOGSCOUT_RECOMMEND_MAX_LINE_BYTES",
        );
        override_usize(
            &mut self.recommend.batch_max_lines,
            "LOGSCOUT_RECOMMEND_BATCH_MAX_LINES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogscoutError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.patterns.regex_size_limit == 0
            || self.patterns.regex_size_limit > MAX_REGEX_SIZE_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "patterns.regex_size_limit".to_owned(),
                reason: format!("must be between 1 and {MAX_REGEX_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.recommend.max_results == 0 || self.recommend.max_results > MAX_RESULTS_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "recommend.max_results".to_owned(),
                reason: format!("must be between 1 and {MAX_RESULTS_LIMIT}"),
            }
            .into());
        }

        if let Some(min) = self.recommend.min_confidence
            && !(0.0..=100.0).contains(&min)
        {
            return Err(ConfigError::InvalidValue {
                field: "recommend.min_confidence".to_owned(),
                reason: "must be between 0 and 100".to_owned(),
            }
            .into());
        }

        if self.recommend.max_line_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recommend.max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.recommend.batch_max_lines == 0 || self.recommend.batch_max_lines > MAX_BATCH_LINES
        {
            return Err(ConfigError::InvalidValue {
                field: "recommend.batch_max_lines".to_owned(),
                reason: format!("must be between 1 and {MAX_BATCH_LINES}"),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 패턴/포맷 정의 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// 포맷 정의 파일 또는 디렉토리 (.yml, .yaml, .json)
    pub format_paths: Vec<String>,
    /// 사용자 grok 패턴 파일 (`NAME definition` 라인 형식)
    pub custom_pattern_paths: Vec<String>,
    /// 내장 포맷 카탈로그 포함 여부
    pub include_builtin: bool,
    /// 알 수 없는 TYPE 을 컴파일 에러로 처리할지 여부
    pub strict_types: bool,
    /// 포맷 하나당 정규식 프로그램 크기 상한 (바이트)
    pub regex_size_limit: usize,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            format_paths: Vec::new(),
            custom_pattern_paths: Vec::new(),
            include_builtin: true,
            strict_types: true,
            regex_size_limit: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// 추천 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// 반환할 최대 추천 수
    pub max_results: usize,
    /// 최소 신뢰도 (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    /// 지나치게 일반적인 포맷 제외 여부
    pub exclude_overly_generic: bool,
    /// 매칭을 시도할 최대 라인 길이 (바이트)
    pub max_line_bytes: usize,
    /// 파일 분석 시 읽을 최대 라인 수
    pub batch_max_lines: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            min_confidence: None,
            exclude_overly_generic: true,
            max_line_bytes: 1024 * 1024, // 1MB
            batch_max_lines: 100,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_opt_f64(target: &mut Option<f64>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        if val.trim().is_empty() {
            *target = None;
            return;
        }
        match val.parse::<f64>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse f64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = LogscoutConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.patterns.include_builtin);
        assert!(config.patterns.strict_types);
        assert_eq!(config.recommend.max_results, 5);
        assert!(config.recommend.min_confidence.is_none());
        assert!(config.recommend.exclude_overly_generic);
        assert_eq!(config.recommend.batch_max_lines, 100);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = LogscoutConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = LogscoutConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.recommend.max_results, 5);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[recommend]
max_results = 3
min_confidence = 60.0
"#;
        let config = LogscoutConfig::parse(toml).unwrap();
        assert_eq!(config.recommend.max_results, 3);
        assert_eq!(config.recommend.min_confidence, Some(60.0));
        // 나머지는 기본값 유지
        assert!(config.recommend.exclude_overly_generic);
        assert!(config.patterns.include_builtin);
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[patterns]
format_paths = ["/etc/logscout/formats", "./local.yml"]
custom_pattern_paths = ["/etc/logscout/patterns/custom"]
include_builtin = false
strict_types = false
regex_size_limit = 1048576

[recommend]
max_results = 10
min_confidence = 40.5
exclude_overly_generic = false
max_line_bytes = 4096
batch_max_lines = 500
"#;
        let config = LogscoutConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.patterns.format_paths.len(), 2);
        assert_eq!(
            config.patterns.custom_pattern_paths,
            vec!["/etc/logscout/patterns/custom"]
        );
        assert!(!config.patterns.include_builtin);
        assert!(!config.patterns.strict_types);
        assert_eq!(config.patterns.regex_size_limit, 1_048_576);
        assert_eq!(config.recommend.max_results, 10);
        assert_eq!(config.recommend.min_confidence, Some(40.5));
        assert!(!config.recommend.exclude_overly_generic);
        assert_eq!(config.recommend.max_line_bytes, 4096);
        assert_eq!(config.recommend.batch_max_lines, 500);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = LogscoutConfig::parse("[recommend\nmax_results = ");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LogscoutError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = LogscoutConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = LogscoutConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_max_results() {
        let mut config = LogscoutConfig::default();
        config.recommend.max_results = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn validate_rejects_out_of_range_min_confidence() {
        let mut config = LogscoutConfig::default();
        config.recommend.min_confidence = Some(120.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_confidence"));

        config.recommend.min_confidence = Some(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_regex_size_limit() {
        let mut config = LogscoutConfig::default();
        config.patterns.regex_size_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("regex_size_limit"));
    }

    #[test]
    fn validate_rejects_zero_batch_lines() {
        let mut config = LogscoutConfig::default();
        config.recommend.batch_max_lines = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_max_lines"));
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGSCOUT_STR", "overridden") };
        override_string(&mut val, "TEST_LOGSCOUT_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LOGSCOUT_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGSCOUT_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_LOGSCOUT_BOOL_BAD");
        assert!(!val); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_LOGSCOUT_BOOL_BAD") };
    }

    #[test]
    fn env_override_opt_f64() {
        let mut val = None;
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGSCOUT_F64", "72.5") };
        override_opt_f64(&mut val, "TEST_LOGSCOUT_F64");
        assert_eq!(val, Some(72.5));

        unsafe { std::env::set_var("TEST_LOGSCOUT_F64", "") };
        override_opt_f64(&mut val, "TEST_LOGSCOUT_F64");
        assert_eq!(val, None);

        unsafe { std::env::set_var("TEST_LOGSCOUT_F64", "high") };
        val = Some(10.0);
        override_opt_f64(&mut val, "TEST_LOGSCOUT_F64");
        assert_eq!(val, Some(10.0));
        unsafe { std::env::remove_var("TEST_LOGSCOUT_F64") };
    }

    #[test]
    fn env_override_csv_skips_empty_entries() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: 고유한 키를 사용하며 다른 테스트와 공유하지 않습니다.
        unsafe { std::env::set_var("TEST_LOGSCOUT_CSV", "x, y,, z") };
        override_csv(&mut val, "TEST_LOGSCOUT_CSV");
        assert_eq!(val, vec!["x", "y", "z"]);
        unsafe { std::env::remove_var("TEST_LOGSCOUT_CSV") };
    }

    #[test]
    #[serial]
    fn apply_env_overrides_reads_logscout_prefix() {
        // SAFETY: #[serial] 로 환경변수를 사용하는 테스트를 직렬화합니다.
        unsafe {
            std::env::set_var("LOGSCOUT_RECOMMEND_MAX_RESULTS", "9");
            std::env::set_var("LOGSCOUT_PATTERNS_FORMAT_PATHS", "a.yml,b.yml");
        }
        let mut config = LogscoutConfig::default();
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("LOGSCOUT_RECOMMEND_MAX_RESULTS");
            std::env::remove_var("LOGSCOUT_PATTERNS_FORMAT_PATHS");
        }

        assert_eq!(config.recommend.max_results, 9);
        assert_eq!(config.patterns.format_paths, vec!["a.yml", "b.yml"]);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = LogscoutConfig::default();
        config.recommend.min_confidence = Some(55.0);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = LogscoutConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(parsed.recommend.min_confidence, Some(55.0));
        assert_eq!(
            config.patterns.regex_size_limit,
            parsed.patterns.regex_size_limit
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = LogscoutConfig::from_file("/nonexistent/path/logscout.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LogscoutError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn load_or_default_falls_back_when_missing() {
        let config = LogscoutConfig::load_or_default("/nonexistent/path/logscout.toml")
            .await
            .unwrap();
        assert_eq!(config.recommend.max_results, 5);
    }

    #[tokio::test]
    #[serial]
    async fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logscout.toml");
        std::fs::write(&path, "[recommend]\nmax_results = 2\n").unwrap();

        let config = LogscoutConfig::load(&path).await.unwrap();
        assert_eq!(config.recommend.max_results, 2);
    }

    #[tokio::test]
    async fn load_or_default_propagates_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logscout.toml");
        std::fs::write(&path, "[recommend]\nmax_results = \"many\"\n").unwrap();

        let err = LogscoutConfig::load_or_default(&path).await.unwrap_err();
        assert!(matches!(
            err,
            LogscoutError::Config(ConfigError::ParseFailed { .. })
        ));
    }
}
