//! 카탈로그 조립 -- 설정에 따라 패턴 라이브러리와 포맷 정의를 로드합니다.
//!
//! 모든 파일 I/O 는 [`Catalog::load`] 에서 끝나며, 이후 생성되는 추천기는
//! 추천 시점에 I/O 를 수행하지 않습니다.
//!
//! 포맷 우선순위: `format_paths` 에 나열된 순서대로, 그 뒤에 내장 카탈로그.
//! 같은 이름이 여러 번 나오면 먼저 로드된 정의가 사용됩니다.

use logscout_core::types::{InitResult, LogFormat};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::field::FieldTypeRegistry;
use crate::grok::{GrokCompiler, PatternLibrary};
use crate::loader::FormatLoader;
use crate::recommender::{FormatRecommender, RecommenderBuilder};
use crate::validation::{FormatValidation, validate_formats};

/// 로드된 포맷 카탈로그와 이를 컴파일할 grok 컴파일러
#[derive(Debug, Clone)]
pub struct Catalog {
    compiler: GrokCompiler,
    formats: Vec<LogFormat>,
}

impl Catalog {
    /// 설정에 따라 패턴 파일과 포맷 정의를 로드합니다.
    ///
    /// # Errors
    /// - 설정 검증 실패
    /// - 패턴 파일 또는 포맷 경로를 읽을 수 없는 경우
    pub async fn load(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let mut library = PatternLibrary::builtin();
        for path in &config.custom_pattern_paths {
            library.load_file(path).await?;
        }

        let compiler = GrokCompiler::new(library)
            .with_strict(config.strict_types)
            .with_size_limit(config.regex_size_limit);

        let mut formats = Vec::new();
        for path in &config.format_paths {
            formats.extend(FormatLoader::load_path(path).await?);
        }
        if config.include_builtin {
            formats.extend(FormatLoader::builtin()?);
        }
        let formats = FormatLoader::dedup(formats);

        tracing::info!(
            formats = formats.len(),
            patterns = compiler.library().len(),
            format_paths = config.format_paths.len(),
            include_builtin = config.include_builtin,
            "format catalog loaded"
        );

        Ok(Self { compiler, formats })
    }

    /// 이미 준비된 컴파일러와 포맷으로 카탈로그를 구성합니다.
    pub fn new(compiler: GrokCompiler, formats: Vec<LogFormat>) -> Self {
        Self { compiler, formats }
    }

    /// 로드된 포맷 (우선순위 순)
    pub fn formats(&self) -> &[LogFormat] {
        &self.formats
    }

    /// grok 컴파일러
    pub fn compiler(&self) -> &GrokCompiler {
        &self.compiler
    }

    /// 그룹/벤더 조건에 맞는 포맷만 남깁니다 (대소문자 무시).
    pub fn filter(mut self, group: Option<&str>, vendor: Option<&str>) -> Self {
        let keep = |value: Option<&String>, wanted: Option<&str>| match wanted {
            None => true,
            Some(w) => value.is_some_and(|v| v.eq_ignore_ascii_case(w)),
        };
        self.formats
            .retain(|f| keep(f.group.as_ref(), group) && keep(f.vendor.as_ref(), vendor));
        self
    }

    /// 모든 포맷의 템플릿과 샘플을 검증합니다.
    pub fn validate(&self, registry: &FieldTypeRegistry) -> Vec<FormatValidation> {
        validate_formats(&self.compiler, registry, &self.formats)
    }

    /// 카탈로그를 컴파일하여 초기화된 추천기를 생성합니다.
    pub fn into_recommender(
        self,
        config: &EngineConfig,
    ) -> Result<(FormatRecommender, InitResult), EngineError> {
        let recommender = RecommenderBuilder::new()
            .compiler(self.compiler)
            .max_line_bytes(config.max_line_bytes)
            .build()?;
        let init = recommender.initialize(self.formats)?;
        Ok((recommender, init))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logscout_core::types::RecommendOptions;

    #[tokio::test]
    async fn default_config_loads_builtin_catalog() {
        let config = EngineConfig::default();
        let catalog = Catalog::load(&config).await.unwrap();
        assert!(catalog.formats().iter().any(|f| f.name == "apache_access"));

        let (recommender, init) = catalog.into_recommender(&config).unwrap();
        assert!(init.skipped.is_empty(), "{:?}", init.skipped);

        let line = r#"192.168.1.100 - - [05/Aug/2025:10:15:30 +0900] "GET /index.html HTTP/1.1" 200 1234"#;
        let results = recommender
            .recommend(line, &RecommendOptions::default())
            .unwrap();
        assert_eq!(results[0].format_name, "apache_access");
    }

    #[tokio::test]
    async fn user_formats_shadow_builtin_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("override.yml"),
            "- name: apache_access\n  template: 'custom=%{INT:n}'\n- name: extra\n  template: 'x=%{INT:x}'\n",
        )
        .unwrap();

        let config = EngineConfig {
            format_paths: vec![dir.path().display().to_string()],
            ..Default::default()
        };
        let catalog = Catalog::load(&config).await.unwrap();

        let apache: Vec<&LogFormat> = catalog
            .formats()
            .iter()
            .filter(|f| f.name == "apache_access")
            .collect();
        assert_eq!(apache.len(), 1);
        assert_eq!(apache[0].template, "custom=%{INT:n}");
        assert_eq!(catalog.formats()[1].name, "extra");
    }

    #[tokio::test]
    async fn custom_patterns_are_available_to_formats() {
        let dir = tempfile::tempdir().unwrap();
        let patterns = dir.path().join("fw.patterns");
        std::fs::write(&patterns, "FW_ACTION (?:allow|deny)\n").unwrap();
        let formats = dir.path().join("fw.yml");
        std::fs::write(
            &formats,
            "- name: fw\n  template: 'action=%{FW_ACTION:action} src=%{IP:src} dst=%{IP:dst}'\n",
        )
        .unwrap();

        let config = EngineConfig {
            format_paths: vec![formats.display().to_string()],
            custom_pattern_paths: vec![patterns.display().to_string()],
            include_builtin: false,
            ..Default::default()
        };
        let catalog = Catalog::load(&config).await.unwrap();
        let (recommender, init) = catalog.into_recommender(&config).unwrap();
        assert_eq!(init.compiled_count, 1);

        let results = recommender
            .recommend("action=deny src=10.0.0.1 dst=10.0.0.2", &RecommendOptions::default())
            .unwrap();
        assert_eq!(results[0].format_name, "fw");
    }

    #[tokio::test]
    async fn missing_format_path_is_an_error() {
        let config = EngineConfig {
            format_paths: vec!["/nonexistent/formats".to_owned()],
            ..Default::default()
        };
        assert!(matches!(
            Catalog::load(&config).await,
            Err(EngineError::FormatLoad { .. })
        ));
    }

    #[test]
    fn filter_keeps_matching_group() {
        let catalog = Catalog::new(
            GrokCompiler::default(),
            vec![
                LogFormat::new("a", "%{INT:a}").with_group("Firewall"),
                LogFormat::new("b", "%{INT:b}").with_group("System"),
                LogFormat::new("c", "%{INT:c}"),
            ],
        )
        .filter(Some("firewall"), None);
        assert_eq!(catalog.formats().len(), 1);
        assert_eq!(catalog.formats()[0].name, "a");
    }
}
