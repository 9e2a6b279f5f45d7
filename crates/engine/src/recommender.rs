//! 포맷 추천기 -- 컴파일된 포맷 집합에 대한 매칭과 순위 산정
//!
//! [`FormatRecommender`]는 [`RecommenderBuilder`]로 생성되며, 생성 직후에는
//! 초기화되지 않은 상태입니다. [`FormatRecommender::initialize`]가 포맷을 한 번
//! 컴파일하여 `OnceLock` 에 저장하고, 이후에는 읽기 전용으로만 사용됩니다.
//!
//! # 순위 산정
//! ```text
//! confidence = 100 * (0.5 * field_validity + 0.3 * literal_coverage + 0.2 * specificity)
//! ```
//! 신뢰도 내림차순, 특이도 내림차순, 포맷 이름 오름차순으로 정렬합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logscout_engine::RecommenderBuilder;
//!
//! let recommender = RecommenderBuilder::new().build()?;
//! recommender.initialize(formats)?;
//! let results = recommender.recommend(line, &RecommendOptions::default())?;
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use logscout_core::metrics as m;
use logscout_core::pipeline::TemplateCompiler;
use logscout_core::types::{
    FormatRecommendation, InitResult, LogFormat, MatchOutcome, RecommendOptions, SkippedFormat,
};

use crate::error::EngineError;
use crate::field::FieldTypeRegistry;
use crate::grok::GrokCompiler;
use crate::matcher::{DEFAULT_MAX_LINE_BYTES, FieldMatcher};
use crate::specificity::Specificity;

/// 필드 검증 비율 가중치
pub const VALIDITY_WEIGHT: f64 = 0.5;

/// 리터럴 커버리지 가중치
pub const COVERAGE_WEIGHT: f64 = 0.3;

/// 특이도 가중치
pub const SPECIFICITY_WEIGHT: f64 = 0.2;

/// 그룹/벤더가 없는 포맷의 통계 버킷
const UNKNOWN_BUCKET: &str = "unknown";

/// 매칭 결과와 특이도로 신뢰도(0-100)를 계산합니다.
pub fn confidence(outcome: &MatchOutcome, specificity: f64) -> f64 {
    let raw = VALIDITY_WEIGHT * outcome.field_validity_ratio
        + COVERAGE_WEIGHT * outcome.literal_coverage
        + SPECIFICITY_WEIGHT * specificity;
    (100.0 * raw).clamp(0.0, 100.0)
}

/// 추천 옵션을 검증합니다.
pub fn validate_options(options: &RecommendOptions) -> Result<(), EngineError> {
    if options.max_results == 0 {
        return Err(EngineError::InvalidOptions {
            field: "max_results".to_owned(),
            reason: "must be greater than 0".to_owned(),
        });
    }

    if let Some(min) = options.min_confidence
        && !(0.0..=100.0).contains(&min)
    {
        return Err(EngineError::InvalidOptions {
            field: "min_confidence".to_owned(),
            reason: format!("must be between 0 and 100, got {min}"),
        });
    }

    Ok(())
}

/// 추천 결과 정렬 순서: 신뢰도 내림차순, 특이도 내림차순, 이름 오름차순
pub fn ranking_order(a: &FormatRecommendation, b: &FormatRecommendation) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.specificity.total_cmp(&a.specificity))
        .then_with(|| a.format_name.cmp(&b.format_name))
}

fn matches_filter(value: Option<&str>, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.eq_ignore_ascii_case(wanted)),
    }
}

/// 컴파일된 포맷
struct CompiledFormat<P> {
    format: LogFormat,
    pattern: P,
    specificity: Specificity,
}

/// 초기화 이후 불변인 컴파일 집합
struct CompiledSet<P> {
    formats: Vec<CompiledFormat<P>>,
    by_name: HashMap<String, usize>,
}

/// 배치 추천에서 한 라인의 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecommendations {
    /// 1부터 시작하는 라인 번호
    pub line_number: usize,
    /// 원본 라인
    pub line: String,
    /// 추천 결과 (순위순)
    pub recommendations: Vec<FormatRecommendation>,
}

/// 최상위 추천 포맷별 집계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatTally {
    /// 포맷 식별자
    pub format_name: String,
    /// 이 포맷이 1순위였던 라인 수
    pub lines: usize,
    /// 매칭된 라인 중 비율 (0-100)
    pub share: f64,
}

/// 배치에서 후보로 나온 모든 포맷의 집계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatMatchSummary {
    /// 포맷 식별자
    pub format_name: String,
    /// 추천 목록에 포함된 라인 수
    pub match_count: usize,
    /// 포함된 라인들의 평균 신뢰도
    pub average_confidence: f64,
}

/// 배치 추천 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// 분석한 라인 수
    pub total_lines: usize,
    /// 하나 이상의 추천을 받은 라인 수
    pub matched_lines: usize,
    /// 라인별 결과
    pub results: Vec<LineRecommendations>,
    /// 최상위 포맷 집계 (라인 수 내림차순, 이름 오름차순)
    pub top_formats: Vec<FormatTally>,
    /// 후보 포맷 전체 집계 (매칭 수 내림차순, 평균 신뢰도 내림차순, 이름 오름차순)
    pub format_matches: Vec<FormatMatchSummary>,
}

impl BatchReport {
    /// 매칭 비율 (0-100)
    pub fn match_rate(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.matched_lines as f64 * 100.0 / self.total_lines as f64
        }
    }
}

/// 로그 포맷 추천기
///
/// `initialize` 이후에는 `Send + Sync` 인 읽기 전용 값으로, 여러 스레드에서
/// 동시에 `recommend` 를 호출할 수 있습니다.
pub struct FormatRecommender<C: TemplateCompiler = GrokCompiler> {
    compiler: C,
    registry: FieldTypeRegistry,
    max_line_bytes: usize,
    compiled: OnceLock<CompiledSet<C::Pattern>>,
}

impl<C: TemplateCompiler> FormatRecommender<C> {
    /// 포맷 목록을 컴파일하여 추천기를 초기화합니다.
    ///
    /// 컴파일에 실패하거나 이름이 중복된 포맷은 제외되어 [`InitResult::skipped`]에
    /// 기록됩니다. 한 번만 호출할 수 있으며, 두 번째 호출은
    /// [`EngineError::AlreadyInitialized`] 를 반환합니다.
    pub fn initialize(
        &self,
        formats: impl IntoIterator<Item = LogFormat>,
    ) -> Result<InitResult, EngineError> {
        if self.compiled.get().is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let mut compiled = Vec::new();
        let mut by_name = HashMap::new();
        let mut skipped = Vec::new();

        for format in formats {
            if by_name.contains_key(&format.name) {
                tracing::warn!(format = %format.name, "duplicate format name, skipping");
                skipped.push(SkippedFormat {
                    format_name: format.name.clone(),
                    reason: "duplicate format name".to_owned(),
                });
                continue;
            }

            match self.compiler.compile(&format.template) {
                Ok(pattern) => {
                    let specificity = Specificity::of(&format.template, &self.registry);
                    by_name.insert(format.name.clone(), compiled.len());
                    compiled.push(CompiledFormat {
                        format,
                        pattern,
                        specificity,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        format = %format.name,
                        compiler = self.compiler.name(),
                        error = %e,
                        "format template failed to compile, skipping"
                    );
                    skipped.push(SkippedFormat {
                        format_name: format.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let result = InitResult {
            compiled_count: compiled.len(),
            skipped,
        };

        self.compiled
            .set(CompiledSet {
                formats: compiled,
                by_name,
            })
            .map_err(|_| EngineError::AlreadyInitialized)?;

        metrics::gauge!(m::ENGINE_FORMATS_COMPILED).set(result.compiled_count as f64);
        metrics::counter!(m::ENGINE_FORMATS_SKIPPED_TOTAL).increment(result.skipped.len() as u64);

        tracing::info!(
            compiled = result.compiled_count,
            skipped = result.skipped.len(),
            compiler = self.compiler.name(),
            "format recommender initialized"
        );

        Ok(result)
    }

    /// 초기화 여부
    pub fn is_initialized(&self) -> bool {
        self.compiled.get().is_some()
    }

    fn compiled(&self) -> Result<&CompiledSet<C::Pattern>, EngineError> {
        self.compiled.get().ok_or(EngineError::Uninitialized)
    }

    fn matcher(&self) -> FieldMatcher<'_> {
        FieldMatcher::new(&self.registry).with_max_line_bytes(self.max_line_bytes)
    }

    /// 라인에 가장 잘 맞는 포맷을 순위순으로 추천합니다.
    ///
    /// 아무 포맷에도 맞지 않으면 빈 목록을 반환합니다.
    pub fn recommend(
        &self,
        line: &str,
        options: &RecommendOptions,
    ) -> Result<Vec<FormatRecommendation>, EngineError> {
        let set = self.compiled()?;
        validate_options(options)?;
        let started = Instant::now();
        let matcher = self.matcher();

        let mut results: Vec<FormatRecommendation> = set
            .formats
            .iter()
            .filter(|c| matches_filter(c.format.group.as_deref(), options.group.as_deref()))
            .filter(|c| matches_filter(c.format.vendor.as_deref(), options.vendor.as_deref()))
            .filter(|c| !(options.exclude_overly_generic && c.specificity.overly_generic))
            .filter_map(|c| {
                let outcome = matcher.try_match(&c.pattern, line);
                if !outcome.matched {
                    return None;
                }
                Some(FormatRecommendation {
                    format_name: c.format.name.clone(),
                    confidence: confidence(&outcome, c.specificity.score),
                    specificity: c.specificity.score,
                    matched_fields: outcome.extracted_fields,
                    group: c.format.group.clone(),
                    vendor: c.format.vendor.clone(),
                })
            })
            .collect();

        metrics::counter!(m::ENGINE_CANDIDATES_MATCHED_TOTAL).increment(results.len() as u64);

        if let Some(min) = options.min_confidence {
            results.retain(|r| r.confidence >= min);
        }

        results.sort_by(ranking_order);
        results.truncate(options.max_results);

        let outcome = if results.is_empty() { "empty" } else { "matched" };
        metrics::counter!(m::ENGINE_RECOMMEND_REQUESTS_TOTAL, m::LABEL_RESULT => outcome)
            .increment(1);
        metrics::histogram!(m::ENGINE_RECOMMEND_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        tracing::debug!(
            line_bytes = line.len(),
            results = results.len(),
            top = results.first().map(|r| r.format_name.as_str()),
            "recommendation complete"
        );

        Ok(results)
    }

    /// 특정 그룹의 포맷만 대상으로 추천합니다.
    pub fn recommend_in_group(
        &self,
        line: &str,
        group: &str,
        options: &RecommendOptions,
    ) -> Result<Vec<FormatRecommendation>, EngineError> {
        let options = options.clone().with_group(group);
        self.recommend(line, &options)
    }

    /// 여러 라인을 순서대로 추천하고 최상위 포맷과 후보 포맷 전체를 집계합니다.
    pub fn recommend_batch<I, S>(
        &self,
        lines: I,
        options: &RecommendOptions,
    ) -> Result<BatchReport, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.compiled()?;
        validate_options(options)?;

        let mut results = Vec::new();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut candidates: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        let mut matched_lines = 0usize;

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let recommendations = self.recommend(line, options)?;
            if let Some(top) = recommendations.first() {
                matched_lines += 1;
                *counts.entry(top.format_name.clone()).or_insert(0) += 1;
            }
            for r in &recommendations {
                let entry = candidates.entry(r.format_name.clone()).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += r.confidence;
            }
            results.push(LineRecommendations {
                line_number: idx + 1,
                line: line.to_owned(),
                recommendations,
            });
        }

        let mut top_formats: Vec<FormatTally> = counts
            .into_iter()
            .map(|(format_name, lines)| FormatTally {
                format_name,
                lines,
                share: lines as f64 * 100.0 / matched_lines as f64,
            })
            .collect();
        // BTreeMap 순회 순서가 이름 오름차순이므로 안정 정렬로 동률 순서 유지
        top_formats.sort_by(|a, b| b.lines.cmp(&a.lines));

        let mut format_matches: Vec<FormatMatchSummary> = candidates
            .into_iter()
            .map(|(format_name, (match_count, total))| FormatMatchSummary {
                format_name,
                match_count,
                average_confidence: total / match_count as f64,
            })
            .collect();
        format_matches.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| b.average_confidence.total_cmp(&a.average_confidence))
        });

        let report = BatchReport {
            total_lines: results.len(),
            matched_lines,
            results,
            top_formats,
            format_matches,
        };

        tracing::info!(
            total = report.total_lines,
            matched = report.matched_lines,
            "batch recommendation complete"
        );

        Ok(report)
    }

    /// 이름으로 지정한 포맷 하나에 대한 매칭 결과를 반환합니다.
    pub fn explain(&self, format_name: &str, line: &str) -> Result<MatchOutcome, EngineError> {
        let set = self.compiled()?;
        let idx = set
            .by_name
            .get(format_name)
            .ok_or_else(|| EngineError::UnknownFormat(format_name.to_owned()))?;
        Ok(self.matcher().try_match(&set.formats[*idx].pattern, line))
    }

    /// 컴파일된 포맷 목록 (로드 순서)
    pub fn available_formats(&self) -> Result<Vec<LogFormat>, EngineError> {
        Ok(self
            .compiled()?
            .formats
            .iter()
            .map(|c| c.format.clone())
            .collect())
    }

    /// 포맷의 특이도 (초기화 시 계산된 값)
    pub fn specificity_of(&self, format_name: &str) -> Result<Specificity, EngineError> {
        let set = self.compiled()?;
        set.by_name
            .get(format_name)
            .map(|idx| set.formats[*idx].specificity)
            .ok_or_else(|| EngineError::UnknownFormat(format_name.to_owned()))
    }

    /// 그룹별 컴파일된 포맷 수
    pub fn group_statistics(&self) -> Result<BTreeMap<String, usize>, EngineError> {
        self.statistics(|f| f.group.as_deref())
    }

    /// 벤더별 컴파일된 포맷 수
    pub fn vendor_statistics(&self) -> Result<BTreeMap<String, usize>, EngineError> {
        self.statistics(|f| f.vendor.as_deref())
    }

    fn statistics(
        &self,
        key: impl Fn(&LogFormat) -> Option<&str>,
    ) -> Result<BTreeMap<String, usize>, EngineError> {
        let mut stats = BTreeMap::new();
        for c in &self.compiled()?.formats {
            let bucket = key(&c.format).unwrap_or(UNKNOWN_BUCKET);
            *stats.entry(bucket.to_owned()).or_insert(0) += 1;
        }
        Ok(stats)
    }

    /// 템플릿 컴파일러
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// 필드 타입 레지스트리
    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }
}

/// 포맷 추천기 빌더
pub struct RecommenderBuilder<C: TemplateCompiler = GrokCompiler> {
    compiler: C,
    registry: FieldTypeRegistry,
    max_line_bytes: usize,
}

impl RecommenderBuilder<GrokCompiler> {
    /// 내장 grok 컴파일러와 내장 필드 타입으로 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            compiler: GrokCompiler::default(),
            registry: FieldTypeRegistry::with_builtin(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl Default for RecommenderBuilder<GrokCompiler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TemplateCompiler> RecommenderBuilder<C> {
    /// 템플릿 컴파일러를 교체합니다.
    pub fn compiler<D: TemplateCompiler>(self, compiler: D) -> RecommenderBuilder<D> {
        RecommenderBuilder {
            compiler,
            registry: self.registry,
            max_line_bytes: self.max_line_bytes,
        }
    }

    /// 필드 타입 레지스트리를 지정합니다.
    pub fn registry(mut self, registry: FieldTypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 매칭을 시도할 최대 라인 길이를 지정합니다.
    pub fn max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// 초기화되지 않은 추천기를 생성합니다.
    pub fn build(self) -> Result<FormatRecommender<C>, EngineError> {
        if self.max_line_bytes == 0 {
            return Err(EngineError::Config {
                field: "max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(FormatRecommender {
            compiler: self.compiler,
            registry: self.registry,
            max_line_bytes: self.max_line_bytes,
            compiled: OnceLock::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_LOG: &str = r#"^%{IP:client_ip} - - \[%{HTTPDATE:timestamp}\] "%{METHOD:method} %{PATH:path} HTTP/%{NUMBER:http_version}" %{NUMBER:status} %{NUMBER:bytes}$"#;
    const ACCESS_LINE: &str =
        r#"192.168.1.100 - - [05/Aug/2025:10:15:30 +0900] "GET /index.html HTTP/1.1" 200 1234"#;
    const SSH_LOGIN: &str = "^%{SYSLOGTIMESTAMP:timestamp} %{HOSTNAME:host} sshd\\[%{POSINT:pid}\\]: Accepted %{WORD:auth_method} for %{USERNAME:user} from %{IP:src_ip} port %{PORT:src_port} ssh2$";

    fn formats() -> Vec<LogFormat> {
        vec![
            LogFormat::new("apache_access", ACCESS_LOG)
                .with_group("Web Server")
                .with_vendor("Apache"),
            LogFormat::new("ssh_login", SSH_LOGIN)
                .with_group("System")
                .with_vendor("OpenSSH"),
            LogFormat::new("generic_message", "^%{GREEDYDATA:message}$"),
        ]
    }

    fn initialized() -> FormatRecommender {
        let recommender = RecommenderBuilder::new().build().unwrap();
        recommender.initialize(formats()).unwrap();
        recommender
    }

    #[test]
    fn recommend_before_initialize_fails() {
        let recommender = RecommenderBuilder::new().build().unwrap();
        let err = recommender
            .recommend(ACCESS_LINE, &RecommendOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Uninitialized));
        assert!(matches!(
            recommender.available_formats(),
            Err(EngineError::Uninitialized)
        ));
    }

    #[test]
    fn second_initialize_fails() {
        let recommender = initialized();
        let err = recommender.initialize(formats()).unwrap_err();
        assert!(matches!(err, EngineError::AlreadyInitialized));
        assert_eq!(recommender.available_formats().unwrap().len(), 3);
    }

    #[test]
    fn initialize_skips_broken_and_duplicate_formats() {
        let recommender = RecommenderBuilder::new().build().unwrap();
        let mut input = formats();
        input.push(LogFormat::new("broken", "^%{IP:ip"));
        input.push(LogFormat::new("apache_access", "%{INT:x}"));
        input.push(LogFormat::new("unknown_type", "%{NOT_A_TYPE:x}"));

        let result = recommender.initialize(input).unwrap();
        assert_eq!(result.compiled_count, 3);
        let skipped: Vec<&str> = result
            .skipped
            .iter()
            .map(|s| s.format_name.as_str())
            .collect();
        assert_eq!(skipped, vec!["broken", "apache_access", "unknown_type"]);
        assert!(result.skipped[1].reason.contains("duplicate"));
    }

    #[test]
    fn empty_format_set_is_legal() {
        let recommender = RecommenderBuilder::new().build().unwrap();
        let result = recommender.initialize(Vec::new()).unwrap();
        assert_eq!(result.compiled_count, 0);
        assert!(
            recommender
                .recommend(ACCESS_LINE, &RecommendOptions::default())
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn access_line_recommends_apache_first() {
        let recommender = initialized();
        let results = recommender
            .recommend(ACCESS_LINE, &RecommendOptions::default())
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].format_name, "apache_access");
        assert_eq!(results[0].group.as_deref(), Some("Web Server"));
        assert_eq!(results[0].matched_fields["status"], "200");
        assert!(results[0].confidence > 90.0);
    }

    #[test]
    fn specific_format_outranks_generic_format() {
        let recommender = initialized();
        let options = RecommendOptions::default().with_exclude_overly_generic(false);
        let results = recommender.recommend(ACCESS_LINE, &options).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].format_name, "apache_access");
        assert_eq!(results[1].format_name, "generic_message");
        assert!(results[0].confidence > results[1].confidence);
    }

    #[test]
    fn plain_message_matches_nothing_specific() {
        let recommender = initialized();
        let results = recommender
            .recommend("This is just a simple message", &RecommendOptions::default())
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let recommender = initialized();

        let zero = RecommendOptions::default().with_max_results(0);
        assert!(matches!(
            recommender.recommend(ACCESS_LINE, &zero),
            Err(EngineError::InvalidOptions { .. })
        ));

        for bad in [-1.0, 100.5, f64::NAN] {
            let options = RecommendOptions::default().with_min_confidence(bad);
            assert!(matches!(
                recommender.recommend(ACCESS_LINE, &options),
                Err(EngineError::InvalidOptions { .. })
            ));
        }
    }

    #[test]
    fn min_confidence_filters_results() {
        let recommender = initialized();
        let options = RecommendOptions::default()
            .with_exclude_overly_generic(false)
            .with_min_confidence(85.0);
        let results = recommender.recommend(ACCESS_LINE, &options).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].format_name, "apache_access");
    }

    #[test]
    fn group_and_vendor_filters_are_case_insensitive() {
        let recommender = initialized();
        let options = RecommendOptions::default().with_exclude_overly_generic(false);

        let in_system = recommender
            .recommend_in_group(ACCESS_LINE, "system", &options)
            .unwrap();
        assert!(in_system.is_empty());

        let apache = recommender
            .recommend(ACCESS_LINE, &options.clone().with_vendor("APACHE"))
            .unwrap();
        assert_eq!(apache.len(), 1);
    }

    #[test]
    fn explain_returns_outcome_for_named_format() {
        let recommender = initialized();
        let outcome = recommender.explain("apache_access", ACCESS_LINE).unwrap();
        assert!(outcome.matched);
        assert_eq!(outcome.field_validity_ratio, 1.0);

        let miss = recommender.explain("ssh_login", ACCESS_LINE).unwrap();
        assert!(!miss.matched);

        assert!(matches!(
            recommender.explain("nope", ACCESS_LINE),
            Err(EngineError::UnknownFormat(_))
        ));
    }

    #[test]
    fn statistics_bucket_missing_metadata_as_unknown() {
        let recommender = initialized();
        let groups = recommender.group_statistics().unwrap();
        assert_eq!(groups["Web Server"], 1);
        assert_eq!(groups["System"], 1);
        assert_eq!(groups["unknown"], 1);

        let vendors = recommender.vendor_statistics().unwrap();
        assert_eq!(vendors["OpenSSH"], 1);
        assert_eq!(vendors["unknown"], 1);
    }

    #[test]
    fn specificity_is_memoized_per_format() {
        let recommender = initialized();
        let spec = recommender.specificity_of("generic_message").unwrap();
        assert!(spec.overly_generic);
        assert!(!recommender.specificity_of("apache_access").unwrap().overly_generic);
    }

    #[test]
    fn batch_tallies_top_formats() {
        let recommender = initialized();
        let ssh_line =
            "Aug  5 10:15:30 web01 sshd[4242]: Accepted publickey for alice from 10.0.0.5 port 52144 ssh2";
        let lines = [ACCESS_LINE, ssh_line, ACCESS_LINE, "noise"];

        let report = recommender
            .recommend_batch(lines, &RecommendOptions::default())
            .unwrap();

        assert_eq!(report.total_lines, 4);
        assert_eq!(report.matched_lines, 3);
        assert_eq!(report.results[1].line_number, 2);
        assert_eq!(report.top_formats[0].format_name, "apache_access");
        assert_eq!(report.top_formats[0].lines, 2);
        assert_eq!(report.top_formats[1].format_name, "ssh_login");
        assert!((report.match_rate() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn batch_collects_every_candidate_format() {
        let recommender = initialized();
        let lines = [ACCESS_LINE, ACCESS_LINE, "noise"];
        let options = RecommendOptions::default().with_exclude_overly_generic(false);

        let report = recommender.recommend_batch(lines, &options).unwrap();

        let names: Vec<&str> = report
            .format_matches
            .iter()
            .map(|f| f.format_name.as_str())
            .collect();
        assert_eq!(names, vec!["generic_message", "apache_access"]);
        assert_eq!(report.format_matches[0].match_count, 3);
        assert_eq!(report.format_matches[1].match_count, 2);

        let apache = recommender.recommend(ACCESS_LINE, &options).unwrap();
        assert!((report.format_matches[1].average_confidence - apache[0].confidence).abs() < 1e-9);

        assert_eq!(report.top_formats.len(), 2);
        assert_eq!(report.top_formats[0].format_name, "apache_access");
    }

    #[test]
    fn uninitialized_check_precedes_option_validation() {
        let recommender = RecommenderBuilder::new().build().unwrap();
        let zero = RecommendOptions::default().with_max_results(0);
        assert!(matches!(
            recommender.recommend(ACCESS_LINE, &zero),
            Err(EngineError::Uninitialized)
        ));
        assert!(matches!(
            recommender.recommend_batch([ACCESS_LINE], &zero),
            Err(EngineError::Uninitialized)
        ));
    }

    fn record(name: &str, confidence: f64, specificity: f64) -> FormatRecommendation {
        FormatRecommendation {
            format_name: name.to_owned(),
            confidence,
            specificity,
            matched_fields: BTreeMap::new(),
            group: None,
            vendor: None,
        }
    }

    #[test]
    fn equal_confidence_orders_by_specificity_then_name() {
        let mut results = vec![
            record("b_low", 80.0, 0.4),
            record("c_high", 80.0, 0.9),
            record("a_low", 80.0, 0.4),
            record("top", 95.0, 0.1),
        ];
        results.sort_by(ranking_order);

        let names: Vec<&str> = results.iter().map(|r| r.format_name.as_str()).collect();
        assert_eq!(names, vec!["top", "c_high", "a_low", "b_low"]);
        assert_eq!(
            ranking_order(&record("a", 80.0, 0.4), &record("b", 80.0, 0.4)),
            Ordering::Less
        );
    }

    #[test]
    fn identical_templates_rank_by_name() {
        let recommender = RecommenderBuilder::new().build().unwrap();
        recommender
            .initialize(
                ["zeta", "alpha", "mid"]
                    .into_iter()
                    .map(|name| LogFormat::new(name, ACCESS_LOG)),
            )
            .unwrap();

        let results = recommender
            .recommend(ACCESS_LINE, &RecommendOptions::default())
            .unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.format_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert!(results.windows(2).all(|w| w[0].confidence == w[1].confidence));
    }

    #[test]
    fn zero_max_line_bytes_is_rejected() {
        let result = RecommenderBuilder::new().max_line_bytes(0).build();
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }

    #[test]
    fn recommender_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormatRecommender>();
    }

    #[test]
    fn confidence_is_clamped() {
        let outcome = MatchOutcome {
            matched: true,
            extracted_fields: BTreeMap::new(),
            literal_coverage: 1.0,
            field_validity_ratio: 1.0,
        };
        assert_eq!(confidence(&outcome, 1.0), 100.0);
        assert_eq!(confidence(&outcome, 5.0), 100.0);
        assert!((confidence(&outcome, 0.5) - 90.0).abs() < 1e-9);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn lines() -> impl Strategy<Value = String> {
            prop_oneof![
                Just(ACCESS_LINE.to_owned()),
                Just("Aug  5 10:15:30 web01 sshd[1]: Accepted password for bob from 10.1.1.1 port 22 ssh2".to_owned()),
                "\\PC{0,80}",
            ]
        }

        proptest! {
            /// 같은 입력에 대해 같은 결과
            #[test]
            fn recommend_is_deterministic(line in lines(), generic in any::<bool>()) {
                let recommender = initialized();
                let options = RecommendOptions::default().with_exclude_overly_generic(generic);
                let first = recommender.recommend(&line, &options).unwrap();
                let second = recommender.recommend(&line, &options).unwrap();
                prop_assert_eq!(first, second);
            }

            /// 결과 수는 max_results 이하
            #[test]
            fn output_is_bounded(line in lines(), k in 1usize..4) {
                let recommender = initialized();
                let options = RecommendOptions::default()
                    .with_max_results(k)
                    .with_exclude_overly_generic(false);
                prop_assert!(recommender.recommend(&line, &options).unwrap().len() <= k);
            }

            /// 결과는 정렬 순서를 따름
            #[test]
            fn output_is_sorted(line in lines()) {
                let recommender = initialized();
                let options = RecommendOptions::default().with_exclude_overly_generic(false);
                let results = recommender.recommend(&line, &options).unwrap();
                for pair in results.windows(2) {
                    prop_assert_ne!(ranking_order(&pair[0], &pair[1]), Ordering::Greater);
                }
            }
        }
    }
}
