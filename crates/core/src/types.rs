//! 도메인 타입 — 크레이트 간에 공유되는 공통 타입
//!
//! 포맷 정의, 매칭 결과, 추천 결과 등 엔진과 CLI 가 주고받는
//! 데이터 구조를 정의합니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 로그 포맷 정의
///
/// 이름과 grok 스타일 템플릿(`%{TYPE:name}` 토큰 + 리터럴)으로 구성됩니다.
/// `name` 은 하나의 추천 엔진 안에서 유일해야 하며, 초기화 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFormat {
    /// 포맷 식별자
    pub name: String,
    /// 패턴 템플릿
    pub template: String,
    /// 포맷 그룹 (예: Web Server, Firewall)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// 벤더
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// 검증용 샘플 로그 라인
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
}

impl LogFormat {
    /// 이름과 템플릿만으로 포맷을 생성합니다.
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            group: None,
            vendor: None,
            description: None,
            sample: None,
        }
    }

    /// 그룹을 지정합니다.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// 벤더를 지정합니다.
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// 샘플 로그 라인을 지정합니다.
    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = Some(sample.into());
        self
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{} [{}]: {}", self.name, group, self.template),
            None => write!(f, "{}: {}", self.name, self.template),
        }
    }
}

/// 컴파일된 패턴의 필드 스키마 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// 필드 이름 (중복 시 `_1`, `_2` 접미어)
    pub name: String,
    /// 선언된 TYPE
    pub type_name: String,
}

/// 단일 포맷에 대한 매칭 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// 구조적 매칭 성공 여부
    pub matched: bool,
    /// 추출된 필드 (이름 -> 원본 값)
    pub extracted_fields: BTreeMap<String, String>,
    /// 템플릿 리터럴 문자 중 라인에서 정렬된 비율 (0.0-1.0)
    pub literal_coverage: f64,
    /// 타입 검증을 통과한 필드 비율 (0.0-1.0)
    pub field_validity_ratio: f64,
}

impl MatchOutcome {
    /// 매칭 실패 결과
    pub fn no_match() -> Self {
        Self {
            matched: false,
            extracted_fields: BTreeMap::new(),
            literal_coverage: 0.0,
            field_validity_ratio: 0.0,
        }
    }
}

/// 포맷 추천 결과
///
/// 추천 호출마다 새로 생성되며 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRecommendation {
    /// 포맷 식별자
    pub format_name: String,
    /// 신뢰도 (0-100)
    pub confidence: f64,
    /// 템플릿 특이도 (0.0-1.0)
    pub specificity: f64,
    /// 추출된 필드
    pub matched_fields: BTreeMap<String, String>,
    /// 포맷 그룹
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// 벤더
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl fmt::Display for FormatRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.1}%, {} fields)",
            self.format_name,
            self.confidence,
            self.matched_fields.len()
        )
    }
}

/// 추천 옵션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendOptions {
    /// 최대 결과 수 (0 이면 InvalidOptions 에러)
    pub max_results: usize,
    /// 최소 신뢰도 (0-100)
    pub min_confidence: Option<f64>,
    /// 지나치게 일반적인 포맷 제외 여부
    pub exclude_overly_generic: bool,
    /// 그룹 필터 (대소문자 무시)
    pub group: Option<String>,
    /// 벤더 필터 (대소문자 무시)
    pub vendor: Option<String>,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            min_confidence: None,
            exclude_overly_generic: true,
            group: None,
            vendor: None,
        }
    }
}

impl RecommendOptions {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }

    pub fn with_exclude_overly_generic(mut self, exclude: bool) -> Self {
        self.exclude_overly_generic = exclude;
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }
}

/// 컴파일에서 제외된 포맷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFormat {
    /// 포맷 식별자
    pub format_name: String,
    /// 제외 사유
    pub reason: String,
}

/// 초기화 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResult {
    /// 컴파일에 성공한 포맷 수
    pub compiled_count: usize,
    /// 제외된 포맷 목록
    pub skipped: Vec<SkippedFormat>,
}

impl fmt::Display for InitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} formats compiled, {} skipped",
            self.compiled_count,
            self.skipped.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_builder_sets_metadata() {
        let format = LogFormat::new("apache_access", "^%{IP:client_ip} .*$")
            .with_group("Web Server")
            .with_vendor("Apache")
            .with_sample("10.0.0.1 - -");
        assert_eq!(format.group.as_deref(), Some("Web Server"));
        assert_eq!(format.vendor.as_deref(), Some("Apache"));
        assert_eq!(format.sample.as_deref(), Some("10.0.0.1 - -"));
        assert!(format.description.is_none());
    }

    #[test]
    fn log_format_display() {
        let format = LogFormat::new("syslog", "%{SYSLOGTIMESTAMP:ts} %{GREEDYDATA:msg}");
        assert_eq!(
            format.to_string(),
            "syslog: %{SYSLOGTIMESTAMP:ts} %{GREEDYDATA:msg}"
        );

        let grouped = format.with_group("System");
        assert!(grouped.to_string().contains("[System]"));
    }

    #[test]
    fn log_format_deserialize_with_optional_fields_missing() {
        let json = r#"{"name":"nginx","template":"^%{IP:ip}$"}"#;
        let format: LogFormat = serde_json::from_str(json).unwrap();
        assert_eq!(format, LogFormat::new("nginx", "^%{IP:ip}$"));
    }

    #[test]
    fn log_format_serialize_skips_missing_metadata() {
        let json = serde_json::to_string(&LogFormat::new("a", "b")).unwrap();
        assert!(!json.contains("group"));
        assert!(!json.contains("sample"));
    }

    #[test]
    fn no_match_outcome_is_empty() {
        let outcome = MatchOutcome::no_match();
        assert!(!outcome.matched);
        assert!(outcome.extracted_fields.is_empty());
        assert_eq!(outcome.literal_coverage, 0.0);
        assert_eq!(outcome.field_validity_ratio, 0.0);
    }

    #[test]
    fn recommend_options_defaults() {
        let options = RecommendOptions::default();
        assert_eq!(options.max_results, 5);
        assert!(options.min_confidence.is_none());
        assert!(options.exclude_overly_generic);
        assert!(options.group.is_none());
    }

    #[test]
    fn recommend_options_chaining() {
        let options = RecommendOptions::default()
            .with_max_results(3)
            .with_min_confidence(50.0)
            .with_exclude_overly_generic(false)
            .with_group("Firewall")
            .with_vendor("Cisco");
        assert_eq!(options.max_results, 3);
        assert_eq!(options.min_confidence, Some(50.0));
        assert!(!options.exclude_overly_generic);
        assert_eq!(options.group.as_deref(), Some("Firewall"));
        assert_eq!(options.vendor.as_deref(), Some("Cisco"));
    }

    #[test]
    fn recommendation_display() {
        let mut fields = BTreeMap::new();
        fields.insert("status".to_owned(), "200".to_owned());
        let rec = FormatRecommendation {
            format_name: "apache_access".to_owned(),
            confidence: 91.24,
            specificity: 0.6,
            matched_fields: fields,
            group: None,
            vendor: None,
        };
        assert_eq!(rec.to_string(), "apache_access (91.2%, 1 fields)");
    }

    #[test]
    fn init_result_display() {
        let result = InitResult {
            compiled_count: 4,
            skipped: vec![SkippedFormat {
                format_name: "broken".to_owned(),
                reason: "unbalanced placeholder at offset 3".to_owned(),
            }],
        };
        assert_eq!(result.to_string(), "4 formats compiled, 1 skipped");
    }
}
