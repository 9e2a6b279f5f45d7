//! 포맷 정의 검증
//!
//! 각 포맷의 템플릿을 컴파일하고 샘플 라인과 매칭하여 카탈로그 품질을 점검합니다.
//!
//! - 에러 (Fail): 컴파일 실패, 샘플 라인 불일치
//! - 경고 (Warning): 샘플 없음, 유효 필드 2개 이하, GREEDYDATA 사용,
//!   지나치게 일반적인 템플릿, 샘플 필드 타입 검증 실패, 느린 매칭

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use logscout_core::pipeline::{CompiledPattern, TemplateCompiler};
use logscout_core::types::LogFormat;

use crate::field::FieldTypeRegistry;
use crate::matcher::FieldMatcher;
use crate::specificity::Specificity;
use crate::template::Template;

/// 유효 필드 수 계산에서 제외하는 필드 이름
const NON_EFFECTIVE_FIELDS: &[&str] = &["log_time", "message", "msg", "raw_message"];

/// 유효 필드가 이 수 이하이면 경고
const MIN_EFFECTIVE_FIELDS: usize = 2;

/// 샘플 매칭이 이 시간을 넘으면 경고
const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(100);

/// 검증 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    /// 문제 없음
    Pass,
    /// 사용 가능하지만 주의 필요
    Warning,
    /// 사용 불가
    Fail,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warning => write!(f, "WARNING"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// 포맷 하나의 검증 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatValidation {
    /// 포맷 식별자
    pub format_name: String,
    /// 검증 상태
    pub status: ValidationStatus,
    /// 에러 목록
    pub errors: Vec<String>,
    /// 경고 목록
    pub warnings: Vec<String>,
    /// 샘플 라인에서 추출된 필드
    pub extracted_fields: BTreeMap<String, String>,
    /// 템플릿 특이도
    pub specificity: Specificity,
}

impl FormatValidation {
    fn new(format_name: &str, specificity: Specificity) -> Self {
        Self {
            format_name: format_name.to_owned(),
            status: ValidationStatus::Pass,
            errors: Vec::new(),
            warnings: Vec::new(),
            extracted_fields: BTreeMap::new(),
            specificity,
        }
    }

    fn finish(mut self) -> Self {
        self.status = if !self.errors.is_empty() {
            ValidationStatus::Fail
        } else if !self.warnings.is_empty() {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Pass
        };
        self
    }
}

/// 검증 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// 검증한 포맷 수
    pub total: usize,
    /// 통과
    pub passed: usize,
    /// 경고
    pub warnings: usize,
    /// 실패
    pub failed: usize,
}

impl ValidationSummary {
    /// 검증 결과 목록을 집계합니다.
    pub fn of(results: &[FormatValidation]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            match r.status {
                ValidationStatus::Pass => acc.passed += 1,
                ValidationStatus::Warning => acc.warnings += 1,
                ValidationStatus::Fail => acc.failed += 1,
            }
            acc
        })
    }
}

/// 포맷 목록을 검증합니다.
pub fn validate_formats<C: TemplateCompiler>(
    compiler: &C,
    registry: &FieldTypeRegistry,
    formats: &[LogFormat],
) -> Vec<FormatValidation> {
    let results: Vec<FormatValidation> = formats
        .iter()
        .map(|format| validate_format(compiler, registry, format))
        .collect();

    let summary = ValidationSummary::of(&results);
    tracing::info!(
        total = summary.total,
        passed = summary.passed,
        warnings = summary.warnings,
        failed = summary.failed,
        "format validation complete"
    );

    results
}

/// 포맷 하나를 검증합니다.
pub fn validate_format<C: TemplateCompiler>(
    compiler: &C,
    registry: &FieldTypeRegistry,
    format: &LogFormat,
) -> FormatValidation {
    let specificity = Specificity::of(&format.template, registry);
    let mut result = FormatValidation::new(&format.name, specificity);

    let pattern = match compiler.compile(&format.template) {
        Ok(pattern) => pattern,
        Err(e) => {
            tracing::debug!(format = %format.name, error = %e, "template failed to compile");
            result.errors.push(format!("template failed to compile: {e}"));
            return result.finish();
        }
    };

    if specificity.overly_generic {
        result.warnings.push(format!(
            "template is overly generic (specificity {:.2})",
            specificity.score
        ));
    }

    let uses_greedydata = Template::parse(&format.template)
        .map(|t| t.placeholders().any(|p| p.type_name == "GREEDYDATA"))
        .unwrap_or(false);
    if uses_greedydata {
        result
            .warnings
            .push("uses GREEDYDATA, which matches anything".to_owned());
    }

    let Some(sample) = format.sample.as_deref().filter(|s| !s.trim().is_empty()) else {
        result
            .warnings
            .push("no sample line, match was not tested".to_owned());
        return result.finish();
    };

    let started = Instant::now();
    let outcome = FieldMatcher::new(registry).try_match(&pattern, sample);
    let elapsed = started.elapsed();

    if elapsed > SLOW_MATCH_THRESHOLD {
        result.warnings.push(format!(
            "sample match took {} ms",
            elapsed.as_millis()
        ));
    }

    if !outcome.matched {
        result
            .errors
            .push("sample line does not match the template".to_owned());
        return result.finish();
    }

    let effective = outcome
        .extracted_fields
        .keys()
        .filter(|name| !NON_EFFECTIVE_FIELDS.contains(&name.to_ascii_lowercase().as_str()))
        .count();
    if effective <= MIN_EFFECTIVE_FIELDS {
        result
            .warnings
            .push(format!("too few effective fields ({effective})"));
    }

    if outcome.field_validity_ratio < 1.0 {
        let invalid: Vec<&str> = pattern
            .fields()
            .iter()
            .filter(|f| {
                outcome
                    .extracted_fields
                    .get(&f.name)
                    .and_then(|v| registry.validate(&f.type_name, v))
                    == Some(false)
            })
            .map(|f| f.name.as_str())
            .collect();
        result.warnings.push(format!(
            "sample fields failed type validation: {}",
            invalid.join(", ")
        ));
    }

    result.extracted_fields = outcome.extracted_fields;
    result.finish()
}
