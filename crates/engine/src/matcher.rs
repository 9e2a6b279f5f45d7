//! 필드 검증 매처
//!
//! 컴파일된 패턴으로 라인을 구조적으로 매칭한 뒤, 추출된 필드 값을
//! 선언된 TYPE 의 검증 함수로 확인하여 [`MatchOutcome`] 을 만듭니다.
//! 어떤 입력 라인에 대해서도 에러를 반환하지 않습니다.

use logscout_core::pipeline::CompiledPattern;
use logscout_core::types::MatchOutcome;

use crate::field::FieldTypeRegistry;
use crate::template::Template;

/// 매칭을 시도할 최대 라인 길이 (1MB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// 필드 검증 매처
#[derive(Debug, Clone, Copy)]
pub struct FieldMatcher<'r> {
    registry: &'r FieldTypeRegistry,
    max_line_bytes: usize,
}

impl<'r> FieldMatcher<'r> {
    /// 기본 라인 길이 제한으로 매처를 생성합니다.
    pub fn new(registry: &'r FieldTypeRegistry) -> Self {
        Self {
            registry,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// 패턴을 라인에 매칭하고 필드를 검증합니다.
    pub fn try_match<P>(&self, pattern: &P, line: &str) -> MatchOutcome
    where
        P: CompiledPattern + ?Sized,
    {
        if line.is_empty() {
            return MatchOutcome::no_match();
        }

        if line.len() > self.max_line_bytes {
            tracing::debug!(
                line_bytes = line.len(),
                max_line_bytes = self.max_line_bytes,
                "line exceeds size limit, treating as no match"
            );
            return MatchOutcome::no_match();
        }

        let Some(extracted_fields) = pattern.try_match_structure(line) else {
            return MatchOutcome::no_match();
        };

        let mut validated = 0usize;
        let mut valid = 0usize;
        for field in pattern.fields() {
            let Some(value) = extracted_fields.get(&field.name) else {
                continue;
            };
            if let Some(ok) = self.registry.validate(&field.type_name, value) {
                validated += 1;
                if ok {
                    valid += 1;
                } else {
                    tracing::trace!(
                        field = %field.name,
                        type_name = %field.type_name,
                        value = %value,
                        "field value failed type validation"
                    );
                }
            }
        }

        let field_validity_ratio = if validated == 0 {
            1.0
        } else {
            valid as f64 / validated as f64
        };

        let literal_coverage = if pattern.guarantees_literal_alignment() {
            1.0
        } else {
            literal_coverage(pattern.template(), line)
        };

        MatchOutcome {
            matched: true,
            extracted_fields,
            literal_coverage,
            field_validity_ratio,
        }
    }
}

/// 기본 설정의 매처로 패턴을 라인에 매칭합니다.
pub fn try_match<P>(pattern: &P, line: &str, registry: &FieldTypeRegistry) -> MatchOutcome
where
    P: CompiledPattern + ?Sized,
{
    FieldMatcher::new(registry).try_match(pattern, line)
}

/// 템플릿 리터럴 문자 중 라인에서 템플릿 순서대로 발견된 비율
///
/// 리터럴이 없거나 템플릿을 토큰화할 수 없으면 1.0 입니다.
pub fn literal_coverage(template: &str, line: &str) -> f64 {
    let Ok(parsed) = Template::parse(template) else {
        return 1.0;
    };

    let mut total = 0usize;
    let mut covered = 0usize;
    let mut cursor = 0usize;

    for literal in parsed.literals() {
        let len = literal.chars().count();
        total += len;
        if let Some(pos) = line[cursor..].find(literal) {
            covered += len;
            cursor += pos + literal.len();
        }
    }

    if total == 0 {
        1.0
    } else {
        covered as f64 / total as f64
    }
}
