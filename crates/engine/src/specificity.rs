//! 템플릿 특이도 분류기
//!
//! 템플릿이 얼마나 판별력 있는지를 입력 라인과 무관하게 정적으로 평가합니다.
//!
//! ```text
//! literal_ratio     = 공백이 아닌 리터럴 문자 수 / 구조 길이
//! 구조 길이         = 리터럴 문자 수 + 플레이스홀더 수 + 정규식 구문 조각 수
//! type_strength_avg = 플레이스홀더 TYPE 강도 평균 (strong 1.0, unknown 0.5, weak 0.1)
//! score             = 0.6 * literal_ratio + 0.4 * type_strength_avg   (0.0-1.0)
//! ```
//!
//! 점수가 [`GENERIC_THRESHOLD`] 미만이거나, 플레이스홀더가 정확히 하나이고 그 TYPE 이
//! weak 이면 "지나치게 일반적(overly generic)" 으로 분류합니다.
//! 토큰화할 수 없는 템플릿은 점수 0, generic 으로 취급합니다.

use serde::{Deserialize, Serialize};

use crate::field::{FieldTypeRegistry, TypeStrength};
use crate::template::{Segment, Template};

/// 리터럴 비율 가중치
pub const LITERAL_WEIGHT: f64 = 0.6;

/// 타입 강도 가중치
pub const TYPE_STRENGTH_WEIGHT: f64 = 0.4;

/// 이 점수 미만이면 지나치게 일반적인 템플릿
pub const GENERIC_THRESHOLD: f64 = 0.30;

/// 특이도 계산 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specificity {
    /// 특이도 점수 (0.0-1.0)
    pub score: f64,
    /// 리터럴 비율 (0.0-1.0)
    pub literal_ratio: f64,
    /// 플레이스홀더 타입 강도 평균 (0.0-1.0)
    pub type_strength_avg: f64,
    /// 플레이스홀더 수 (이름 없는 플레이스홀더 포함)
    pub placeholder_count: usize,
    /// 지나치게 일반적인지 여부
    pub overly_generic: bool,
}

impl Specificity {
    /// 토큰화에 실패한 템플릿의 특이도
    pub fn malformed() -> Self {
        Self {
            score: 0.0,
            literal_ratio: 0.0,
            type_strength_avg: 0.0,
            placeholder_count: 0,
            overly_generic: true,
        }
    }

    /// 템플릿 문자열의 특이도를 계산합니다.
    pub fn of(template: &str, registry: &FieldTypeRegistry) -> Self {
        match Template::parse(template) {
            Ok(parsed) => Self::of_parsed(&parsed, registry),
            Err(e) => {
                tracing::debug!(template, error = %e, "cannot score malformed template");
                Self::malformed()
            }
        }
    }

    /// 토큰화된 템플릿의 특이도를 계산합니다.
    pub fn of_parsed(template: &Template, registry: &FieldTypeRegistry) -> Self {
        let mut literal_chars = 0usize;
        let mut non_ws_chars = 0usize;
        let mut structural_units = 0usize;
        let mut strengths = Vec::new();

        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => {
                    for c in text.chars() {
                        literal_chars += 1;
                        if !c.is_whitespace() {
                            non_ws_chars += 1;
                        }
                    }
                }
                Segment::Syntax(_) => structural_units += 1,
                Segment::Placeholder(p) => {
                    structural_units += 1;
                    strengths.push(registry.strength(&p.type_name));
                }
            }
        }

        let total = literal_chars + structural_units;
        let literal_ratio = if total == 0 {
            0.0
        } else {
            non_ws_chars as f64 / total as f64
        };

        let type_strength_avg = if strengths.is_empty() {
            0.0
        } else {
            strengths.iter().map(|s| s.weight()).sum::<f64>() / strengths.len() as f64
        };

        let score = (LITERAL_WEIGHT * literal_ratio + TYPE_STRENGTH_WEIGHT * type_strength_avg)
            .clamp(0.0, 1.0);

        let single_weak = strengths.len() == 1 && strengths[0] == TypeStrength::Weak;

        Self {
            score,
            literal_ratio,
            type_strength_avg,
            placeholder_count: strengths.len(),
            overly_generic: score < GENERIC_THRESHOLD || single_weak,
        }
    }
}

/// 템플릿의 특이도 점수 (0.0-1.0)
pub fn specificity_score(template: &str, registry: &FieldTypeRegistry) -> f64 {
    Specificity::of(template, registry).score
}

/// 템플릿이 지나치게 일반적인지 여부
pub fn is_overly_generic(template: &str, registry: &FieldTypeRegistry) -> bool {
    Specificity::of(template, registry).overly_generic
}
