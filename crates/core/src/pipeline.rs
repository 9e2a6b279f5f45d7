//! 파이프라인 trait — 템플릿 컴파일러 확장 포인트 정의
//!
//! 추천 엔진은 특정 정규식 방언을 가정하지 않습니다. `%{TYPE:name}` 토큰 계약만
//! 공유하며, 실제 매칭 능력은 [`TemplateCompiler`] 구현체가 주입합니다.

use std::collections::BTreeMap;

use crate::error::CompileError;
use crate::types::FieldSpec;

/// 템플릿을 실행 가능한 패턴으로 컴파일하는 trait
///
/// 새로운 패턴 엔진을 지원하려면 이 trait을 구현합니다.
pub trait TemplateCompiler: Send + Sync {
    /// 컴파일 결과 타입
    type Pattern: CompiledPattern;

    /// 컴파일러 이름
    fn name(&self) -> &str;

    /// 템플릿을 컴파일합니다.
    ///
    /// 플레이스홀더 구분자가 맞지 않거나, strict 모드에서 알 수 없는 TYPE 이
    /// 사용된 경우 [`CompileError`] 를 반환합니다.
    fn compile(&self, template: &str) -> Result<Self::Pattern, CompileError>;
}

/// 컴파일된 패턴
///
/// 매칭 능력, 원본 템플릿, 필드 스키마 외에는 엔진에 불투명합니다.
pub trait CompiledPattern: Send + Sync {
    /// 원본 템플릿
    fn template(&self) -> &str;

    /// 템플릿에 선언된 필드 (선언 순서)
    fn fields(&self) -> &[FieldSpec];

    /// 라인 전체(시작-끝 앵커)에 대한 구조적 매칭
    ///
    /// 매칭되면 필드 이름 -> 원본 값 매핑을, 아니면 `None` 을 반환합니다.
    /// 매칭되지 않은 선택적 필드는 매핑에 포함되지 않습니다.
    fn try_match_structure(&self, line: &str) -> Option<BTreeMap<String, String>>;

    /// 구조적 매칭 성공이 리터럴 전체의 정렬을 보장하는지 여부
    ///
    /// 근사/부분 매칭을 허용하는 구현체는 `false` 를 반환하고,
    /// 엔진이 리터럴 커버리지를 직접 계산합니다.
    fn guarantees_literal_alignment(&self) -> bool {
        true
    }
}
