#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`template`]: `%{TYPE:name}` 템플릿 토크나이저
//! - [`field`]: 필드 타입 레지스트리 (강도 분류 + 값 검증기)
//! - [`grok`]: grok 패턴 라이브러리와 정규식 컴파일러 ([`TemplateCompiler`](logscout_core::TemplateCompiler) 구현)
//! - [`specificity`]: 템플릿 특이도 점수와 지나치게 일반적인 템플릿 판정
//! - [`matcher`]: 단일 라인 매칭과 필드 검증
//! - [`recommender`]: 포맷 추천기 (컴파일 집합 보관, 점수 산정, 순위 정렬, 배치 분석)
//! - [`loader`]: YAML/JSON 포맷 정의 로딩과 내장 카탈로그
//! - [`validation`]: 포맷 정의 품질 검증
//! - [`bootstrap`]: 설정 기반 카탈로그 조립
//! - [`config`]: 엔진 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! EngineConfig -> Catalog::load -> FormatRecommender::initialize
//!                  |                     |
//!        patterns + formats       compile (GrokCompiler)
//!
//! line -> FieldMatcher -> confidence / specificity -> ranking -> Vec<FormatRecommendation>
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod field;
pub mod grok;
pub mod loader;
pub mod matcher;
pub mod recommender;
pub mod specificity;
pub mod template;
pub mod validation;

// --- 주요 타입 re-export ---

// 추천기
pub use recommender::{
    BatchReport, FormatMatchSummary, FormatRecommender, FormatTally, LineRecommendations,
    RecommenderBuilder,
};

// 카탈로그
pub use bootstrap::Catalog;

// 설정
pub use config::EngineConfig;

// 에러
pub use error::EngineError;

// 컴파일러
pub use grok::{GrokCompiler, GrokPattern, PatternLibrary};

// 필드 타입
pub use field::{FieldType, FieldTypeRegistry, TypeStrength};

// 특이도
pub use specificity::{Specificity, is_overly_generic, specificity_score};

// 매칭
pub use matcher::{FieldMatcher, try_match};

// 로더
pub use loader::FormatLoader;

// 검증
pub use validation::{FormatValidation, ValidationStatus, ValidationSummary};
