//! grok 스타일 템플릿 컴파일러
//!
//! - [`PatternLibrary`]: `NAME -> 정의` 기본 패턴 라이브러리 (내장 + 사용자 패턴 파일)
//! - [`GrokCompiler`]: [`TemplateCompiler`](logscout_core::pipeline::TemplateCompiler) 구현
//! - [`GrokPattern`]: `regex` 기반 [`CompiledPattern`](logscout_core::pipeline::CompiledPattern)

pub mod compiler;
pub mod library;

pub use compiler::{DEFAULT_REGEX_SIZE_LIMIT, GrokCompiler, GrokPattern, MAX_EXPANSION_DEPTH};
pub use library::PatternLibrary;
