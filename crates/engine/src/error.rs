//! 추천 엔진 에러 타입
//!
//! [`EngineError`]는 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<EngineError> for LogscoutError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 포맷 단위 컴파일 실패는 에러로 전파되지 않고
//! [`InitResult::skipped`](logscout_core::types::InitResult)에 기록됩니다.

use logscout_core::error::{CompileError, LogscoutError};

/// 추천 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// `initialize` 호출 전에 추천/조회를 시도함
    #[error("recommender is not initialized")]
    Uninitialized,

    /// `initialize` 를 두 번 호출함
    #[error("recommender is already initialized")]
    AlreadyInitialized,

    /// 유효하지 않은 추천 옵션
    #[error("invalid options: {field}: {reason}")]
    InvalidOptions {
        /// 옵션 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 컴파일된 집합에 없는 포맷
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// 템플릿 컴파일 실패
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// 포맷 정의 파일 로딩 실패
    #[error("format load error: {path}: {reason}")]
    FormatLoad {
        /// 포맷 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 포맷 정의 검증 실패
    #[error("format validation error: format '{name}': {reason}")]
    FormatValidation {
        /// 문제가 된 포맷 이름
        name: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// grok 패턴 파일 로딩 실패
    #[error("pattern load error: {path}: {reason}")]
    PatternLoad {
        /// 패턴 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<EngineError> for LogscoutError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Compile(e) => LogscoutError::Compile(e),
            EngineError::Io(e) => LogscoutError::Io(e),
            other => LogscoutError::Engine(other.to_string()),
        }
    }
}
