//! 에러 타입 — 도메인별 에러 정의

/// logscout 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogscoutError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 템플릿 컴파일 에러
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// 추천 엔진 에러
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 템플릿 컴파일 에러
///
/// 포맷 단위의 소프트 실패입니다. 초기화 시 해당 포맷만 제외되고
/// 나머지 포맷의 컴파일은 계속 진행됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// 빈 템플릿
    #[error("template is empty")]
    EmptyTemplate,

    /// `%{` 에 대응하는 `}` 가 없음
    #[error("unbalanced placeholder at offset {offset}")]
    UnbalancedPlaceholder { offset: usize },

    /// 플레이스홀더의 TYPE 이 비어 있음
    #[error("placeholder at offset {offset} has an empty type")]
    EmptyType { offset: usize },

    /// 패턴 라이브러리에 없는 TYPE (strict 모드)
    #[error("unknown pattern type: {0}")]
    UnknownPattern(String),

    /// 라이브러리 정의 안의 `%{}` 참조에 TYPE 이 비어 있음
    #[error("library pattern '{pattern}' contains a reference with an empty type")]
    EmptyReference { pattern: String },

    /// 패턴 확장 깊이 초과 (순환 정의 포함)
    #[error("pattern expansion exceeded depth {depth} at '{pattern}'")]
    RecursionLimit { pattern: String, depth: usize },

    /// 확장된 정규식 텍스트가 크기 제한을 넘음
    #[error("expansion of '{pattern}' exceeds the size limit of {limit} bytes")]
    ExpansionTooLarge { pattern: String, limit: usize },

    /// 확장된 정규식이 유효하지 않음
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
}
