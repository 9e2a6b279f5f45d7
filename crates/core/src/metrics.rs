//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 엔진은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다. 레코더가 설치되지 않은
//! 환경(CLI 단발 실행 등)에서는 모두 no-op 입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logscout_`
//! - 모듈명: `engine_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logscout_core::metrics::ENGINE_RECOMMEND_REQUESTS_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (matched, empty)
pub const LABEL_RESULT: &str = "result";

// ─── Engine 메트릭 ─────────────────────────────────────────────────

/// Engine: 컴파일된 포맷 수 (gauge)
pub const ENGINE_FORMATS_COMPILED: &str = "logscout_engine_formats_compiled";

/// Engine: 컴파일 실패로 제외된 포맷 수 (counter)
pub const ENGINE_FORMATS_SKIPPED_TOTAL: &str = "logscout_engine_formats_skipped_total";

/// Engine: 추천 요청 수 (counter, label: result)
pub const ENGINE_RECOMMEND_REQUESTS_TOTAL: &str = "logscout_engine_recommend_requests_total";

/// Engine: 구조적 매칭에 성공한 후보 수 (counter)
pub const ENGINE_CANDIDATES_MATCHED_TOTAL: &str = "logscout_engine_candidates_matched_total";

/// Engine: 추천 처리 시간 (histogram, 초)
pub const ENGINE_RECOMMEND_DURATION_SECONDS: &str = "logscout_engine_recommend_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더를 설치한 임베딩 애플리케이션이 시작 시점에 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_gauge!(
        ENGINE_FORMATS_COMPILED,
        "Number of log formats in the compiled recommendation set"
    );
    describe_counter!(
        ENGINE_FORMATS_SKIPPED_TOTAL,
        "Total number of log formats excluded because their template failed to compile"
    );
    describe_counter!(
        ENGINE_RECOMMEND_REQUESTS_TOTAL,
        "Total number of recommendation requests by result"
    );
    describe_counter!(
        ENGINE_CANDIDATES_MATCHED_TOTAL,
        "Total number of candidate formats that structurally matched an input line"
    );
    describe_histogram!(
        ENGINE_RECOMMEND_DURATION_SECONDS,
        "Time to rank all formats for a single line in seconds"
    );
}
