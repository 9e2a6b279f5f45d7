//! 필드 타입 레지스트리
//!
//! 플레이스홀더 TYPE 태그마다 강도(strength)와 값 검증 함수를 연결합니다.
//! 새 타입은 서브클래싱이 아니라 [`FieldTypeRegistry::register`] 로 태그와
//! 검증 함수 쌍을 등록하여 추가합니다. 등록되지 않은 TYPE 은
//! [`TypeStrength::Unknown`] 으로 취급되며 검증 대상에서 제외됩니다.

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// 필드 값 검증 함수
pub type Validator = fn(&str) -> bool;

/// 플레이스홀더 TYPE 의 강도
///
/// 해당 TYPE 이 매칭 가능한 라인 집합을 얼마나 좁히는지를 나타냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeStrength {
    /// IP, 타임스탬프, 숫자 등 형태가 분명한 타입
    Strong,
    /// 등록되지 않은 사용자 정의 타입
    Unknown,
    /// GREEDYDATA, DATA, MESSAGE 같은 catch-all 타입
    Weak,
}

impl TypeStrength {
    /// 특이도 계산에 사용하는 가중치
    pub fn weight(self) -> f64 {
        match self {
            Self::Strong => 1.0,
            Self::Unknown => 0.5,
            Self::Weak => 0.1,
        }
    }
}

/// 등록된 필드 타입
#[derive(Debug, Clone, Copy)]
pub struct FieldType {
    /// 타입 강도
    pub strength: TypeStrength,
    /// 값 검증 함수 (없으면 검증 대상에서 제외)
    pub validator: Option<Validator>,
}

/// TYPE 태그 -> 필드 타입 레지스트리
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    types: HashMap<String, FieldType>,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl FieldTypeRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// 내장 타입이 등록된 레지스트리를 생성합니다.
    pub fn with_builtin() -> Self {
        use TypeStrength::{Strong, Weak};

        let mut registry = Self::new();

        for tag in ["IP", "IPV4", "IPV6", "SRC_IP", "DST_IP", "CLIENT_IP", "SERVER_IP"] {
            registry.register(tag, Strong, Some(validators::is_ip));
        }
        for tag in ["IPORHOST", "HOSTNAME", "HOST"] {
            registry.register(tag, Strong, Some(validators::is_ip_or_host));
        }
        for tag in ["NUMBER", "BASE10NUM"] {
            registry.register(tag, Strong, Some(validators::is_number));
        }
        registry.register("INT", Strong, Some(validators::is_int));
        registry.register("POSINT", Strong, Some(validators::is_posint));
        registry.register("NONNEGINT", Strong, Some(validators::is_nonnegint));
        registry.register("BASE16NUM", Strong, Some(validators::is_base16));
        for tag in ["PORT", "SRC_PORT", "DST_PORT"] {
            registry.register(tag, Strong, Some(validators::is_port));
        }
        for tag in ["HTTP_STATUS", "STATUS_CODE", "RESPONSE_CODE"] {
            registry.register(tag, Strong, Some(validators::is_http_status));
        }
        for tag in [
            "HTTPDATE",
            "TIMESTAMP_ISO8601",
            "SYSLOGTIMESTAMP",
            "DATESTAMP",
            "NGINX_TIMESTAMP",
            "DATETIME",
            "TIMESTAMP",
            "LOG_TIME",
        ] {
            registry.register(tag, Strong, Some(validators::is_datetime));
        }
        for tag in ["DATE", "DATE_US", "DATE_EU"] {
            registry.register(tag, Strong, Some(validators::is_date));
        }
        registry.register("TIME", Strong, Some(validators::is_time));
        registry.register("UUID", Strong, Some(validators::is_uuid));
        registry.register("MAC", Strong, Some(validators::is_mac));
        registry.register("LOGLEVEL", Strong, Some(validators::is_log_level));
        registry.register("METHOD", Strong, Some(validators::is_http_method));
        for tag in ["PATH", "UNIXPATH", "WINPATH"] {
            registry.register(tag, Strong, Some(validators::is_path));
        }

        for tag in ["GREEDYDATA", "DATA", "MESSAGE"] {
            registry.register(tag, Weak, None);
        }

        registry
    }

    /// 타입을 등록합니다. 같은 태그가 있으면 덮어씁니다.
    ///
    /// 태그는 대문자로 정규화됩니다.
    pub fn register(
        &mut self,
        tag: impl AsRef<str>,
        strength: TypeStrength,
        validator: Option<Validator>,
    ) -> &mut Self {
        self.types.insert(
            tag.as_ref().to_ascii_uppercase(),
            FieldType {
                strength,
                validator,
            },
        );
        self
    }

    /// 태그에 해당하는 타입을 조회합니다.
    pub fn lookup(&self, tag: &str) -> Option<&FieldType> {
        match self.types.get(tag) {
            Some(t) => Some(t),
            None => self.types.get(&tag.to_ascii_uppercase()),
        }
    }

    /// 태그의 강도 (미등록 태그는 `Unknown`)
    pub fn strength(&self, tag: &str) -> TypeStrength {
        self.lookup(tag)
            .map_or(TypeStrength::Unknown, |t| t.strength)
    }

    /// 값을 검증합니다. 검증 함수가 없는 타입이면 `None` 을 반환합니다.
    pub fn validate(&self, tag: &str, value: &str) -> Option<bool> {
        let validator = self.lookup(tag)?.validator?;
        Some(validator(value))
    }

    /// 등록된 태그 수
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// 레지스트리가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// 내장 검증 함수
pub mod validators {
    use super::*;

    /// 2100-01-01T00:00:00Z (초)
    const EPOCH_SECONDS_UPPER: u64 = 4_102_444_800;

    const DATETIME_TZ_LAYOUTS: &[&str] = &[
        "%d/%b/%Y:%H:%M:%S %z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f %z",
    ];

    const NAIVE_DATETIME_LAYOUTS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y%m%d%H%M%S",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m-%d-%Y %H:%M:%S",
        "%d.%m.%Y %H:%M:%S",
        "%m/%d/%y %H:%M:%S",
    ];

    const DATE_LAYOUTS: &[&str] = &[
        "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%m-%d-%Y", "%d-%m-%Y", "%d.%m.%Y",
        "%m/%d/%y",
    ];

    const TIME_LAYOUTS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

    const LOG_LEVELS: &[&str] = &[
        "alert",
        "trace",
        "debug",
        "notice",
        "info",
        "information",
        "warn",
        "warning",
        "err",
        "error",
        "crit",
        "critical",
        "fatal",
        "severe",
        "emerg",
        "emergency",
    ];

    const HTTP_METHODS: &[&str] = &[
        "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "CONNECT", "TRACE",
    ];

    /// IPv4 / IPv6 주소 (IPv6 zone id 허용)
    pub fn is_ip(value: &str) -> bool {
        let addr = value.split_once('%').map_or(value, |(addr, _zone)| addr);
        addr.parse::<IpAddr>().is_ok()
    }

    /// RFC 1123 호스트명
    pub fn is_hostname(value: &str) -> bool {
        let host = value.strip_suffix('.').unwrap_or(value);
        !host.is_empty()
            && host.len() <= 253
            && host.split('.').all(|label| {
                !label.is_empty()
                    && label.len() <= 63
                    && !label.starts_with('-')
                    && !label.ends_with('-')
                    && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            })
    }

    /// IP 주소 또는 호스트명
    pub fn is_ip_or_host(value: &str) -> bool {
        is_ip(value) || is_hostname(value)
    }

    /// 유한한 10진수
    pub fn is_number(value: &str) -> bool {
        value.parse::<f64>().is_ok_and(f64::is_finite)
    }

    /// 부호 있는 정수
    pub fn is_int(value: &str) -> bool {
        value.parse::<i64>().is_ok()
    }

    /// 양의 정수
    pub fn is_posint(value: &str) -> bool {
        value.parse::<u64>().is_ok_and(|n| n > 0)
    }

    /// 0 이상의 정수
    pub fn is_nonnegint(value: &str) -> bool {
        value.parse::<u64>().is_ok()
    }

    /// 16진수 (선택적 부호, `0x` 접두어)
    pub fn is_base16(value: &str) -> bool {
        let unsigned = value.trim_start_matches(['+', '-']);
        let digits = unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
            .unwrap_or(unsigned);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// 포트 번호 (0-65535)
    pub fn is_port(value: &str) -> bool {
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) && value.parse::<u16>().is_ok()
    }

    /// HTTP 상태 코드 (100-599)
    pub fn is_http_status(value: &str) -> bool {
        value.len() == 3 && value.parse::<u16>().is_ok_and(|code| (100..=599).contains(&code))
    }

    /// 날짜+시각 (타임존 포함/미포함, syslog, RFC 2822, unix epoch)
    pub fn is_datetime(value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        if DateTime::parse_from_rfc3339(value).is_ok() || DateTime::parse_from_rfc2822(value).is_ok()
        {
            return true;
        }
        if DATETIME_TZ_LAYOUTS
            .iter()
            .any(|layout| DateTime::parse_from_str(value, layout).is_ok())
        {
            return true;
        }
        if is_naive_datetime(value) {
            return true;
        }
        // log4j 스타일 쉼표 소수점 (2025-08-05 10:15:30,123)
        if value.contains(',') && is_naive_datetime(&value.replacen(',', ".", 1)) {
            return true;
        }
        is_syslog_timestamp(value) || is_unix_timestamp(value)
    }

    /// 날짜 (또는 날짜+시각)
    pub fn is_date(value: &str) -> bool {
        let value = value.trim();
        DATE_LAYOUTS
            .iter()
            .any(|layout| NaiveDate::parse_from_str(value, layout).is_ok())
            || is_datetime(value)
    }

    /// 시각
    pub fn is_time(value: &str) -> bool {
        let value = value.trim();
        TIME_LAYOUTS
            .iter()
            .any(|layout| NaiveTime::parse_from_str(value, layout).is_ok())
    }

    fn is_naive_datetime(value: &str) -> bool {
        NAIVE_DATETIME_LAYOUTS
            .iter()
            .any(|layout| NaiveDateTime::parse_from_str(value, layout).is_ok())
    }

    /// `Aug  5 10:15:30` 형식 (연도 없음)
    fn is_syslog_timestamp(value: &str) -> bool {
        let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
        let current_year = Utc::now().year();
        // 2월 29일은 윤년으로 한 번 더 시도
        [current_year, 2024].iter().any(|year| {
            NaiveDateTime::parse_from_str(&format!("{year} {collapsed}"), "%Y %b %d %H:%M:%S%.f")
                .is_ok()
        })
    }

    /// unix epoch 초(10자리) 또는 밀리초(13자리), 2100년 이전
    fn is_unix_timestamp(value: &str) -> bool {
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let Ok(n) = value.parse::<u64>() else {
            return false;
        };
        match value.len() {
            10 => n < EPOCH_SECONDS_UPPER,
            13 => n < EPOCH_SECONDS_UPPER * 1000,
            _ => false,
        }
    }

    /// UUID
    pub fn is_uuid(value: &str) -> bool {
        uuid::Uuid::parse_str(value).is_ok()
    }

    /// MAC 주소 (`aa:bb:cc:dd:ee:ff`, `aa-bb-...`, `aabb.ccdd.eeff`)
    pub fn is_mac(value: &str) -> bool {
        let hex_groups = |sep: char, count: usize, width: usize| {
            let groups: Vec<&str> = value.split(sep).collect();
            groups.len() == count
                && groups
                    .iter()
                    .all(|g| g.len() == width && g.chars().all(|c| c.is_ascii_hexdigit()))
        };
        hex_groups(':', 6, 2) || hex_groups('-', 6, 2) || hex_groups('.', 3, 4)
    }

    /// 로그 레벨 (대소문자 무시)
    pub fn is_log_level(value: &str) -> bool {
        let lower = value.to_ascii_lowercase();
        LOG_LEVELS.contains(&lower.as_str())
    }

    /// HTTP 메서드
    pub fn is_http_method(value: &str) -> bool {
        HTTP_METHODS.contains(&value)
    }

    /// 유닉스/윈도우 경로
    pub fn is_path(value: &str) -> bool {
        if value.is_empty() || value.chars().any(char::is_whitespace) {
            return false;
        }
        let bytes = value.as_bytes();
        let windows_drive =
            bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
        value.starts_with('/') || value.starts_with('\\') || windows_drive
    }
}
