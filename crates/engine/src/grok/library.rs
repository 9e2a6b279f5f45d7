//! grok 기본 패턴 라이브러리
//!
//! `NAME -> 정의` 매핑입니다. 정의 안에서 `%{OTHER}` 로 다른 패턴을 참조할 수 있습니다.
//! 내장 정의는 `regex` 크레이트 문법(look-around 없음)으로 작성되어 있으며,
//! 사용자 패턴 파일(`NAME definition` 라인 형식)로 확장하거나 덮어쓸 수 있습니다.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::error::EngineError;

/// 패턴 파일 최대 크기
const MAX_PATTERN_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// 내장 기본 패턴
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    // 텍스트
    ("USERNAME", r"[a-zA-Z0-9._-]+"),
    ("USER", r"%{USERNAME}"),
    ("WORD", r"\b\w+\b"),
    ("NOTSPACE", r"\S+"),
    ("SPACE", r"\s*"),
    ("DATA", r".*?"),
    ("GREEDYDATA", r".*"),
    ("MESSAGE", r".*"),
    ("QUOTEDSTRING", r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#),
    ("UUID", r"[A-Fa-f0-9]{8}-(?:[A-Fa-f0-9]{4}-){3}[A-Fa-f0-9]{12}"),
    // 숫자
    ("INT", r"[+-]?[0-9]+"),
    ("BASE10NUM", r"[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)"),
    ("NUMBER", r"%{BASE10NUM}"),
    ("BASE16NUM", r"[+-]?(?:0[xX])?[0-9A-Fa-f]+"),
    ("POSINT", r"\b[1-9][0-9]*\b"),
    ("NONNEGINT", r"\b[0-9]+\b"),
    // 네트워크
    (
        "MAC",
        r"(?:[A-Fa-f0-9]{2}[:-]){5}[A-Fa-f0-9]{2}|(?:[A-Fa-f0-9]{4}\.){2}[A-Fa-f0-9]{4}",
    ),
    (
        "IPV4",
        r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])(?:\.(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])){3}",
    ),
    (
        "IPV6",
        r"(?:[0-9A-Fa-f]{0,4}:){2,7}(?:%{IPV4}|[0-9A-Fa-f]{0,4})(?:%[0-9A-Za-z]+)?",
    ),
    ("IP", r"%{IPV6}|%{IPV4}"),
    ("SRC_IP", r"%{IP}"),
    ("DST_IP", r"%{IP}"),
    ("CLIENT_IP", r"%{IP}"),
    ("SERVER_IP", r"%{IP}"),
    (
        "HOSTNAME",
        r"\b[0-9A-Za-z][0-9A-Za-z-]{0,62}(?:\.[0-9A-Za-z][0-9A-Za-z-]{0,62})*\.?",
    ),
    ("HOST", r"%{HOSTNAME}"),
    ("IPORHOST", r"%{IP}|%{HOSTNAME}"),
    ("PORT", r"[0-9]{1,5}"),
    ("SRC_PORT", r"%{PORT}"),
    ("DST_PORT", r"%{PORT}"),
    ("HOSTPORT", r"%{IPORHOST}:%{POSINT}"),
    // 경로 / URI
    ("UNIXPATH", r"(?:/[\w_%!$@:.,+~-]*)+"),
    ("WINPATH", r"(?:[A-Za-z]+:|\\)(?:\\[^\\?*]*)+"),
    ("PATH", r"%{UNIXPATH}|%{WINPATH}"),
    ("URIPROTO", r"[A-Za-z][A-Za-z0-9+\-.]*"),
    ("URIHOST", r"%{IPORHOST}(?::%{POSINT})?"),
    ("URIPATH", r"(?:/[A-Za-z0-9$.+!*'(){},~:;=@#%&_\-]*)+"),
    ("URIPARAM", r"\?[A-Za-z0-9$.+!*'|(){},~@#%&/=:;_?\-\[\]<>]*"),
    ("URIPATHPARAM", r"%{URIPATH}(?:%{URIPARAM})?"),
    (
        "URI",
        r"%{URIPROTO}://(?:%{USER}(?::[^@]*)?@)?(?:%{URIHOST})?(?:%{URIPATHPARAM})?",
    ),
    // 날짜 / 시각
    (
        "MONTH",
        r"\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\b",
    ),
    ("MONTHNUM", r"0?[1-9]|1[0-2]"),
    ("MONTHDAY", r"0[1-9]|[12][0-9]|3[01]|[1-9]"),
    (
        "DAY",
        r"Mon(?:day)?|Tue(?:sday)?|Wed(?:nesday)?|Thu(?:rsday)?|Fri(?:day)?|Sat(?:urday)?|Sun(?:day)?",
    ),
    ("YEAR", r"(?:\d\d){1,2}"),
    ("HOUR", r"2[0123]|[01]?[0-9]"),
    ("MINUTE", r"[0-5][0-9]"),
    ("SECOND", r"(?:[0-5]?[0-9]|60)(?:[:.,][0-9]+)?"),
    ("TIME", r"%{HOUR}:%{MINUTE}(?::%{SECOND})?"),
    ("DATE_US", r"%{MONTHNUM}[/-]%{MONTHDAY}[/-]%{YEAR}"),
    ("DATE_EU", r"%{MONTHDAY}[./-]%{MONTHNUM}[./-]%{YEAR}"),
    ("DATE", r"%{DATE_US}|%{DATE_EU}"),
    ("ISO8601_TIMEZONE", r"Z|[+-]%{HOUR}(?::?%{MINUTE})"),
    (
        "TIMESTAMP_ISO8601",
        r"%{YEAR}-%{MONTHNUM}-%{MONTHDAY}[T ]%{HOUR}:?%{MINUTE}(?::?%{SECOND})?%{ISO8601_TIMEZONE}?",
    ),
    ("DATESTAMP", r"%{DATE}[- ]%{TIME}"),
    ("NGINX_TIMESTAMP", r"%{YEAR}/%{MONTHNUM}/%{MONTHDAY} %{TIME}"),
    ("TZ", r"[APMCE][SD]T|UTC"),
    ("HTTPDATE", r"%{MONTHDAY}/%{MONTH}/%{YEAR}:%{TIME} %{INT}"),
    ("SYSLOGTIMESTAMP", r"%{MONTH} +%{MONTHDAY} %{TIME}"),
    ("DATETIME", r"%{TIMESTAMP_ISO8601}|%{DATESTAMP}"),
    ("TIMESTAMP", r"%{TIMESTAMP_ISO8601}|%{HTTPDATE}|%{SYSLOGTIMESTAMP}"),
    (
        "LOG_TIME",
        r"%{TIMESTAMP_ISO8601}|%{HTTPDATE}|%{SYSLOGTIMESTAMP}|%{NGINX_TIMESTAMP}|%{DATESTAMP}",
    ),
    // 로그 공통
    ("PROG", r"[\x21-\x5a\x5c\x5e-\x7e]+"),
    ("SYSLOGPROG", r"%{PROG}(?:\[%{POSINT}\])?"),
    (
        "LOGLEVEL",
        r"[Aa]lert|ALERT|[Tt]race|TRACE|[Dd]ebug|DEBUG|[Nn]otice|NOTICE|[Ii]nfo(?:rmation)?|INFO(?:RMATION)?|[Ww]arn(?:ing)?|WARN(?:ING)?|[Ee]rr(?:or)?|ERR(?:OR)?|[Cc]rit(?:ical)?|CRIT(?:ICAL)?|[Ff]atal|FATAL|[Ss]evere|SEVERE|[Ee]merg(?:ency)?|EMERG(?:ENCY)?",
    ),
    ("METHOD", r"\b(?:GET|POST|PUT|DELETE|HEAD|OPTIONS|PATCH|CONNECT|TRACE)\b"),
    ("HTTP_STATUS", r"[1-5][0-9]{2}"),
    ("STATUS_CODE", r"%{HTTP_STATUS}"),
    ("RESPONSE_CODE", r"%{HTTP_STATUS}"),
];

/// grok 패턴 라이브러리
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: HashMap<String, String>,
}

impl PatternLibrary {
    /// 빈 라이브러리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 내장 기본 패턴이 등록된 라이브러리를 생성합니다.
    pub fn builtin() -> Self {
        let patterns = BUILTIN_PATTERNS
            .iter()
            .map(|(name, def)| ((*name).to_owned(), (*def).to_owned()))
            .collect();
        Self { patterns }
    }

    /// 패턴을 등록합니다. 같은 이름이 있으면 덮어씁니다.
    pub fn insert(&mut self, name: impl Into<String>, definition: impl Into<String>) {
        self.patterns.insert(name.into(), definition.into());
    }

    /// 패턴 정의를 조회합니다.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    /// 패턴 존재 여부
    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// 등록된 패턴 수
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// 라이브러리가 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 등록된 패턴 이름 (정렬됨)
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// `NAME definition` 라인 형식의 텍스트를 파싱하여 등록합니다.
    ///
    /// `#` 주석과 빈 줄은 건너뛰고, 형식이 맞지 않는 줄은 경고 로그를 남기고
    /// 건너뜁니다. 등록된 패턴 수를 반환합니다.
    pub fn parse_definitions(&mut self, text: &str, source: &str) -> Result<usize, EngineError> {
        let line_re = Regex::new(r"^([A-Z][A-Z0-9_]*)\s+(.+)$")?;
        let mut count = 0;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line_re.captures(line) {
                Some(caps) => {
                    self.insert(&caps[1], caps[2].trim());
                    count += 1;
                }
                None => {
                    tracing::warn!(
                        source,
                        line = idx + 1,
                        "malformed pattern definition, skipping"
                    );
                }
            }
        }

        Ok(count)
    }

    /// 패턴 파일을 로드합니다.
    pub async fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| EngineError::PatternLoad {
                path: path.display().to_string(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > MAX_PATTERN_FILE_SIZE {
            return Err(EngineError::PatternLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_PATTERN_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| EngineError::PatternLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        let count = self.parse_definitions(&content, &path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            count,
            "loaded custom grok patterns"
        );

        Ok(count)
    }
}
