//! 포맷 정의 로더 -- YAML/JSON 포맷 정의 파일을 디스크에서 로드합니다.
//!
//! 정의 파일은 포맷 목록이거나 `formats:` 키 아래에 목록을 둔 문서입니다.
//!
//! ```yaml
//! formats:
//!   - name: nginx_access
//!     group: Web Server
//!     vendor: Nginx
//!     template: '^%{IP:client_ip} - %{NOTSPACE:user} \[%{HTTPDATE:timestamp}\] ...$'
//!     sample: '10.0.0.1 - - [05/Aug/2025:10:15:30 +0900] ...'
//! ```
//!
//! 디렉토리 로딩 시 개별 파일 실패는 경고 로그를 남기고 건너뜁니다.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use logscout_core::types::LogFormat;

use crate::error::EngineError;

/// 포맷 정의 파일 최대 크기
const MAX_FORMAT_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// 최대 포맷 수
const MAX_FORMATS_COUNT: usize = 10_000;

/// 내장 포맷 카탈로그
const BUILTIN_FORMATS: &str = include_str!("../formats/builtin.yml");

/// 정의 파일 최상위 구조
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FormatDocument {
    List(Vec<LogFormat>),
    Wrapped { formats: Vec<LogFormat> },
}

impl FormatDocument {
    fn into_formats(self) -> Vec<LogFormat> {
        match self {
            Self::List(formats) | Self::Wrapped { formats } => formats,
        }
    }
}

/// 포맷 정의 파일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Yaml,
    Json,
}

impl FileKind {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 포맷 정의 로더
pub struct FormatLoader;

impl FormatLoader {
    /// 내장 포맷 카탈로그를 로드합니다.
    pub fn builtin() -> Result<Vec<LogFormat>, EngineError> {
        Self::parse_yaml(BUILTIN_FORMATS, "<builtin>")
    }

    /// 파일 또는 디렉토리에서 포맷을 로드합니다.
    pub async fn load_path(path: impl AsRef<Path>) -> Result<Vec<LogFormat>, EngineError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| EngineError::FormatLoad {
                path: path.display().to_string(),
                reason: format!("failed to read metadata: {e}"),
            })?;

        if metadata.is_dir() {
            Self::load_directory(path).await
        } else {
            Self::load_file(path).await
        }
    }

    /// 디렉토리의 모든 포맷 정의 파일을 로드합니다.
    ///
    /// `.yml`, `.yaml`, `.json` 파일만 파일 이름 순으로 처리하며, 하위 디렉토리는
    /// 탐색하지 않습니다.
    ///
    /// # Errors
    /// - 디렉토리를 읽을 수 없는 경우
    /// - 포맷 수가 `MAX_FORMATS_COUNT`를 초과하는 경우
    pub async fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<LogFormat>, EngineError> {
        let dir = dir.as_ref();

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| EngineError::FormatLoad {
                path: dir.display().to_string(),
                reason: format!("failed to read directory: {e}"),
            })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EngineError::FormatLoad {
                path: dir.display().to_string(),
                reason: format!("failed to read directory entry: {e}"),
            })?
        {
            let path = entry.path();
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if is_file && FileKind::of(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut formats = Vec::new();
        for path in &paths {
            match Self::load_file(path).await {
                Ok(loaded) => formats.extend(loaded),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load format file, skipping"
                    );
                }
            }

            if formats.len() > MAX_FORMATS_COUNT {
                return Err(EngineError::FormatLoad {
                    path: dir.display().to_string(),
                    reason: format!("too many formats: max {MAX_FORMATS_COUNT}"),
                });
            }
        }

        let formats = Self::dedup(formats);

        tracing::info!(
            dir = %dir.display(),
            files = paths.len(),
            count = formats.len(),
            "loaded format definitions"
        );

        Ok(formats)
    }

    /// 단일 정의 파일에서 포맷을 로드합니다.
    pub async fn load_file(path: impl AsRef<Path>) -> Result<Vec<LogFormat>, EngineError> {
        let path = path.as_ref();
        let source = path.display().to_string();

        let kind = FileKind::of(path).ok_or_else(|| EngineError::FormatLoad {
            path: source.clone(),
            reason: "unsupported file extension (expected .yml, .yaml or .json)".to_owned(),
        })?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| EngineError::FormatLoad {
                path: source.clone(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > MAX_FORMAT_FILE_SIZE {
            return Err(EngineError::FormatLoad {
                path: source,
                reason: format!(
                    "file too large: {} bytes (max: {MAX_FORMAT_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| EngineError::FormatLoad {
                    path: source.clone(),
                    reason: format!("failed to read file: {e}"),
                })?;

        let formats = match kind {
            FileKind::Yaml => Self::parse_yaml(&content, &source)?,
            FileKind::Json => Self::parse_json(&content, &source)?,
        };

        tracing::debug!(path = %source, count = formats.len(), "parsed format file");

        Ok(Self::dedup(formats))
    }

    /// YAML 문자열을 파싱합니다.
    pub fn parse_yaml(yaml_str: &str, source: &str) -> Result<Vec<LogFormat>, EngineError> {
        let document: FormatDocument =
            serde_yaml::from_str(yaml_str).map_err(|e| EngineError::FormatLoad {
                path: source.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;
        Self::finish(document, source)
    }

    /// JSON 문자열을 파싱합니다.
    pub fn parse_json(json_str: &str, source: &str) -> Result<Vec<LogFormat>, EngineError> {
        let document: FormatDocument =
            serde_json::from_str(json_str).map_err(|e| EngineError::FormatLoad {
                path: source.to_owned(),
                reason: format!("JSON parse error: {e}"),
            })?;
        Self::finish(document, source)
    }

    fn finish(document: FormatDocument, source: &str) -> Result<Vec<LogFormat>, EngineError> {
        let formats = document.into_formats();

        if formats.len() > MAX_FORMATS_COUNT {
            return Err(EngineError::FormatLoad {
                path: source.to_owned(),
                reason: format!("too many formats: max {MAX_FORMATS_COUNT}"),
            });
        }

        for format in &formats {
            validate_format(format)?;
        }

        Ok(formats)
    }

    /// 이름이 중복된 포맷을 제거합니다. 먼저 나온 정의가 우선합니다.
    pub fn dedup(formats: Vec<LogFormat>) -> Vec<LogFormat> {
        let mut seen = HashSet::new();
        formats
            .into_iter()
            .filter(|format| {
                let fresh = seen.insert(format.name.clone());
                if !fresh {
                    tracing::warn!(format = %format.name, "duplicate format name, skipping");
                }
                fresh
            })
            .collect()
    }
}

/// 포맷 정의의 필수 필드를 검증합니다.
pub fn validate_format(format: &LogFormat) -> Result<(), EngineError> {
    if format.name.trim().is_empty() {
        return Err(EngineError::FormatValidation {
            name: format.name.clone(),
            reason: "name must not be empty".to_owned(),
        });
    }

    if format.template.trim().is_empty() {
        return Err(EngineError::FormatValidation {
            name: format.name.clone(),
            reason: "template must not be empty".to_owned(),
        });
    }

    Ok(())
}
