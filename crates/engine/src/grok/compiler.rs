//! grok 템플릿 컴파일러
//!
//! [`Template`] 토큰화 결과를 `regex` 크레이트 정규식으로 변환합니다.
//!
//! - 리터럴은 `regex::escape` 로 이스케이프합니다.
//! - 정규식 구문 조각은 그대로 유지합니다.
//! - 이름 있는 플레이스홀더는 `(?P<f0>...)`, `(?P<f1>...)` 캡처 그룹이 되고,
//!   이름 없는 플레이스홀더는 비캡처 그룹이 됩니다.
//! - 라이브러리 정의 안의 `%{...}` 참조는 비캡처 그룹으로 재귀 확장됩니다.
//! - 전체는 `^(?:...)$` 로 감싸 라인 전체에 앵커링합니다.
//! - 확장된 정규식 텍스트가 크기 제한을 넘으면 정규식 빌드 전에 중단합니다.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Regex, RegexBuilder};

use logscout_core::error::CompileError;
use logscout_core::pipeline::{CompiledPattern, TemplateCompiler};
use logscout_core::types::FieldSpec;

use super::library::PatternLibrary;
use crate::template::{Segment, Template};

/// 패턴 확장 최대 깊이
pub const MAX_EXPANSION_DEPTH: usize = 32;

/// 기본 정규식 프로그램 크기 제한 (10MB)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 10 * 1024 * 1024;

/// non-strict 모드에서 알 수 없는 TYPE 에 사용하는 대체 정의
const FALLBACK_DEFINITION: &str = ".*?";

/// grok 템플릿 컴파일러
#[derive(Debug, Clone)]
pub struct GrokCompiler {
    library: PatternLibrary,
    strict: bool,
    size_limit: usize,
}

impl Default for GrokCompiler {
    fn default() -> Self {
        Self::new(PatternLibrary::builtin())
    }
}

impl GrokCompiler {
    /// 주어진 패턴 라이브러리로 strict 컴파일러를 생성합니다.
    pub fn new(library: PatternLibrary) -> Self {
        Self {
            library,
            strict: true,
            size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }

    /// strict 모드를 설정합니다.
    ///
    /// 비활성화하면 라이브러리에 없는 TYPE 은 `DATA` 와 같은 lazy 와일드카드로 대체됩니다.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 컴파일된 정규식 프로그램 크기 제한을 설정합니다.
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// 패턴 라이브러리
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// strict 모드 여부
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// TYPE 을 정규식 텍스트로 확장합니다.
    ///
    /// 확장 결과는 `cache` 에 저장되어 같은 컴파일 안에서 다시 계산되지 않습니다.
    /// 확장 텍스트가 `size_limit` 를 넘으면 즉시 중단합니다.
    fn expand(
        &self,
        type_name: &str,
        depth: usize,
        cache: &mut HashMap<String, String>,
    ) -> Result<String, CompileError> {
        if let Some(done) = cache.get(type_name) {
            return Ok(done.clone());
        }

        if depth > MAX_EXPANSION_DEPTH {
            return Err(CompileError::RecursionLimit {
                pattern: type_name.to_owned(),
                depth: MAX_EXPANSION_DEPTH,
            });
        }

        let Some(definition) = self.library.get(type_name) else {
            if self.strict {
                return Err(CompileError::UnknownPattern(type_name.to_owned()));
            }
            tracing::debug!(type_name, "unknown pattern type, using wildcard");
            return Ok(FALLBACK_DEFINITION.to_owned());
        };

        let mut out = String::with_capacity(definition.len());
        let mut rest = definition;
        while let Some(start) = rest.find("%{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(close) = after.find('}') else {
                // 닫히지 않은 참조는 그대로 두고 정규식 컴파일 단계에서 판단
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let inner = &after[..close];
            let nested = inner.split(':').next().unwrap_or_default().trim();
            if nested.is_empty() {
                return Err(CompileError::EmptyReference {
                    pattern: type_name.to_owned(),
                });
            }
            let body = self.expand(nested, depth + 1, cache)?;
            out.push_str("(?:");
            out.push_str(&body);
            out.push(')');
            self.check_size(type_name, out.len())?;
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        self.check_size(type_name, out.len())?;

        cache.insert(type_name.to_owned(), out.clone());
        Ok(out)
    }

    fn check_size(&self, pattern: &str, len: usize) -> Result<(), CompileError> {
        if len > self.size_limit {
            return Err(CompileError::ExpansionTooLarge {
                pattern: pattern.to_owned(),
                limit: self.size_limit,
            });
        }
        Ok(())
    }
}

impl TemplateCompiler for GrokCompiler {
    type Pattern = GrokPattern;

    fn name(&self) -> &str {
        "grok"
    }

    fn compile(&self, template: &str) -> Result<GrokPattern, CompileError> {
        let parsed = Template::parse(template)?;

        let mut source = String::from("^(?:");
        let mut fields = Vec::new();
        let mut group_names = Vec::new();
        let mut used_names = HashSet::new();
        let mut name_counters: HashMap<String, usize> = HashMap::new();
        let mut cache = HashMap::new();

        for segment in parsed.segments() {
            match segment {
                Segment::Literal(text) => source.push_str(&regex::escape(text)),
                Segment::Syntax(text) => source.push_str(text),
                Segment::Placeholder(placeholder) => {
                    let body = self.expand(&placeholder.type_name, 0, &mut cache)?;
                    match &placeholder.name {
                        Some(name) => {
                            let group = format!("f{}", fields.len());
                            source.push_str(&format!("(?P<{group}>{body})"));
                            fields.push(FieldSpec {
                                name: unique_field_name(
                                    name,
                                    &mut used_names,
                                    &mut name_counters,
                                ),
                                type_name: placeholder.type_name.clone(),
                            });
                            group_names.push(group);
                        }
                        None => source.push_str(&format!("(?:{body})")),
                    }
                    self.check_size(&placeholder.type_name, source.len())?;
                }
            }
        }
        source.push_str(")$");

        let regex = RegexBuilder::new(&source)
            .size_limit(self.size_limit)
            .build()
            .map_err(|e| CompileError::InvalidRegex(e.to_string()))?;

        tracing::debug!(
            template,
            fields = fields.len(),
            "compiled grok template"
        );

        Ok(GrokPattern {
            template: template.to_owned(),
            regex,
            fields,
            group_names,
        })
    }
}

/// 중복된 필드 이름에 `_1`, `_2`, ... 접미어를 붙입니다.
fn unique_field_name(
    name: &str,
    used: &mut HashSet<String>,
    counters: &mut HashMap<String, usize>,
) -> String {
    if used.insert(name.to_owned()) {
        return name.to_owned();
    }

    let counter = counters.entry(name.to_owned()).or_insert(0);
    loop {
        *counter += 1;
        let candidate = format!("{name}_{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
    }
}

/// 컴파일된 grok 패턴
#[derive(Debug, Clone)]
pub struct GrokPattern {
    template: String,
    regex: Regex,
    fields: Vec<FieldSpec>,
    /// `fields` 와 같은 순서의 캡처 그룹 이름
    group_names: Vec<String>,
}

impl GrokPattern {
    /// 확장된 정규식
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl CompiledPattern for GrokPattern {
    fn template(&self) -> &str {
        &self.template
    }

    fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    fn try_match_structure(&self, line: &str) -> Option<BTreeMap<String, String>> {
        let captures = self.regex.captures(line)?;

        let extracted = self
            .fields
            .iter()
            .zip(&self.group_names)
            .filter_map(|(field, group)| {
                captures
                    .name(group)
                    .map(|m| (field.name.clone(), m.as_str().to_owned()))
            })
            .collect();

        Some(extracted)
    }
}
