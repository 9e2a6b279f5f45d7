//! 템플릿 토크나이저
//!
//! grok 스타일 템플릿을 리터럴, 정규식 구문, 플레이스홀더 세그먼트로 분해합니다.
//! 특이도 분류기와 grok 컴파일러가 같은 토큰화 결과를 공유합니다.
//!
//! # 규칙
//! - `%{TYPE}`, `%{TYPE:name}`, `%{TYPE:name:conv}` 는 플레이스홀더입니다.
//!   `%{TYPE:}` 는 `%{TYPE}` 으로 정규화됩니다.
//! - `\[` 처럼 구두점을 이스케이프한 문자는 리터럴입니다.
//! - `\s`, `.*`, `[^ ]+`, `(?:`, `|`, `{2,3}` 같은 정규식 구성요소는 구문(Syntax)입니다.
//! - 맨 앞의 `^` 와 맨 뒤의 (이스케이프되지 않은) `$` 는 앵커로 취급되어 제거됩니다.

use logscout_core::error::CompileError;

/// 템플릿 세그먼트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// 그대로 매칭되어야 하는 리터럴 텍스트 (이스케이프 해제됨)
    Literal(String),
    /// 정규식 구문 조각 (원문 그대로)
    Syntax(String),
    /// `%{TYPE:name}` 플레이스홀더
    Placeholder(Placeholder),
}

/// 플레이스홀더 토큰
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// 선언된 TYPE
    pub type_name: String,
    /// 필드 이름 (`%{TYPE}` 처럼 이름이 없으면 `None`)
    pub name: Option<String>,
    /// 템플릿 내 바이트 오프셋
    pub offset: usize,
}

/// 토큰화된 템플릿
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    anchored_start: bool,
    anchored_end: bool,
}

impl Template {
    /// 템플릿 문자열을 토큰화합니다.
    ///
    /// # Errors
    /// - 빈 템플릿 (앵커만 있는 경우 포함)
    /// - 닫히지 않은 `%{`
    /// - TYPE 이 비어 있는 플레이스홀더
    pub fn parse(template: &str) -> Result<Self, CompileError> {
        let (body, body_offset, anchored_start, anchored_end) = strip_anchors(template);
        if body.trim().is_empty() {
            return Err(CompileError::EmptyTemplate);
        }

        let mut tokenizer = Tokenizer {
            src: body,
            base: body_offset,
            pos: 0,
            segments: Vec::new(),
        };
        tokenizer.run()?;

        Ok(Self {
            segments: tokenizer.segments,
            anchored_start,
            anchored_end,
        })
    }

    /// 세그먼트 목록
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// 플레이스홀더 목록 (선언 순서)
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            _ => None,
        })
    }

    /// 리터럴 세그먼트 목록 (순서 유지)
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Literal(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// 정규식 구문 조각 수
    pub fn syntax_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Syntax(_)))
            .count()
    }

    /// 원본 템플릿이 `^` 로 시작했는지 여부
    pub fn anchored_start(&self) -> bool {
        self.anchored_start
    }

    /// 원본 템플릿이 `$` 로 끝났는지 여부
    pub fn anchored_end(&self) -> bool {
        self.anchored_end
    }
}

/// 앵커를 제거한 본문과 본문의 시작 오프셋을 반환합니다.
fn strip_anchors(template: &str) -> (&str, usize, bool, bool) {
    let (body, offset, start) = match template.strip_prefix('^') {
        Some(rest) => (rest, 1, true),
        None => (template, 0, false),
    };

    if let Some(rest) = body.strip_suffix('$') {
        let backslashes = rest.chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 0 {
            return (rest, offset, start, true);
        }
    }

    (body, offset, start, false)
}

struct Tokenizer<'a> {
    src: &'a str,
    base: usize,
    pos: usize,
    segments: Vec<Segment>,
}

impl Tokenizer<'_> {
    fn run(&mut self) -> Result<(), CompileError> {
        while let Some(c) = self.peek() {
            match c {
                '%' if self.rest().starts_with("%{") => self.placeholder()?,
                '\\' => self.escape(),
                '[' => self.class(),
                '(' => self.group_open(),
                ')' | '|' | '.' | '^' | '$' => {
                    self.bump();
                    self.push_syntax(c.to_string());
                }
                '*' | '+' | '?' => {
                    let start = self.pos;
                    self.bump();
                    // lazy / possessive 접미어
                    if matches!(self.peek(), Some('?' | '+')) {
                        self.bump();
                    }
                    self.push_syntax(self.src[start..self.pos].to_owned());
                }
                '{' => match repetition_len(self.rest()) {
                    Some(len) => {
                        let text = self.rest()[..len].to_owned();
                        self.pos += len;
                        self.push_syntax(text);
                    }
                    None => {
                        self.bump();
                        self.push_literal(c);
                    }
                },
                _ => {
                    self.bump();
                    self.push_literal(c);
                }
            }
        }
        Ok(())
    }

    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn push_literal(&mut self, c: char) {
        if let Some(Segment::Literal(text)) = self.segments.last_mut() {
            text.push(c);
        } else {
            self.segments.push(Segment::Literal(c.to_string()));
        }
    }

    fn push_syntax(&mut self, text: String) {
        self.segments.push(Segment::Syntax(text));
    }

    fn placeholder(&mut self) -> Result<(), CompileError> {
        let offset = self.base + self.pos;
        let inner_start = self.pos + 2;
        let close = self.src[inner_start..]
            .find('}')
            .ok_or(CompileError::UnbalancedPlaceholder { offset })?;
        let inner = &self.src[inner_start..inner_start + close];
        self.pos = inner_start + close + 1;

        let mut parts = inner.splitn(3, ':');
        let type_name = parts.next().unwrap_or_default().trim();
        if type_name.is_empty() {
            return Err(CompileError::EmptyType { offset });
        }
        let name = parts
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        self.segments.push(Segment::Placeholder(Placeholder {
            type_name: type_name.to_owned(),
            name,
            offset,
        }));
        Ok(())
    }

    fn escape(&mut self) {
        let start = self.pos;
        self.bump();
        let Some(c) = self.bump() else {
            // 끝에 남은 역슬래시는 정규식 컴파일 단계에서 거부됨
            self.push_syntax("\\".to_owned());
            return;
        };

        if !c.is_ascii_alphanumeric() {
            self.push_literal(c);
            return;
        }

        match c {
            'x' | 'p' | 'P' | 'u' | 'U' => {
                if self.peek() == Some('{') {
                    if let Some(close) = self.rest().find('}') {
                        self.pos += close + 1;
                    }
                } else if c == 'x' {
                    for _ in 0..2 {
                        if self.peek().is_some_and(|h| h.is_ascii_hexdigit()) {
                            self.bump();
                        }
                    }
                } else {
                    self.bump();
                }
            }
            _ => {}
        }
        self.push_syntax(self.src[start..self.pos].to_owned());
    }

    fn class(&mut self) {
        let start = self.pos;
        self.bump();
        if self.peek() == Some('^') {
            self.bump();
        }
        // 클래스 맨 앞의 `]` 는 리터럴
        if self.peek() == Some(']') {
            self.bump();
        }

        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        self.push_syntax(self.src[start..self.pos].to_owned());
    }

    fn group_open(&mut self) {
        let start = self.pos;
        self.bump();
        if self.peek() == Some('?') {
            while let Some(c) = self.bump() {
                if matches!(c, ':' | ')' | '>') {
                    break;
                }
            }
        }
        self.push_syntax(self.src[start..self.pos].to_owned());
    }
}

/// `{n}`, `{n,}`, `{n,m}` 반복자의 길이
fn repetition_len(s: &str) -> Option<usize> {
    let close = s.find('}')?;
    let inner = &s[1..close];
    let (min, max) = match inner.split_once(',') {
        Some((min, max)) => (min, Some(max)),
        None => (inner, None),
    };
    let digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());
    let valid = digits(min) && max.is_none_or(|m| m.is_empty() || digits(m));
    valid.then_some(close + 1)
}
