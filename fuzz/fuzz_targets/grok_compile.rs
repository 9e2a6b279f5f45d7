#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use logscout_core::pipeline::{CompiledPattern, TemplateCompiler};
use logscout_engine::grok::GrokCompiler;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    template: String,
    line: String,
    strict: bool,
}

fuzz_target!(|input: FuzzInput| {
    // 정규식 프로그램 크기를 작게 제한하여 퍼징 속도 유지
    let compiler = GrokCompiler::default()
        .with_strict(input.strict)
        .with_size_limit(1024 * 1024);

    if let Ok(pattern) = compiler.compile(&input.template) {
        if let Some(fields) = pattern.try_match_structure(&input.line) {
            // 추출된 필드는 모두 선언된 필드
            for name in fields.keys() {
                assert!(pattern.fields().iter().any(|f| &f.name == name));
            }
        }
    }
});
