#![no_main]

use libfuzzer_sys::fuzz_target;
use logscout_engine::field::FieldTypeRegistry;
use logscout_engine::specificity::Specificity;
use logscout_engine::template::Template;

fuzz_target!(|data: &[u8]| {
    if let Ok(template) = std::str::from_utf8(data) {
        let _ = Template::parse(template);

        // 특이도 점수는 어떤 입력에서도 [0, 1] 범위
        let registry = FieldTypeRegistry::with_builtin();
        let specificity = Specificity::of(template, &registry);
        assert!((0.0..=1.0).contains(&specificity.score));
    }
});
