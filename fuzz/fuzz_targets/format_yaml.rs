#![no_main]

use libfuzzer_sys::fuzz_target;
use logscout_engine::loader::FormatLoader;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        // 파싱에 성공한 포맷은 이름과 템플릿이 비어 있지 않음
        if let Ok(formats) = FormatLoader::parse_yaml(yaml, "fuzz.yml") {
            for f in &formats {
                assert!(!f.name.trim().is_empty());
                assert!(!f.template.trim().is_empty());
            }
        }
    }
});
