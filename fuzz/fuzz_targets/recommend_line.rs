#![no_main]

use std::sync::LazyLock;

use libfuzzer_sys::fuzz_target;

use logscout_core::types::RecommendOptions;
use logscout_engine::loader::FormatLoader;
use logscout_engine::recommender::{FormatRecommender, RecommenderBuilder};

static RECOMMENDER: LazyLock<FormatRecommender> = LazyLock::new(|| {
    let recommender = RecommenderBuilder::new().build().expect("default builder");
    let formats = FormatLoader::builtin().expect("builtin catalog");
    recommender.initialize(formats).expect("first initialize");
    recommender
});

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let options = RecommendOptions::default()
        .with_exclude_overly_generic(false)
        .with_max_results(10);

    let results = RECOMMENDER.recommend(&line, &options).expect("valid options");
    assert!(results.len() <= 10);
    for pair in results.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    for r in &results {
        assert!((0.0..=100.0).contains(&r.confidence));
    }
});
