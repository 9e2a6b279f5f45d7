//! 포맷 추천 벤치마크
//!
//! 내장 카탈로그 전체를 대상으로 단일 라인 추천, 배치 추천, 템플릿 컴파일 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logscout_core::pipeline::TemplateCompiler;
use logscout_core::types::RecommendOptions;
use logscout_engine::{FormatLoader, FormatRecommender, GrokCompiler, RecommenderBuilder};

/// Apache 접근 로그
const ACCESS_LINE: &str =
    r#"192.168.1.100 - - [05/Aug/2025:10:15:30 +0900] "GET /index.html HTTP/1.1" 200 1234"#;

/// SSH 로그인 성공
const SSH_LINE: &str =
    "Aug  5 10:15:30 web01 sshd[4242]: Accepted publickey for alice from 10.0.0.5 port 52144 ssh2";

/// UFW 차단 로그 (긴 라인)
const UFW_LINE: &str = "Aug  5 10:15:30 gw01 kernel: [ 8123.456789] [UFW BLOCK] IN=eth0 OUT= MAC=52:54:00:12:34:56:52:54:00:65:43:21:08:00 SRC=203.0.113.9 DST=10.0.0.2 LEN=60 TOS=0x00 PREC=0x00 TTL=52 ID=54321 DF PROTO=TCP SPT=51515 DPT=22 WINDOW=29200 RES=0x00 SYN URGP=0";

/// 어떤 구체적 포맷에도 맞지 않는 라인
const PLAIN_LINE: &str = "This is just a simple message";

fn recommender() -> FormatRecommender {
    let recommender = RecommenderBuilder::new().build().unwrap();
    recommender
        .initialize(FormatLoader::builtin().unwrap())
        .unwrap();
    recommender
}

fn bench_recommend_single(c: &mut Criterion) {
    let recommender = recommender();
    let options = RecommendOptions::default();

    let mut group = c.benchmark_group("recommend_single");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [
        ("apache_access", ACCESS_LINE),
        ("ssh_accepted", SSH_LINE),
        ("ufw_block", UFW_LINE),
        ("no_match", PLAIN_LINE),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), line, |b, line| {
            b.iter(|| recommender.recommend(black_box(line), &options).unwrap())
        });
    }

    group.finish();
}

fn bench_recommend_batch(c: &mut Criterion) {
    let recommender = recommender();
    let options = RecommendOptions::default();
    let lines: Vec<&str> = [ACCESS_LINE, SSH_LINE, UFW_LINE, PLAIN_LINE]
        .iter()
        .cycle()
        .take(1000)
        .copied()
        .collect();

    let mut group = c.benchmark_group("recommend_batch");
    group.throughput(Throughput::Elements(lines.len() as u64));
    group.bench_function("mixed_1000", |b| {
        b.iter(|| {
            recommender
                .recommend_batch(black_box(&lines), &options)
                .unwrap()
        })
    });
    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let compiler = GrokCompiler::default();
    let formats = FormatLoader::builtin().unwrap();

    let mut group = c.benchmark_group("grok_compile");
    group.throughput(Throughput::Elements(formats.len() as u64));
    group.bench_function("builtin_catalog", |b| {
        b.iter(|| {
            for format in &formats {
                compiler.compile(black_box(&format.template)).unwrap();
            }
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_recommend_single,
    bench_recommend_batch,
    bench_compile
);
criterion_main!(benches);
