//! Benchmarks for language detection of decoded literals
//!
//! Run with: cargo bench --bench detect

use escape_lens::syntax::{HeuristicDetector, LanguageDetector};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

const JSON_SAMPLE: &str = r#"{"name": "escape-lens", "tags": ["a", "b"], "nested": {"n": 1}}"#;

const YAML_SAMPLE: &str = "name: build\non:\n  push:\n    branches: [main]\njobs:\n  test:\n    runs-on: ubuntu-latest\n";

const HTML_SAMPLE: &str = "<div class=\"card\">\n  <h1>Title</h1>\n  <p>Body text</p>\n</div>\n";

const SQL_SAMPLE: &str = "SELECT id, name\nFROM users\nWHERE active = 1\nORDER BY name;\n";

const PLAIN_SAMPLE: &str = "just a sentence with nothing special in it";

#[divan::bench(args = ["json", "yaml", "html", "sql", "plain"])]
fn detect_sample(bencher: divan::Bencher, lang: &str) {
    let text = match lang {
        "json" => JSON_SAMPLE,
        "yaml" => YAML_SAMPLE,
        "html" => HTML_SAMPLE,
        "sql" => SQL_SAMPLE,
        _ => PLAIN_SAMPLE,
    };
    let detector = HeuristicDetector::new();
    bencher.bench_local(|| divan::black_box(detector.detect(text)));
}

#[divan::bench(args = ["yaml", "html"])]
fn detect_cold(lang: &str) {
    let text = if lang == "yaml" { YAML_SAMPLE } else { HTML_SAMPLE };
    let detector = HeuristicDetector::new();
    divan::black_box(detector.detect(text));
}

#[divan::bench(args = [10, 100, 500])]
fn candidates_large_yaml(bencher: divan::Bencher, entries: usize) {
    let text: String = (0..entries)
        .map(|i| format!("key_{}: value {}\n", i, i))
        .collect();
    bencher.bench(|| divan::black_box(HeuristicDetector::candidates(&text)));
}
