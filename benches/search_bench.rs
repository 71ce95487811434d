use criterion::{black_box, criterion_group, criterion_main, Criterion};
use talpa::{build_index, regular_search, Engine, DOC_MARKER_END, DOC_MARKER_START};

/// Deterministic synthetic corpus: `docs` documents of repeated prose with
/// a sprinkling of rarer words to exercise the stem index.
fn synthetic_corpus(docs: usize) -> String {
    let fillers = [
        "the quick brown fox jumps over the lazy dog",
        "running runners ran a marathon yesterday",
        "nothing of consequence happened here today",
        "searching for needles in expanding haystacks",
    ];
    let mut out = String::new();
    for doc in 0..docs {
        out.push(DOC_MARKER_START);
        out.push_str(&format!("articles/{doc}"));
        out.push(DOC_MARKER_END);
        for line in 0..20 {
            out.push_str(fillers[(doc + line) % fillers.len()]);
            out.push_str(". ");
        }
    }
    out
}

fn bench_load(c: &mut Criterion) {
    let corpus = synthetic_corpus(200);
    c.bench_function("load_200_docs", |b| {
        b.iter(|| {
            let mut engine = Engine::new();
            engine.load(black_box(corpus.clone()));
            engine
        });
    });
}

fn bench_build_index(c: &mut Criterion) {
    let corpus = synthetic_corpus(200);
    c.bench_function("build_index_200_docs", |b| {
        b.iter(|| build_index(black_box(&corpus)));
    });
}

fn bench_search(c: &mut Criterion) {
    let mut engine = Engine::new();
    engine.load(synthetic_corpus(200));

    c.bench_function("search_regular", |b| {
        b.iter(|| engine.search(black_box("running fox")));
    });
    c.bench_function("search_exact_phrase", |b| {
        b.iter(|| engine.search(black_box("\"lazy dog\" haystacks")));
    });
}

fn bench_regular_lookup(c: &mut Criterion) {
    let corpus = synthetic_corpus(200);
    let index = build_index(&corpus);
    c.bench_function("regular_search_lookup", |b| {
        b.iter(|| regular_search(black_box(&index), black_box("running")));
    });
}

fn bench_context(c: &mut Criterion) {
    let mut engine = Engine::new();
    engine.load(synthetic_corpus(200));
    engine.search("fox");

    c.bench_function("get_context", |b| {
        b.iter(|| engine.get_context(black_box(7), black_box((0, 400))));
    });
}

criterion_group!(
    benches,
    bench_load,
    bench_build_index,
    bench_search,
    bench_regular_lookup,
    bench_context
);
criterion_main!(benches);
