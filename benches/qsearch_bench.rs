use criterion::{criterion_group, criterion_main, Criterion, black_box};
use tactician::{Position, SearchConfig, Searcher, TranspositionCache};

fn bench_qsearch(c: &mut Criterion) {
    let start = Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4").unwrap();
    c.bench_function("qsearch_tactical", |ben| {
        ben.iter(|| {
            let mut pos = start.clone();
            let mut tt = TranspositionCache::default();
            let mut s = Searcher::new(&mut tt, SearchConfig::default());
            let v = s.qsearch_eval_cp(black_box(&mut pos), true);
            black_box(v.ok())
        })
    });
}

criterion_group!(benches, bench_qsearch);
criterion_main!(benches);
