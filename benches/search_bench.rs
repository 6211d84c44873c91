use criterion::{criterion_group, criterion_main, Criterion, black_box};
use tactician::{CacheMode, Position, SearchConfig, Searcher, TranspositionCache};

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_depth_3_startpos");
    group.sample_size(10);
    for (name, use_cache, cache_mode) in [
        ("no_cache", false, CacheMode::Bounded),
        ("bounded", true, CacheMode::Bounded),
        ("unconditional", true, CacheMode::Unconditional),
    ] {
        group.bench_function(name, |ben| {
            ben.iter(|| {
                let mut pos = Position::startpos();
                let mut tt = TranspositionCache::new(cache_mode);
                let cfg = SearchConfig { use_cache, cache_mode, ..SearchConfig::default() };
                let r = Searcher::new(&mut tt, cfg).choose_move(black_box(&mut pos), 3, false);
                black_box(r.map(|r| r.nodes).ok())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
