use criterion::{criterion_group, criterion_main, Criterion, black_box};
use tactician::Position;

fn bench_eval(c: &mut Criterion) {
    let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3").unwrap();
    c.bench_function("evaluate_italian", |ben| {
        ben.iter(|| {
            let v = tactician::search::eval::evaluate(black_box(&pos), 0);
            black_box(v)
        })
    });
}

criterion_group!(benches, bench_eval);
criterion_main!(benches);
