use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let short_query = "logs | where severity == \"high\"";
    let long_query = "
        StormEvents
        | where StartTime > ago(7d)
        | where State == \"TEXAS\" and EventType contains \"Flood\"
        | extend durationMinutes = DurationSeconds / 60
        | summarize count() as incidents, sum(DamageProperty) as totalDamage by EventType
        | order by totalDamage desc
        | top 20 by totalDamage desc
        ";

    group.bench_function("kql-lexer short", |b| {
        b.iter(|| {
            let (tokens, _errors) = black_box(kql_lexer::tokenize(short_query));
            tokens
        });
    });

    group.bench_function("kql-lexer long", |b| {
        b.iter(|| {
            let (tokens, _errors) = black_box(kql_lexer::tokenize(long_query));
            tokens
        });
    });
}

criterion_group!(benches, tokenize);
criterion_main!(benches);
