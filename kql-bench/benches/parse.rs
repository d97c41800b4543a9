use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let short_query = "logs | where severity == \"high\"";
    group.bench_function("kql-parser short", |b| {
        b.iter(|| {
            let (program, _errors) = black_box(kql_parser::parse(short_query));
            program
        });
    });

    let long_query = "
        StormEvents
        | where StartTime > ago(7d)
        | where State == \"TEXAS\" and EventType contains \"Flood\"
        | extend durationMinutes = DurationSeconds / 60
        | summarize count() as incidents, sum(DamageProperty) as totalDamage by EventType
        | order by totalDamage desc
        | top 20 by totalDamage desc
        ";
    group.bench_function("kql-parser long", |b| {
        b.iter(|| {
            let (program, _errors) = black_box(kql_parser::parse(long_query));
            program
        });
    });
}

criterion_group!(benches, parse);
criterion_main!(benches);
