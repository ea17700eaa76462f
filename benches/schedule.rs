use chrono::DateTime;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use schedulable::Schedule;

const EXPRESSIONS: &[&str] = &[
    "wd {Mon-Fri}",
    "hr {22-2} sec {45-15}",
    "wd {Mon-Fri} hr {9am-5pm}, not hr {12pm}",
    "wd {Mon Wed Fri} hr {8am-4pm}, wd {Tue Thu} hr {9am-5pm}, not hr {3pm}",
    "yr {2015-2020} mo {nov-feb} md {15-20} min {0-30}, except wd {sat sun}",
];

const NOW: &[&str] = &["2015-12-15T12:00:00Z", "2015-12-19T23:59:59Z"];

pub fn new_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("new");
    for expression in EXPRESSIONS {
        group.bench_with_input(BenchmarkId::from_parameter(expression), expression, |b, e| {
            b.iter(|| Schedule::new(*e).unwrap())
        });
    }
    group.finish();
}

pub fn includes_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("includes");
    for expression in EXPRESSIONS {
        let schedule = Schedule::new(*expression).unwrap();
        for now_str in NOW {
            let now = DateTime::parse_from_rfc3339(now_str).unwrap();
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{now_str}/{expression}")),
                &(now, &schedule),
                |b, (now, schedule)| b.iter(|| schedule.includes(now)),
            );
        }
    }
    group.finish();
}

pub fn algebra_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("algebra");
    let schedules = EXPRESSIONS
        .iter()
        .map(|expression| Schedule::new(expression).unwrap())
        .collect::<Vec<_>>();

    for (left, right) in schedules.iter().zip(schedules.iter().skip(1)) {
        let id = format!("{left} & {right}");
        group.bench_with_input(BenchmarkId::new("intersection", &id), &(left, right), |b, (l, r)| {
            b.iter(|| *l & *r)
        });
        group.bench_with_input(BenchmarkId::new("union", &id), &(left, right), |b, (l, r)| {
            b.iter(|| *l | *r)
        });
        group.bench_with_input(BenchmarkId::new("overlaps", &id), &(left, right), |b, (l, r)| {
            b.iter(|| l.overlaps(r))
        });
    }
    group.finish();
}

criterion_group!(benches, new_benchmark, includes_benchmark, algebra_benchmark);
criterion_main!(benches);
