use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgmap::{Binder, QueryBuilder, Record};

#[derive(Debug, Default, Record)]
#[allow(dead_code)]
struct Account {
    #[db(column = "id", pk)]
    id: i64,
    #[db(column = "email")]
    email: String,
    #[db(column = "name", prefix = "a")]
    name: String,
    #[db(column = "balance")]
    balance: i64,
    #[db(column = "orders", computed = "SELECT COUNT(*) FROM orders o WHERE o.account_id = a.id")]
    orders: i64,
}

/// SELECT col0,col1,... FROM t WHERE col0 = $1 AND col1 = $2 ...
fn build_select(n: usize) -> QueryBuilder {
    let mut qb = QueryBuilder::new();
    qb.from("t");
    for i in 0..n {
        qb.select(format!("col{i}"));
        qb.and_where_bind(&format!("col{i} = $?"), i as i64);
    }
    qb
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/build");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let mut qb = build_select(n);
            b.iter(|| {
                let _ = black_box(qb.build());
            });
        });
    }

    group.finish();
}

fn bench_configure_and_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/configure_and_build");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut qb = build_select(n);
                let _ = black_box(qb.build());
            });
        });
    }

    group.finish();
}

fn bench_record_select(c: &mut Criterion) {
    let account = Account::default();
    c.bench_function("query_builder/record_select", |b| {
        b.iter(|| {
            let mut qb = QueryBuilder::new();
            qb.select(&account)
                .left_join("orders o ON o.account_id = a.id")
                .and_where_bind("a.balance > $?", 0_i64)
                .order_by("a.id")
                .limit("20");
            let _ = black_box(qb.build());
        });
    });
}

fn bench_binder(c: &mut Criterion) {
    let account = Account::default();
    let binder = Binder::default();
    c.bench_function("binder/update_statement", |b| {
        b.iter(|| black_box(binder.update_statement("accounts", &account).map(|s| s.sql().len())));
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_configure_and_build,
    bench_record_select,
    bench_binder
);
criterion_main!(benches);
