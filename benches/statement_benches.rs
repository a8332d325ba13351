use criterion::Criterion;
use sqlt::{Connection, Row};

criterion::criterion_group!(benches, prepare_statement, read_statement, read_rows, write_statement);
criterion::criterion_main!(benches);

#[derive(Row)]
struct Data {
    a: i64,
    b: f64,
}

fn prepare_statement(bencher: &mut Criterion) {
    let c = create();

    bencher.bench_function("prepare_statement", |b| {
        b.iter(|| {
            let stmt = c
                .prepare("SELECT a, b FROM data WHERE a > ? AND b > ?")
                .unwrap();
            assert_eq!(stmt.parameter_count(), 2);
        });
    });
}

fn read_statement(bencher: &mut Criterion) {
    let c = create();
    populate(&c, 100);

    let mut stmt = c
        .prepare("SELECT a, b FROM data WHERE a > ? AND b > ?")
        .unwrap();

    bencher.bench_function("read_statement", |b| {
        b.iter(|| {
            stmt.reset().unwrap();
            stmt.bind((42, 42.0)).unwrap();

            while let Some(data) = stmt.next::<Data>().unwrap() {
                assert!(data.a > 42);
                assert!(data.b > 42.0);
            }
        });
    });
}

fn read_rows(bencher: &mut Criterion) {
    let c = create();
    populate(&c, 100);

    let mut stmt = c.prepare("SELECT a, b FROM data WHERE a > ?").unwrap();

    bencher.bench_function("read_rows", |b| {
        b.iter(|| {
            stmt.reset().unwrap();
            stmt.bind((42,)).unwrap();

            let total = stmt
                .query::<(i64, f64)>()
                .map(|row| row.map(|(a, _)| a))
                .sum::<sqlt::Result<i64>>()
                .unwrap();

            assert!(total > 0);
        });
    });
}

fn write_statement(bencher: &mut Criterion) {
    let c = create();

    let mut stmt = c
        .prepare("INSERT INTO data (a, b, c, d) VALUES (?, ?, ?, ?)")
        .unwrap();

    bencher.bench_function("write_statement", |b| {
        b.iter(|| {
            stmt.reset().unwrap();
            stmt.bind((42, 42.0, 42.0, 42.0)).unwrap();
            assert!(stmt.execute().unwrap().is_done());
        });
    });
}

fn create() -> Connection {
    let c = Connection::open_in_memory().unwrap();
    c.execute("CREATE TABLE data (a INTEGER, b REAL, c REAL, d REAL)")
        .unwrap();
    c
}

fn populate(c: &Connection, count: i64) {
    let mut stmt = c
        .prepare("INSERT INTO data (a, b, c, d) VALUES (?, ?, ?, ?)")
        .unwrap();

    for i in 0..count {
        stmt.reset().unwrap();
        stmt.bind((i, i as f64, i as f64, i as f64)).unwrap();
        assert!(stmt.execute().unwrap().is_done());
    }
}
