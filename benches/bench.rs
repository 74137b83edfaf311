use criterion::{black_box, criterion_group, criterion_main, Criterion};
use satyr::sat::config::SolverConfig;
use satyr::sat::solver::Solver;

/// Clauses of the pigeonhole principle PHP(pigeons, holes).
fn pigeonhole(pigeons: i32, holes: i32) -> Vec<Vec<i32>> {
    let var = |p: i32, h: i32| (p - 1) * holes + h;
    let mut clauses = Vec::new();

    for p in 1..=pigeons {
        clauses.push((1..=holes).map(|h| var(p, h)).collect());
    }
    for h in 1..=holes {
        for p in 1..=pigeons {
            for q in (p + 1)..=pigeons {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    clauses
}

/// A long chain of equivalences with a single unit fact, exercising
/// propagation rather than search.
fn equivalence_chain(length: i32) -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();
    for v in 1..length {
        clauses.push(vec![-v, v + 1]);
        clauses.push(vec![v, -(v + 1)]);
    }
    clauses.push(vec![1]);
    clauses
}

fn solve(clauses: &[Vec<i32>]) -> bool {
    let mut solver = Solver::new(SolverConfig::default());
    for clause in clauses {
        solver.add_clause(clause);
    }
    solver.solve(&[])
}

fn bench_pigeonhole(c: &mut Criterion) {
    let unsat = pigeonhole(5, 4);
    let sat = pigeonhole(4, 4);

    c.bench_function("pigeonhole php(5,4) unsat", |b| {
        b.iter(|| black_box(solve(&unsat)))
    });
    c.bench_function("pigeonhole php(4,4) sat", |b| {
        b.iter(|| black_box(solve(&sat)))
    });
}

fn bench_propagation(c: &mut Criterion) {
    let chain = equivalence_chain(500);

    c.bench_function("equivalence chain 500", |b| {
        b.iter(|| black_box(solve(&chain)))
    });
}

criterion_group!(benches, bench_pigeonhole, bench_propagation);
criterion_main!(benches);
