use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use parareal::{BackwardEuler, CsrMatrix, Parareal, PararealOptions, Solution, TimeMesh};

fn heat_problem(ndof: usize) -> Solution {
    let diag: Vec<f64> = (0..ndof).map(|i| 10.0 + (i as f64).sin().abs()).collect();
    Solution::new(
        vec![1.0; ndof],
        CsrMatrix::from_bands(ndof, &[(-1, 1.0), (0, -2.0), (1, 1.0)]),
        CsrMatrix::from_diagonal(&diag),
    )
    .unwrap()
}

fn bench_serial_vs_parareal(c: &mut Criterion) {
    let ndof = 64;
    let u0 = heat_problem(ndof);
    let opts = PararealOptions::new(0.0, 1.0, 16).with_steps(64, 2).with_tolerance(1e-8).with_maxiter(6);

    c.bench_function("serial fine", |ben| {
        let mesh = TimeMesh::build(&opts, Arc::new(BackwardEuler), Arc::new(BackwardEuler), &u0).unwrap();
        ben.iter(|| {
            let _ends = mesh.serial_fine(black_box(&u0)).unwrap();
        })
    });

    c.bench_function("parareal serial executor", |ben| {
        let opts = opts.clone().with_threads(1);
        let mut para = Parareal::new(opts, Arc::new(BackwardEuler), Arc::new(BackwardEuler), u0.clone()).unwrap();
        ben.iter(|| {
            let _stats = para.run().unwrap();
        })
    });

    c.bench_function("parareal rayon executor", |ben| {
        let mut para =
            Parareal::new(opts.clone(), Arc::new(BackwardEuler), Arc::new(BackwardEuler), u0.clone()).unwrap();
        ben.iter(|| {
            let _stats = para.run().unwrap();
        })
    });
}

fn bench_parareal_matrix(c: &mut Criterion) {
    let u0 = heat_problem(8);
    let opts = PararealOptions::new(0.0, 1.0, 16).with_steps(32, 1);
    let para = Parareal::new(opts, Arc::new(BackwardEuler), Arc::new(BackwardEuler), u0).unwrap();

    c.bench_function("parareal matrix assembly", |ben| {
        ben.iter(|| {
            let _pm = para.get_parareal_matrix().unwrap();
        })
    });
}

criterion_group!(benches, bench_serial_vs_parareal, bench_parareal_matrix);
criterion_main!(benches);
