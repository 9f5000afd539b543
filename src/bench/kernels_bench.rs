use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use matbench::matrix::fill::random_matrix;
use matbench::{KernelRegistry, Matrix, MatmulShape, MatvecShape, MatvecVariant};

const MATMUL_SIZES: &[usize] = &[64, 128, 256];
const MATVEC_SIZES: &[(usize, usize)] = &[(1024, 1024), (4096, 4096)];

fn bench_matmul_variants(c: &mut Criterion) {
    let registry = KernelRegistry::with_defaults();

    for variant in registry.matmul_variants() {
        let kernel = registry.matmul(variant).unwrap();
        let mut group = c.benchmark_group(format!("matmul/{variant}"));

        for &size in MATMUL_SIZES {
            let shape = MatmulShape::square(size);
            group.throughput(Throughput::Elements(shape.flops()));

            let a = random_matrix(size, size, 0xC0FF_EE42).unwrap();
            let b = random_matrix(size, size, 0xBADC_0FFE).unwrap();
            let mut out = Matrix::new(size, size).unwrap();

            group.bench_function(BenchmarkId::new("random", size), |bench| {
                bench.iter(|| {
                    kernel
                        .apply(black_box(&a), black_box(&b), black_box(&mut out))
                        .unwrap();
                });
            });
        }
        group.finish();
    }
}

fn bench_matvec_variants(c: &mut Criterion) {
    let registry = KernelRegistry::with_defaults();
    let variants = [
        MatvecVariant::Naive,
        MatvecVariant::Blocked(8),
        MatvecVariant::Simd(1),
        MatvecVariant::Simd(4),
        MatvecVariant::Peak(2),
    ];

    for variant in variants {
        let kernel = registry.matvec(variant).unwrap();
        let mut group = c.benchmark_group(format!("matvec/{variant}"));

        for &(n, k) in MATVEC_SIZES {
            group.throughput(Throughput::Elements(MatvecShape::new(n, k).flops()));

            let a = random_matrix(k, n, 0x5EED_0001).unwrap();
            let b = random_matrix(1, k, 0x5EED_0002).unwrap();
            let mut out = Matrix::column(n).unwrap();

            group.bench_function(BenchmarkId::new("random", format!("{n}x{k}")), |bench| {
                bench.iter(|| {
                    kernel
                        .apply(black_box(&a), black_box(&b), black_box(&mut out))
                        .unwrap();
                });
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_matmul_variants, bench_matvec_variants);
criterion_main!(benches);
