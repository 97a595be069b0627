use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sigmatics_compiler::{
    compile_model, execute_class_plan, execute_sga_plan, lower_to_class_backend, lower_to_sga_backend, normalize,
    IrNode, ModelCache, ModelDescriptor, OverflowMode, RuntimeParams,
};

fn ring_chain(length: usize) -> IrNode {
    (0..length).fold(IrNode::class_literal(1).unwrap(), |acc, i| {
        let step = IrNode::rotate(IrNode::mul96(OverflowMode::Track), i as i64);
        IrNode::seq(acc, step)
    })
}

fn benchmark_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute_plan");
    let params = RuntimeParams::new().with("a", 7).with("b", 5);

    for length in [1, 8, 64].iter() {
        let node = normalize(&ring_chain(*length));
        let class_plan = lower_to_class_backend(&node).unwrap();
        let sga_plan = lower_to_sga_backend(&node);

        group.bench_with_input(BenchmarkId::new("class", length), &class_plan, |b, plan| {
            b.iter(|| black_box(execute_class_plan(black_box(plan), &params).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("sga", length), &sga_plan, |b, plan| {
            b.iter(|| black_box(execute_sga_plan(black_box(plan), &params).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_models(c: &mut Criterion) {
    let descriptor = ModelDescriptor::new("add96", "1.0.0", "sigmatics.bench")
        .with_param("overflow", "track")
        .with_runtime_param("a")
        .with_runtime_param("b");
    let params = RuntimeParams::new().with("a", 80).with("b", 30);

    c.bench_function("compile_model_add96", |b| {
        b.iter(|| black_box(compile_model(black_box(&descriptor)).unwrap()));
    });

    let cache = ModelCache::new();
    c.bench_function("cached_run_add96", |b| {
        b.iter(|| {
            let model = cache.get_or_compile(&descriptor, None).unwrap();
            black_box(model.run(&params).unwrap())
        });
    });
}

criterion_group!(benches, benchmark_backends, benchmark_models);
criterion_main!(benches);
