use criterion::*;

use hmem_core::error::Result;

use rand::{thread_rng, Rng, SeedableRng};
use rand_xorshift::XorShiftRng as CurRng;

use crate::CopyTarget;

fn classify_test(bench: &mut Bencher, target: &CopyTarget, addr_count: usize) {
    let mut rng = CurRng::seed_from_u64(thread_rng().gen());

    let addrs = (0..addr_count)
        .map(|_| target.region.base + rng.gen_range(0, target.region.len.max(1)))
        .collect::<Vec<_>>();

    bench.iter(|| {
        for addr in addrs.iter() {
            black_box(target.ctx.classify(*addr));
        }
    });
}

/// Classifies batches of addresses inside the region of the target.
pub fn classify(
    c: &mut Criterion,
    backend_name: &str,
    initialize_target: &dyn Fn() -> Result<CopyTarget>,
) {
    let group_name = format!("{}_classify", backend_name);

    let mut group = c.benchmark_group(group_name.clone());

    for &count in [1, 16, 256].iter() {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(
            BenchmarkId::new(group_name.clone(), count),
            &count,
            |b, &count| match initialize_target() {
                Ok(target) => classify_test(b, &target, black_box(count as usize)),
                Err(err) => log::error!("unable to initialize {}: {}", group_name, err),
            },
        );
    }
}
