use criterion::*;

use hmem_core::error::Result;
use hmem_core::types::HmemIov;

use rand::{thread_rng, Rng, SeedableRng};
use rand_xorshift::XorShiftRng as CurRng;

use crate::CopyTarget;

/// Picks `chunk_count` random segments of `chunk_size` bytes inside `region`.
fn random_iov(
    rng: &mut CurRng,
    region: HmemIov,
    chunk_size: usize,
    chunk_count: usize,
) -> Vec<HmemIov> {
    let slots = (region.len / chunk_size.max(1)).max(1);
    (0..chunk_count)
        .map(|_| HmemIov::new(region.base + rng.gen_range(0, slots) * chunk_size, chunk_size))
        .collect()
}

fn copy_test(
    bench: &mut Bencher,
    target: &CopyTarget,
    chunk_size: usize,
    chunk_count: usize,
    to_hmem: bool,
) {
    let mut rng = CurRng::seed_from_u64(thread_rng().gen());

    let iov = random_iov(&mut rng, target.region, chunk_size, chunk_count);
    let mut buf = vec![0u8; chunk_size * chunk_count];

    if to_hmem {
        bench.iter(|| {
            let _ = black_box(unsafe { target.ctx.copy_to_hmem_iov(&iov, target.iface, 0, &buf) });
        });
    } else {
        bench.iter(|| {
            let _ = black_box(unsafe {
                target.ctx.copy_from_hmem_iov(&mut buf, &iov, target.iface, 0)
            });
        });
    }
}

fn seq_copy_params(
    group: &mut BenchmarkGroup<'_, measurement::WallTime>,
    func_name: String,
    to_hmem: bool,
    initialize_target: &dyn Fn() -> Result<CopyTarget>,
) {
    for &size in [0x8, 0x10, 0x100, 0x1000, 0x10000].iter() {
        group.throughput(Throughput::Bytes(size));
        group.bench_with_input(
            BenchmarkId::new(func_name.clone(), size),
            &size,
            |b, &size| match initialize_target() {
                Ok(target) => copy_test(
                    b,
                    &target,
                    black_box(size as usize),
                    black_box(1),
                    to_hmem,
                ),
                Err(err) => log::error!("unable to initialize {}: {}", func_name, err),
            },
        );
    }
}

fn chunk_copy_params(
    group: &mut BenchmarkGroup<'_, measurement::WallTime>,
    func_name: String,
    to_hmem: bool,
    initialize_target: &dyn Fn() -> Result<CopyTarget>,
) {
    for &size in [0x8, 0x10, 0x100, 0x1000].iter() {
        for &chunk_count in [1, 4, 16, 64].iter() {
            group.throughput(Throughput::Bytes(size * chunk_count));
            group.bench_with_input(
                BenchmarkId::new(format!("{}_s{:x}", func_name, size), size * chunk_count),
                &size,
                |b, &size| match initialize_target() {
                    Ok(target) => copy_test(
                        b,
                        &target,
                        black_box(size as usize),
                        black_box(chunk_count as usize),
                        to_hmem,
                    ),
                    Err(err) => log::error!("unable to initialize {}: {}", func_name, err),
                },
            );
        }
    }
}

/// Copies a single segment of increasing size.
pub fn seq_copy(
    c: &mut Criterion,
    backend_name: &str,
    initialize_target: &dyn Fn() -> Result<CopyTarget>,
) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);

    let group_name = format!("{}_iov_seq_copy", backend_name);

    let mut group = c.benchmark_group(group_name.clone());
    group.plot_config(plot_config);

    seq_copy_params(&mut group, format!("{}_to", group_name), true, initialize_target);
    seq_copy_params(&mut group, format!("{}_from", group_name), false, initialize_target);
}

/// Copies an increasing number of scattered segments.
pub fn chunk_copy(
    c: &mut Criterion,
    backend_name: &str,
    initialize_target: &dyn Fn() -> Result<CopyTarget>,
) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);

    let group_name = format!("{}_iov_chunk_copy", backend_name);

    let mut group = c.benchmark_group(group_name.clone());
    group.plot_config(plot_config);

    chunk_copy_params(&mut group, format!("{}_to", group_name), true, initialize_target);
    chunk_copy_params(&mut group, format!("{}_from", group_name), false, initialize_target);
}
