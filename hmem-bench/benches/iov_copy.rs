extern crate hmem_bench;
use hmem_bench::*;

use criterion::*;

use hmem_core::hmem::HmemIface;
use hmem_core::types::size;

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn init_logger() {
    TermLogger::init(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .ok();
}

fn system_copy_group(c: &mut Criterion) {
    init_logger();
    iov::seq_copy(c, "system", &|| CopyTarget::system(size::mb(16)));
    iov::chunk_copy(c, "system", &|| CopyTarget::system(size::mb(16)));
    classify::classify(c, "system", &|| CopyTarget::system(size::mb(1)));
}

fn dummy_copy_group(c: &mut Criterion) {
    init_logger();
    iov::seq_copy(c, "dummy", &|| CopyTarget::dummy(HmemIface::Cuda, size::mb(16)));
    iov::chunk_copy(c, "dummy", &|| CopyTarget::dummy(HmemIface::Cuda, size::mb(16)));
    iov::chunk_copy(c, "dummy_metrics", &|| {
        CopyTarget::dummy_metrics(HmemIface::Cuda, size::mb(16))
    });
    classify::classify(c, "dummy", &|| CopyTarget::all_devices(size::mb(1)));
}

criterion_group! {
    name = iov_copy;
    config = Criterion::default()
        .warm_up_time(std::time::Duration::from_millis(300))
        .measurement_time(std::time::Duration::from_millis(2700));
    targets = system_copy_group, dummy_copy_group
}

criterion_main!(iov_copy);
