use criterion::{BenchmarkId, Criterion, black_box};
use spark_nio_channel::{FileChannel, OpenMode, transfer_to_with};
use spark_nio_core::{TransferConfig, TransferStrategy};
use std::{env, fs, time::Duration};

/// 对比映射与暂存两条直接传输路径的耗时。
///
/// # 设计背景（Why）
/// - `Auto` 策略以 `mmap_threshold` 为分界选择路径，阈值需要依据两条路径在不同长度上的实测成本调整。
///
/// # 逻辑解析（How）
/// - 每个长度准备一个源文件，基准循环内打开目标、执行一次传输、关闭两端；
/// - 目标文件以 `TRUNCATE` 打开，保证每次迭代从空文件开始。
fn bench_transfer(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("临时目录");
    let mut group = c.benchmark_group("transfer_to");
    for len in [4 * 1024usize, 256 * 1024, 4 * 1024 * 1024] {
        let source = dir.path().join(format!("source-{len}.bin"));
        fs::write(&source, vec![0xA5u8; len]).expect("写入源文件");
        let target = dir.path().join("target.bin");

        for strategy in [TransferStrategy::Mapped, TransferStrategy::Staged] {
            let config = TransferConfig::default().with_strategy(strategy);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), len),
                &len,
                |b, &len| {
                    b.iter(|| {
                        let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
                        let mut dst = FileChannel::open(
                            &target,
                            OpenMode::WRITE | OpenMode::CREATE | OpenMode::TRUNCATE,
                        )
                        .expect("打开目标");
                        let moved = transfer_to_with(&src, &mut dst, 0, len as u64, &config)
                            .expect("传输");
                        src.close().expect("关闭源");
                        dst.close().expect("关闭目标");
                        black_box(moved)
                    });
                },
            );
        }
    }
    group.finish();
}

fn main() {
    let quick_mode = env::args().skip(1).any(|arg| arg == "--quick");

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_transfer(&mut criterion);
    criterion.final_summary();
}
