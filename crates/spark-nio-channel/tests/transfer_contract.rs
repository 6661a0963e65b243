//! `transfer_contract` 集成测试：直接传输在各策略下逐字节复现源文件。
//!
//! # 测试总览（Why）
//! - 空文件、1 字节文件与大于暂存缓冲的文件，分别经映射、暂存与自动策略传输，结果必须一致；
//! - 传输不移动源游标，只推进目标游标；
//! - 越界区间、已关闭通道的错误种类稳定；
//! - `transfer_from` 与 `copy_with_buffer` 覆盖另外两种拷贝方式。

use spark_nio_buffer::ByteBuffer;
use spark_nio_channel::{
    FileChannel, OpenMode, copy_with_buffer, transfer_from, transfer_to, transfer_to_with,
};
use spark_nio_core::{ErrorKind, TransferConfig, TransferStrategy};
use std::fs;
use std::path::{Path, PathBuf};

const STAGING: usize = 64;

fn write_source(dir: &Path, len: usize) -> (PathBuf, Vec<u8>) {
    let path = dir.join(format!("source-{len}.bin"));
    let content: Vec<u8> = (0..len).map(|i| (i * 31 % 256) as u8).collect();
    fs::write(&path, &content).expect("写入源文件");
    (path, content)
}

fn configs() -> [TransferConfig; 3] {
    let base = TransferConfig::default().with_staging_capacity(STAGING);
    [
        base.clone().with_strategy(TransferStrategy::Mapped),
        base.clone().with_strategy(TransferStrategy::Staged),
        base.with_strategy(TransferStrategy::Auto),
    ]
}

#[test]
fn direct_transfer_reproduces_source_bytes_for_every_strategy() {
    let dir = tempfile::tempdir().expect("临时目录");
    for len in [0, 1, STAGING * 5 + 3] {
        let (source, content) = write_source(dir.path(), len);
        for (index, config) in configs().iter().enumerate() {
            let target = dir.path().join(format!("target-{len}-{index}.bin"));
            let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
            let mut dst = FileChannel::open(&target, OpenMode::WRITE | OpenMode::CREATE)
                .expect("创建目标");

            let size = src.size().expect("源大小");
            let moved = transfer_to_with(&src, &mut dst, 0, size, config).expect("传输");
            assert_eq!(moved, len as u64, "{:?}", config.strategy);
            assert_eq!(dst.position().expect("目标游标"), len as u64);
            src.close().expect("关闭源");
            dst.close().expect("关闭目标");

            assert_eq!(
                fs::read(&target).expect("读回目标"),
                content,
                "策略 {:?} 的结果与源文件不一致",
                config.strategy
            );
        }
    }
}

#[test]
fn transfer_of_a_sub_range_leaves_source_cursor_unchanged() {
    let dir = tempfile::tempdir().expect("临时目录");
    let (source, content) = write_source(dir.path(), 1000);
    let target = dir.path().join("range.bin");

    let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
    src.set_position(17).expect("移动源游标");
    let mut dst =
        FileChannel::open(&target, OpenMode::WRITE | OpenMode::CREATE).expect("创建目标");
    let mut prefix = ByteBuffer::wrap(b">>".to_vec()).expect("包装");
    dst.write(&mut prefix).expect("写入前缀");

    for config in configs() {
        dst.set_position(2).expect("回到前缀之后");
        let moved = transfer_to_with(&src, &mut dst, 100, 300, &config).expect("区间传输");
        assert_eq!(moved, 300);
        assert_eq!(src.position().expect("源游标"), 17, "{:?}", config.strategy);
    }
    src.close().expect("关闭源");
    dst.close().expect("关闭目标");

    let mut expected = b">>".to_vec();
    expected.extend_from_slice(&content[100..400]);
    assert_eq!(fs::read(&target).expect("读回"), expected);
}

/// sysfs 属性文件报告页大小的长度，但不支持 `mmap`。
const UNMAPPABLE_SOURCE: &str = "/sys/kernel/mm/transparent_hugepage/enabled";

#[test]
fn auto_strategy_falls_back_to_staging_when_the_source_cannot_be_mapped() {
    let source = Path::new(UNMAPPABLE_SOURCE);
    let Ok(expected) = fs::read(source) else {
        return;
    };
    let dir = tempfile::tempdir().expect("临时目录");
    let mut src = FileChannel::open(source, OpenMode::READ).expect("打开源");
    let size = src.size().expect("源大小");
    let forced = TransferConfig::default().with_strategy(TransferStrategy::Mapped);
    let mut forced_dst = FileChannel::open(
        dir.path().join("forced.bin"),
        OpenMode::WRITE | OpenMode::CREATE,
    )
    .expect("创建目标");
    // 该平台能映射此文件时，回退路径无从触发。
    let Err(err) = transfer_to_with(&src, &mut forced_dst, 0, size, &forced) else {
        return;
    };
    assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    assert_eq!(forced_dst.position().expect("目标游标"), 0);

    let auto = TransferConfig {
        mmap_threshold: 1,
        ..TransferConfig::default()
    };
    let target = dir.path().join("auto.bin");
    let mut dst =
        FileChannel::open(&target, OpenMode::WRITE | OpenMode::CREATE).expect("创建目标");
    let moved = transfer_to_with(&src, &mut dst, 0, size, &auto).expect("自动策略回退为暂存");
    assert_eq!(moved, expected.len() as u64);
    assert_eq!(src.position().expect("源游标"), 0);
    dst.close().expect("关闭目标");
    forced_dst.close().expect("关闭目标");
    src.close().expect("关闭源");
    assert_eq!(fs::read(&target).expect("读回"), expected);
}

#[test]
fn out_of_range_transfer_is_invalid_argument() {
    let dir = tempfile::tempdir().expect("临时目录");
    let (source, _) = write_source(dir.path(), 10);
    let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
    let mut dst = FileChannel::open(dir.path().join("t.bin"), OpenMode::WRITE | OpenMode::CREATE)
        .expect("创建目标");

    let err = transfer_to(&src, &mut dst, 5, 6).expect_err("越过源末尾");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = transfer_to(&src, &mut dst, u64::MAX, 1).expect_err("溢出");
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(transfer_to(&src, &mut dst, 10, 0).expect("零长度"), 0);
    src.close().expect("关闭源");
    dst.close().expect("关闭目标");
}

#[test]
fn transfer_with_a_closed_channel_fails() {
    let dir = tempfile::tempdir().expect("临时目录");
    let (source, _) = write_source(dir.path(), 10);
    let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
    let mut dst = FileChannel::open(dir.path().join("t.bin"), OpenMode::WRITE | OpenMode::CREATE)
        .expect("创建目标");

    dst.close().expect("关闭目标");
    let err = transfer_to(&src, &mut dst, 0, 10).expect_err("目标已关闭");
    assert_eq!(err.kind(), ErrorKind::ClosedChannel);

    src.close().expect("关闭源");
    let err = transfer_to(&src, &mut dst, 0, 10).expect_err("源已关闭");
    assert_eq!(err.kind(), ErrorKind::ClosedChannel);
}

#[test]
fn transfer_from_writes_at_absolute_position_and_advances_source() {
    let dir = tempfile::tempdir().expect("临时目录");
    let (source, content) = write_source(dir.path(), 200);
    let target = dir.path().join("from.bin");
    fs::write(&target, vec![b'.'; 10]).expect("目标初始内容");

    let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
    src.set_position(50).expect("移动源游标");
    let mut dst = FileChannel::open(&target, OpenMode::READ_WRITE)
        .expect("打开目标")
        .with_config(TransferConfig::default().with_staging_capacity(16))
        .expect("配置合法");

    let moved = transfer_from(&mut dst, &mut src, 4, 100).expect("transfer_from");
    assert_eq!(moved, 100);
    assert_eq!(src.position().expect("源游标"), 150);
    assert_eq!(dst.position().expect("目标游标不动"), 0);

    let short = transfer_from(&mut dst, &mut src, 104, 500).expect("源提前结束");
    assert_eq!(short, 50);
    src.close().expect("关闭源");
    dst.close().expect("关闭目标");

    let written = fs::read(&target).expect("读回");
    assert_eq!(&written[..4], b"....");
    assert_eq!(&written[4..154], &content[50..200]);
}

#[test]
fn copy_with_buffer_runs_read_flip_write_clear_until_eof() {
    let dir = tempfile::tempdir().expect("临时目录");
    let (source, content) = write_source(dir.path(), 4097);
    let target = dir.path().join("copy.bin");

    let mut src = FileChannel::open(&source, OpenMode::READ).expect("打开源");
    let mut dst =
        FileChannel::open(&target, OpenMode::WRITE | OpenMode::CREATE).expect("创建目标");
    let mut buf = ByteBuffer::allocate_direct(1024).expect("直接缓冲");

    assert_eq!(copy_with_buffer(&mut src, &mut dst, &mut buf).expect("拷贝"), 4097);
    src.close().expect("关闭源");
    dst.close().expect("关闭目标");
    assert_eq!(fs::read(&target).expect("读回"), content);
}
