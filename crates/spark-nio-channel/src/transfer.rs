//! 通道之间的直接传输与缓冲拷贝循环。
//!
//! # 模块定位（Why）
//! - 文件到文件的拷贝有两条路径：映射源区间后一次写出（零拷贝读取），或经固定大小暂存缓冲循环搬运；
//!   两条路径的可观察结果逐字节一致，选择只影响性能。
//! - `copy_with_buffer` 保留调用方自带缓冲的经典“读 → flip → 写 → clear”循环，作为对照与通用回退。
//!
//! # 策略选择（How）
//! - [`TransferStrategy::Auto`]：长度不小于 `mmap_threshold` 时映射，否则暂存；
//!   源文件无法映射（`channel.resource_unavailable`）时改走暂存路径；
//! - [`TransferStrategy::Mapped`]/[`TransferStrategy::Staged`]：强制对应路径。

use crate::error::invalid_argument;
use crate::{FileChannel, MapMode};
use spark_nio_buffer::ByteBuffer;
use spark_nio_core::{ErrorKind, Result, TransferConfig, TransferStrategy};
use tracing::debug;

/// 把 `src` 中 `[offset, offset + length)` 写到 `dst` 的当前游标处，返回搬运字节数。
///
/// 使用 `src` 自身的传输配置；需要临时覆盖时使用 [`transfer_to_with`]。
pub fn transfer_to(
    src: &FileChannel,
    dst: &mut FileChannel,
    offset: u64,
    length: u64,
) -> Result<u64> {
    let config = src.transfer_config().clone();
    transfer_to_with(src, dst, offset, length, &config)
}

/// 按给定配置执行直接传输。
///
/// # 契约说明（What）
/// - **前置条件**：两个通道均未关闭（否则 `channel.closed`），`src` 可读、`dst` 可写；
///   `offset + length` 不溢出且不超过 `src.size()`，否则返回 `buffer.invalid_argument`；
/// - **后置条件**：`src` 的游标不变，`dst` 的游标前进返回值个字节；
/// - `length == 0` 时不做任何 I/O，返回 0。
pub fn transfer_to_with(
    src: &FileChannel,
    dst: &mut FileChannel,
    offset: u64,
    length: u64,
    config: &TransferConfig,
) -> Result<u64> {
    config.validate()?;
    src.readable("transfer_to")?;
    dst.writable("transfer_to")?;
    let size = src.size()?;
    offset
        .checked_add(length)
        .filter(|end| *end <= size)
        .ok_or_else(|| {
            invalid_argument(format!(
                "transfer_to: range {offset}+{length} exceeds source size {size}"
            ))
        })?;
    if length == 0 {
        return Ok(0);
    }

    let mut strategy = if config.prefers_mapping(length) {
        TransferStrategy::Mapped
    } else {
        TransferStrategy::Staged
    };
    let moved = match strategy {
        TransferStrategy::Mapped => match src.map(offset, length, MapMode::ReadOnly) {
            Ok(mut region) => dst.write(&mut region)? as u64,
            // 仅 `Auto` 回退；强制 `Mapped` 原样返回映射错误。
            Err(err)
                if config.strategy == TransferStrategy::Auto
                    && err.kind() == ErrorKind::ResourceUnavailable =>
            {
                debug!(
                    src = %src.path().display(),
                    error = %err,
                    "source cannot be mapped, falling back to staged copy"
                );
                strategy = TransferStrategy::Staged;
                staged_copy(src, dst, offset, length, config.staging_capacity)?
            }
            Err(err) => return Err(err),
        },
        TransferStrategy::Auto | TransferStrategy::Staged => {
            staged_copy(src, dst, offset, length, config.staging_capacity)?
        }
    };
    debug!(
        src = %src.path().display(),
        dst = %dst.path().display(),
        ?strategy,
        offset,
        bytes = moved,
        "direct transfer finished"
    );
    Ok(moved)
}

/// 从 `src` 的当前游标读取至多 `count` 字节，写入 `dst` 的绝对位置 `position`。
///
/// `src` 游标随读取前进，`dst` 游标不变；`src` 提前到达末尾时返回实际搬运的字节数。
pub fn transfer_from(
    dst: &mut FileChannel,
    src: &mut FileChannel,
    position: u64,
    count: u64,
) -> Result<u64> {
    src.readable("transfer_from")?;
    dst.writable("transfer_from")?;
    position.checked_add(count).ok_or_else(|| {
        invalid_argument(format!(
            "transfer_from: position {position} + count {count} overflows"
        ))
    })?;
    if count == 0 {
        return Ok(0);
    }

    let capacity = staging_len(dst.transfer_config().staging_capacity, count);
    let mut staging = ByteBuffer::allocate(capacity)?;
    let mut moved = 0u64;
    while moved < count {
        staging.clear();
        staging.set_limit(staging_len(capacity, count - moved))?;
        if src.read(&mut staging)?.is_end_of_stream() {
            break;
        }
        staging.flip();
        moved += dst.write_at(&mut staging, position + moved)? as u64;
    }
    debug!(
        src = %src.path().display(),
        dst = %dst.path().display(),
        position,
        bytes = moved,
        "transfer_from finished"
    );
    Ok(moved)
}

/// 以调用方提供的缓冲循环拷贝，直到 `src` 到达末尾，返回合计字节数。
///
/// 开始前缓冲被 `clear`，其中未读的内容会被丢弃。
pub fn copy_with_buffer(
    src: &mut FileChannel,
    dst: &mut FileChannel,
    buf: &mut ByteBuffer,
) -> Result<u64> {
    buf.clear();
    let mut total = 0u64;
    loop {
        if src.read(buf)?.is_end_of_stream() {
            break;
        }
        buf.flip();
        total += dst.write(buf)? as u64;
        buf.clear();
    }
    debug!(
        src = %src.path().display(),
        dst = %dst.path().display(),
        bytes = total,
        "buffered copy finished"
    );
    Ok(total)
}

fn staged_copy(
    src: &FileChannel,
    dst: &mut FileChannel,
    offset: u64,
    length: u64,
    staging_capacity: usize,
) -> Result<u64> {
    let capacity = staging_len(staging_capacity, length);
    let mut staging = ByteBuffer::allocate(capacity)?;
    let mut moved = 0u64;
    while moved < length {
        staging.clear();
        staging.set_limit(staging_len(capacity, length - moved))?;
        // 定位读不触碰源游标。
        if src.read_at(&mut staging, offset + moved)?.is_end_of_stream() {
            break;
        }
        staging.flip();
        moved += dst.write(&mut staging)? as u64;
    }
    Ok(moved)
}

fn staging_len(capacity: usize, wanted: u64) -> usize {
    usize::try_from(wanted).map_or(capacity, |wanted| wanted.min(capacity))
}
