use crate::OpenMode;
use crate::error::{
    self, METADATA, OPEN, OperationKind, READ, READ_SCATTER, SEEK, SYNC, TRUNCATE, WRITE,
    WRITE_GATHER, map_io_error,
};
use spark_nio_buffer::ByteBuffer;
use spark_nio_core::{Result, TransferConfig};
use std::fs::File;
use std::io::{self, IoSlice, IoSliceMut, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// 一次读取的结果。
///
/// 目标缓冲有剩余空间但文件已无数据时为 `EndOfStream`；目标缓冲本身没有剩余空间时为
/// `Transferred(0)`，两者不会混淆。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Transferred(usize),
    EndOfStream,
}

impl ReadOutcome {
    /// 本次读取的字节数，`EndOfStream` 视为 0。
    pub fn bytes(self) -> usize {
        match self {
            ReadOutcome::Transferred(bytes) => bytes,
            ReadOutcome::EndOfStream => 0,
        }
    }

    pub fn is_end_of_stream(self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}

/// `FileChannel` 是面向文件的同步字节通道。
///
/// # 设计背景（Why）
/// - 读写游标位于操作系统的文件描述中，而非缓冲内；通道只在单次调用期间借用缓冲，
///   按缓冲的 `position..limit` 窗口搬运字节并推进缓冲游标。
/// - 除顺序读写外，提供分散读、聚集写、定位读写、直接传输与内存映射，
///   使调用方既能驱动“读 → flip → 写 → clear”循环，也能以一次调用完成文件到文件的拷贝。
///
/// # 逻辑解析（How）
/// - 句柄以 `Option<File>` 保存，[`close`](Self::close) 取走句柄后所有操作统一返回 `channel.closed`；
/// - 单次读写内部循环处理短读短写，并重试 `Interrupted`，调用方看到的是“尽可能多”的语义；
/// - 分散/聚集走 `read_vectored`/`write_vectored`，在系统调用返回后按缓冲顺序分配实际字节数。
///
/// # 契约说明（What）
/// - 打开失败返回 `channel.resource_unavailable`，并保留操作系统错误作为 `source`；
/// - 打开模式不允许的操作返回 `channel.resource_unavailable`（不可重试）；
/// - 读写中途失败时，已经搬运的字节仍体现在缓冲游标上，随后返回错误；
/// - 未显式关闭的通道在 `Drop` 中释放句柄，并记录一条 `warn` 日志。
///
/// # 并发说明
/// - 改变游标的方法均需 `&mut self`，同一通道上的并发误用由借用检查拒绝；
/// - Unix 上 [`read_at`](Self::read_at) 走 `pread`，可经 `&self` 在多个线程间并发调用；
///   其他平台以 seek 后恢复游标模拟定位读写，同一通道上的并发 `read_at` 会竞争共享游标，
///   需由调用方串行化。
#[derive(Debug)]
pub struct FileChannel {
    file: Option<File>,
    path: PathBuf,
    mode: OpenMode,
    config: TransferConfig,
}

impl FileChannel {
    /// 以给定模式打开文件，游标位于 0（`APPEND` 时位于末尾）。
    ///
    /// ```rust,no_run
    /// use spark_nio_channel::{FileChannel, OpenMode};
    ///
    /// let mut channel = FileChannel::open("data.bin", OpenMode::READ).expect("文件存在");
    /// channel.close().expect("首次关闭");
    /// ```
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = mode
            .to_options()
            .open(&path)
            .map_err(|err| map_io_error(OPEN, err))?;
        debug!(path = %path.display(), ?mode, "file channel opened");
        Ok(Self {
            file: Some(file),
            path,
            mode,
            config: TransferConfig::default(),
        })
    }

    /// 替换该通道作为传输源/目标时使用的传输配置。
    pub fn with_config(mut self, config: TransferConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn transfer_config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// 释放句柄。只能成功一次，再次调用返回 `channel.closed`。
    pub fn close(&mut self) -> Result<()> {
        let file = self.file.take().ok_or_else(|| error::closed_error("close"))?;
        drop(file);
        debug!(path = %self.path.display(), "file channel closed");
        Ok(())
    }

    /// 从当前游标读入 `dst` 的剩余窗口，直到窗口填满或到达文件末尾。
    pub fn read(&mut self, dst: &mut ByteBuffer) -> Result<ReadOutcome> {
        let mut file = self.readable("read")?;
        let outcome = fill(dst, "read", READ, |window, _| file.read(window))?;
        trace!(path = %self.path.display(), bytes = outcome.bytes(), "read");
        Ok(outcome)
    }

    /// 分散读：按顺序填满每个缓冲后再进入下一个，遇到文件末尾即停止。
    ///
    /// # 契约说明（What）
    /// - 返回全部缓冲合计读入的字节数；
    /// - 所有缓冲都没有剩余空间时返回 `Transferred(0)`；有空间但一个字节也没读到时返回 `EndOfStream`；
    /// - 任一有剩余空间的缓冲为只读存储时返回 `buffer.read_only`，不发生任何读取。
    pub fn read_scatter(&mut self, dsts: &mut [&mut ByteBuffer]) -> Result<ReadOutcome> {
        let mut file = self.readable("read_scatter")?;
        if dsts.iter().any(|dst| dst.is_read_only() && dst.has_remaining()) {
            return Err(error::read_only_buffer("read_scatter"));
        }
        let room: usize = dsts.iter().map(|dst| dst.remaining()).sum();
        if room == 0 {
            return Ok(ReadOutcome::Transferred(0));
        }

        let mut total = 0;
        let mut failure = None;
        {
            let mut windows: Vec<IoSliceMut<'_>> = dsts
                .iter_mut()
                .filter_map(|dst| dst.chunk_mut())
                .filter(|window| !window.is_empty())
                .map(IoSliceMut::new)
                .collect();
            let mut pending: &mut [IoSliceMut<'_>] = &mut windows;
            while !pending.is_empty() {
                match file.read_vectored(pending) {
                    Ok(0) => break,
                    Ok(n) => {
                        total += n;
                        IoSliceMut::advance_slices(&mut pending, n);
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }
        distribute(dsts, total, ByteBuffer::advance_mut)?;
        trace!(
            path = %self.path.display(),
            bytes = total,
            buffers = dsts.len(),
            "scatter read"
        );
        if let Some(err) = failure {
            return Err(map_io_error(READ_SCATTER, err));
        }
        Ok(if total == 0 {
            ReadOutcome::EndOfStream
        } else {
            ReadOutcome::Transferred(total)
        })
    }

    /// 把 `src` 的剩余窗口全部写到当前游标处，返回写入字节数。
    pub fn write(&mut self, src: &mut ByteBuffer) -> Result<usize> {
        let mut file = self.writable("write")?;
        let written = drain(src, WRITE, |data, _| file.write(data))?;
        trace!(path = %self.path.display(), bytes = written, "write");
        Ok(written)
    }

    /// 聚集写：按顺序排空每个缓冲的剩余窗口，空缓冲被跳过，返回合计写入字节数。
    pub fn write_gather(&mut self, srcs: &mut [&mut ByteBuffer]) -> Result<usize> {
        let mut file = self.writable("write_gather")?;
        let mut total = 0;
        let mut failure = None;
        {
            let mut slices: Vec<IoSlice<'_>> = srcs
                .iter()
                .map(|src| src.as_slice())
                .filter(|data| !data.is_empty())
                .map(IoSlice::new)
                .collect();
            let mut pending: &mut [IoSlice<'_>] = &mut slices;
            while !pending.is_empty() {
                match file.write_vectored(pending) {
                    Ok(0) => {
                        failure = Some(io::Error::from(io::ErrorKind::WriteZero));
                        break;
                    }
                    Ok(n) => {
                        total += n;
                        IoSlice::advance_slices(&mut pending, n);
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }
        }
        distribute(srcs, total, ByteBuffer::advance)?;
        trace!(
            path = %self.path.display(),
            bytes = total,
            buffers = srcs.len(),
            "gather write"
        );
        match failure {
            Some(err) => Err(map_io_error(WRITE_GATHER, err)),
            None => Ok(total),
        }
    }

    /// 定位读：从 `offset` 读入 `dst`，不移动通道游标。
    pub fn read_at(&self, dst: &mut ByteBuffer, offset: u64) -> Result<ReadOutcome> {
        let file = self.readable("read_at")?;
        fill(dst, "read_at", READ, |window, filled| {
            read_at_offset(file, window, offset.saturating_add(filled as u64))
        })
    }

    /// 定位写：把 `src` 的剩余窗口写到 `offset`，不移动通道游标。
    pub fn write_at(&mut self, src: &mut ByteBuffer, offset: u64) -> Result<usize> {
        let file = self.writable("write_at")?;
        drain(src, WRITE, |data, written| {
            write_at_offset(file, data, offset.saturating_add(written as u64))
        })
    }

    /// 当前游标位置。
    pub fn position(&self) -> Result<u64> {
        let mut file = self.handle("position")?;
        file.stream_position().map_err(|err| map_io_error(SEEK, err))
    }

    /// 移动游标；越过文件末尾是允许的，随后的写入会在中间留下空洞。
    pub fn set_position(&mut self, position: u64) -> Result<()> {
        let mut file = self.handle("set_position")?;
        file.seek(SeekFrom::Start(position))
            .map_err(|err| map_io_error(SEEK, err))?;
        Ok(())
    }

    /// 文件当前字节数。
    pub fn size(&self) -> Result<u64> {
        let file = self.handle("size")?;
        file.metadata()
            .map(|meta| meta.len())
            .map_err(|err| map_io_error(METADATA, err))
    }

    /// 把文件截短到 `len`；`len` 不小于当前大小时文件不变。
    ///
    /// 游标若位于 `len` 之后则被拉回 `len`。
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        let mut file = self.writable("truncate")?;
        let size = file
            .metadata()
            .map_err(|err| map_io_error(METADATA, err))?
            .len();
        if len < size {
            file.set_len(len)
                .map_err(|err| map_io_error(TRUNCATE, err))?;
        }
        let position = file
            .stream_position()
            .map_err(|err| map_io_error(SEEK, err))?;
        if position > len {
            file.seek(SeekFrom::Start(len))
                .map_err(|err| map_io_error(SEEK, err))?;
        }
        debug!(path = %self.path.display(), len, "file channel truncated");
        Ok(())
    }

    /// 把写入强制落盘；`data_only` 为真时只同步内容，不同步元数据。
    pub fn sync(&self, data_only: bool) -> Result<()> {
        let file = self.handle("sync")?;
        let result = if data_only {
            file.sync_data()
        } else {
            file.sync_all()
        };
        result.map_err(|err| map_io_error(SYNC, err))
    }

    pub(crate) fn handle(&self, op: &'static str) -> Result<&File> {
        self.file.as_ref().ok_or_else(|| error::closed_error(op))
    }

    pub(crate) fn readable(&self, op: &'static str) -> Result<&File> {
        let file = self.handle(op)?;
        if !self.mode.is_readable() {
            return Err(error::access_denied(op, "reading"));
        }
        Ok(file)
    }

    pub(crate) fn writable(&self, op: &'static str) -> Result<&File> {
        let file = self.handle(op)?;
        if !self.mode.is_writable() {
            return Err(error::access_denied(op, "writing"));
        }
        Ok(file)
    }
}

impl Drop for FileChannel {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            warn!(path = %self.path.display(), "file channel dropped without close");
        }
    }
}

/// 循环读入 `dst` 的可写窗口，`read` 的第二个参数为本次调用已读入的字节数。
fn fill(
    dst: &mut ByteBuffer,
    op: &'static str,
    kind: OperationKind,
    mut read: impl FnMut(&mut [u8], usize) -> io::Result<usize>,
) -> Result<ReadOutcome> {
    if !dst.has_remaining() {
        return Ok(ReadOutcome::Transferred(0));
    }
    let Some(window) = dst.chunk_mut() else {
        return Err(error::read_only_buffer(op));
    };
    let mut filled = 0;
    let mut failure = None;
    while filled < window.len() {
        match read(&mut window[filled..], filled) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    dst.advance_mut(filled)?;
    if let Some(err) = failure {
        return Err(map_io_error(kind, err));
    }
    Ok(if filled == 0 {
        ReadOutcome::EndOfStream
    } else {
        ReadOutcome::Transferred(filled)
    })
}

/// 循环写出 `src` 的可读窗口，`write` 的第二个参数为本次调用已写出的字节数。
fn drain(
    src: &mut ByteBuffer,
    kind: OperationKind,
    mut write: impl FnMut(&[u8], usize) -> io::Result<usize>,
) -> Result<usize> {
    let data = src.as_slice();
    let mut written = 0;
    let mut failure = None;
    while written < data.len() {
        match write(&data[written..], written) {
            Ok(0) => {
                failure = Some(io::Error::from(io::ErrorKind::WriteZero));
                break;
            }
            Ok(n) => written += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    src.advance(written)?;
    match failure {
        Some(err) => Err(map_io_error(kind, err)),
        None => Ok(written),
    }
}

/// 按缓冲顺序把向量化调用的实际字节数分摊回各缓冲的游标。
fn distribute(
    bufs: &mut [&mut ByteBuffer],
    mut total: usize,
    advance: fn(&mut ByteBuffer, usize) -> Result<()>,
) -> Result<()> {
    for buf in bufs.iter_mut() {
        if total == 0 {
            break;
        }
        let step = total.min(buf.remaining());
        if step > 0 {
            advance(&mut **buf, step)?;
            total -= step;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn read_at_offset(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(unix)]
fn write_at_offset(file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::write_at(file, buf, offset)
}

// 无定位读写原语的平台上借助 seek 实现，并在返回前恢复原游标；多线程并发调用时不安全。
#[cfg(not(unix))]
fn read_at_offset(mut file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let saved = file.stream_position()?;
    file.seek(SeekFrom::Start(offset))?;
    let result = file.read(buf);
    file.seek(SeekFrom::Start(saved))?;
    result
}

#[cfg(not(unix))]
fn write_at_offset(mut file: &File, buf: &[u8], offset: u64) -> io::Result<usize> {
    let saved = file.stream_position()?;
    file.seek(SeekFrom::Start(offset))?;
    let result = file.write(buf);
    file.seek(SeekFrom::Start(saved))?;
    result
}
