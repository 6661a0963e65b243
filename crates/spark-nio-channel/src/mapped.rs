use crate::error::{self, MAP, MAP_FLUSH, METADATA, TRUNCATE, invalid_argument, map_io_error};
use crate::{FileChannel, MapMode};
use memmap2::{Mmap, MmapMut, MmapOptions};
use spark_nio_buffer::{ByteBuffer, Storage};
use spark_nio_core::Result;
use std::fs::File;
use std::io;
use std::ops::{Deref, DerefMut};
use tracing::{debug, warn};

/// 文件映射作为缓冲存储后端。
enum MappedStorage {
    ReadOnly(Mmap),
    Shared(MmapMut),
    Private(MmapMut),
}

impl Storage<u8> for MappedStorage {
    fn slots(&self) -> &[u8] {
        match self {
            MappedStorage::ReadOnly(map) => &map[..],
            MappedStorage::Shared(map) | MappedStorage::Private(map) => &map[..],
        }
    }

    fn slots_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            MappedStorage::ReadOnly(_) => None,
            MappedStorage::Shared(map) | MappedStorage::Private(map) => Some(&mut map[..]),
        }
    }

    fn is_direct(&self) -> bool {
        true
    }

    fn flush(&self) -> Result<()> {
        match self {
            MappedStorage::Shared(map) => map.flush().map_err(|err| map_io_error(MAP_FLUSH, err)),
            // 写时复制映射的修改从不回写文件。
            MappedStorage::ReadOnly(_) | MappedStorage::Private(_) => Ok(()),
        }
    }
}

/// `MappedRegion` 是文件 `[offset, offset + len)` 区间的缓冲视图。
///
/// # 设计背景（Why）
/// - 映射区域与普通缓冲共享同一套游标语义，因此直接解引用为 [`ByteBuffer`]，
///   可以原样交给 [`FileChannel::write`] 或任何接受缓冲的 API。
///
/// # 契约说明（What）
/// - `ReadOnly` 区域上的写入返回 `buffer.read_only`；
/// - `ReadWrite` 区域的写入按平台时序出现在文件中，[`flush`](Self::flush) 强制同步；
/// - `Private` 区域的写入只对本区域可见；
/// - 区域在 `Drop` 时解除映射，与创建它的通道生命周期无关。
///
/// # 风险提示（Trade-offs）
/// - 区域存活期间若其他进程截短文件，访问越界页会触发平台信号，这是内存映射的固有限制。
pub struct MappedRegion {
    buffer: ByteBuffer,
    offset: u64,
    mode: MapMode,
}

impl MappedRegion {
    /// 区域在文件中的起始偏移。
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    /// 把 `ReadWrite` 区域的修改同步写回文件；其他模式为空操作。
    pub fn flush(&self) -> Result<()> {
        self.buffer.flush()
    }
}

impl Deref for MappedRegion {
    type Target = ByteBuffer;

    fn deref(&self) -> &ByteBuffer {
        &self.buffer
    }
}

impl DerefMut for MappedRegion {
    fn deref_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("offset", &self.offset)
            .field("mode", &self.mode)
            .field("buffer", &self.buffer)
            .finish()
    }
}

impl FileChannel {
    /// 把文件 `[offset, offset + length)` 映射为缓冲。
    ///
    /// # 契约说明（What）
    /// - `length == 0` 或 `offset + length` 溢出返回 `buffer.invalid_argument`；
    /// - `ReadOnly`/`Private` 要求可读，且区间不得越过文件末尾（否则 `buffer.invalid_argument`）；
    /// - `ReadWrite` 要求读写访问，文件短于 `offset + length` 时先扩展文件，映射失败则恢复原长度；
    /// - 访问模式不满足或映射失败返回 `channel.resource_unavailable`。
    pub fn map(&self, offset: u64, length: u64, mode: MapMode) -> Result<MappedRegion> {
        let file = self.readable("map")?;
        if length == 0 {
            return Err(invalid_argument("map: length must be greater than zero"));
        }
        let end = offset.checked_add(length).ok_or_else(|| {
            invalid_argument(format!("map: offset {offset} + length {length} overflows"))
        })?;
        let len = usize::try_from(length).map_err(|_| {
            invalid_argument(format!("map: length {length} exceeds the address space"))
        })?;
        let size = file
            .metadata()
            .map_err(|err| map_io_error(METADATA, err))?
            .len();

        let mut options = MmapOptions::new();
        options.offset(offset).len(len);
        let storage = match mode {
            MapMode::ReadOnly | MapMode::Private => {
                if end > size {
                    return Err(invalid_argument(format!(
                        "map: range {offset}..{end} exceeds file size {size}"
                    )));
                }
                if mode == MapMode::ReadOnly {
                    // SAFETY: 映射区间位于文件之内；文件在映射存活期间被外部截短属于调用方违约，
                    // 该限制已在 `MappedRegion` 文档中说明。
                    let map = unsafe { options.map(file) }.map_err(|err| map_io_error(MAP, err))?;
                    MappedStorage::ReadOnly(map)
                } else {
                    // SAFETY: 同上；写时复制映射不会修改底层文件。
                    let map =
                        unsafe { options.map_copy(file) }.map_err(|err| map_io_error(MAP, err))?;
                    MappedStorage::Private(map)
                }
            }
            MapMode::ReadWrite => {
                if !self.mode().is_writable() {
                    return Err(error::access_denied("map", "writing"));
                }
                // SAFETY: 文件已扩展到覆盖映射区间，其余约束同只读映射。
                let map = grow_and_map(file, size, end, |file| unsafe { options.map_mut(file) })?;
                MappedStorage::Shared(map)
            }
        };
        let buffer = ByteBuffer::from_storage(Box::new(storage))?;
        debug!(path = %self.path().display(), offset, length, ?mode, "file region mapped");
        Ok(MappedRegion {
            buffer,
            offset,
            mode,
        })
    }
}

/// 文件短于 `end` 时先扩展再映射；映射失败则把文件恢复为原长度 `size`。
fn grow_and_map<M>(
    file: &File,
    size: u64,
    end: u64,
    map: impl FnOnce(&File) -> io::Result<M>,
) -> Result<M> {
    let grown = end > size;
    if grown {
        file.set_len(end)
            .map_err(|err| map_io_error(TRUNCATE, err))?;
    }
    map(file).map_err(|err| {
        if grown {
            if let Err(restore) = file.set_len(size) {
                warn!(error = %restore, size, "failed to restore file length after map failure");
            }
        }
        map_io_error(MAP, err)
    })
}
