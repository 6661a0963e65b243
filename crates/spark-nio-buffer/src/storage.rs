use alloc::{boxed::Box, vec::Vec};
use spark_nio_core::Result;

/// `Storage` 描述缓冲背后的定长槽位块。
///
/// # 设计动机（Why）
/// - “堆上分配”与“托管堆之外分配（匿名映射、文件映射）”只是存储策略不同，游标逻辑完全相同；
///   将存储抽象为 trait 后，[`Buffer`](crate::Buffer) 只维护 `capacity/limit/position/mark`，
///   不关心槽位来自何处。
/// - 文件映射后端位于通道 crate，因此该 trait 保持开放，便于外部 crate 提供新的后端。
///
/// # 契约说明（What）
/// - `slots` 的长度即缓冲容量，构造后不得改变；
/// - `slots_mut` 返回 `None` 表示只读存储，缓冲会把所有写入拒绝为 `buffer.read_only`；
/// - `is_direct` 报告槽位是否位于分配器之外；
/// - `flush` 将尚未落地的写入同步到底层资源，纯内存后端无需覆盖默认实现。
///
/// # 并发说明
/// - 实现需满足 `Send + Sync`，但缓冲本身是单写者模型：所有写路径都要求 `&mut`。
pub trait Storage<T>: Send + Sync + 'static {
    /// 返回全部槽位。
    fn slots(&self) -> &[T];

    /// 返回可写槽位，只读存储返回 `None`。
    fn slots_mut(&mut self) -> Option<&mut [T]>;

    /// 槽位是否位于托管堆之外。
    fn is_direct(&self) -> bool {
        false
    }

    /// 同步尚未落地的写入。
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// 普通堆分配的存储后端。
#[derive(Debug)]
pub struct HeapStorage<T> {
    slots: Box<[T]>,
}

impl<T: Copy + Default> HeapStorage<T> {
    /// 分配 `capacity` 个默认值槽位。
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            slots: alloc::vec![T::default(); capacity].into_boxed_slice(),
        }
    }
}

impl<T> From<Vec<T>> for HeapStorage<T> {
    fn from(slots: Vec<T>) -> Self {
        Self {
            slots: slots.into_boxed_slice(),
        }
    }
}

impl<T: Send + Sync + 'static> Storage<T> for HeapStorage<T> {
    fn slots(&self) -> &[T] {
        &self.slots
    }

    fn slots_mut(&mut self) -> Option<&mut [T]> {
        Some(&mut self.slots)
    }
}

#[cfg(feature = "std")]
pub use direct::DirectStorage;

#[cfg(feature = "std")]
mod direct {
    use super::Storage;
    use memmap2::MmapMut;
    use spark_nio_core::{CoreError, Result, codes};

    /// 直接存储：槽位来自匿名内存映射，而非全局分配器。
    ///
    /// # 设计动机（Why）
    /// - 与内存映射、零拷贝路径交互时，按页对齐且不受分配器搬移影响的内存更合适；
    /// - 仅支持字节元素，其余元素种类没有对应的直接访问场景。
    ///
    /// # 契约说明（What）
    /// - 新分配的映射内容全部为零；
    /// - 映射在存储释放时归还给操作系统。
    #[derive(Debug)]
    pub struct DirectStorage {
        map: MmapMut,
    }

    impl DirectStorage {
        /// 申请 `capacity` 字节的匿名映射，失败时返回 `channel.resource_unavailable`。
        pub fn allocate(capacity: usize) -> Result<Self> {
            let map = MmapMut::map_anon(capacity).map_err(|err| {
                CoreError::new(
                    codes::CHANNEL_RESOURCE_UNAVAILABLE,
                    alloc::format!("anonymous mapping of {capacity} bytes failed"),
                )
                .with_cause(err)
            })?;
            Ok(Self { map })
        }
    }

    impl Storage<u8> for DirectStorage {
        fn slots(&self) -> &[u8] {
            &self.map
        }

        fn slots_mut(&mut self) -> Option<&mut [u8]> {
            Some(&mut self.map)
        }

        fn is_direct(&self) -> bool {
            true
        }
    }
}
