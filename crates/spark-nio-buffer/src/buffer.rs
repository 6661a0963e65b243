use crate::{Element, HeapStorage, Storage, error};
use alloc::{boxed::Box, format, vec::Vec};
use bytes::buf::UninitSlice;
use core::fmt;
use spark_nio_core::Result;

/// `Buffer` 是定长、位置追踪、可在写入与读取之间切换的线性元素容器。
///
/// # 设计背景（Why）
/// - 文件通道的读写需要一个“调用方持有、通道借用”的中转区：通道写入 `position..limit`，
///   调用方翻转后再从同一区间读出，整个过程不发生扩容或重新分配。
/// - 以四个游标刻画全部状态，满足恒等式 `0 ≤ mark ≤ position ≤ limit ≤ capacity`
///   （`mark` 可未设置），任意公开操作结束后该不变式均成立。
///
/// # 逻辑解析（How）
/// - **填充态**：`allocate`/`clear`/`compact` 之后，`put` 系列从 `position` 写到 `limit`；
/// - **排空态**：`flip` 之后，`get` 系列从 `position` 读到 `limit`；
/// - 模式不单独存储，只由游标关系与调用约定体现，合法的模式切换只有 `flip`/`clear`/`rewind`/`compact`；
/// - 槽位由 [`Storage`] 后端提供，堆分配、匿名映射与文件映射共享同一套游标逻辑。
///
/// # 契约说明（What）
/// - 批量 `put_slice`/`get_into` 为全有或全无：失败时游标与内容均保持不变；
/// - 绝对写 [`put_at`](Self::put_at) 以 `capacity` 为界，绝对读 [`get_at`](Self::get_at) 以 `limit` 为界；
///   `limit` 只约束顺序访问；
/// - 只读存储上的任何写入返回 `buffer.read_only`，游标操作不受影响。
///
/// # 并发说明
/// - 单写者、单持有者模型：所有改变游标或内容的操作都需要 `&mut self`，
///   跨线程共享必须由调用方提供外部同步。
pub struct Buffer<T: Element> {
    storage: Box<dyn Storage<T>>,
    capacity: usize,
    limit: usize,
    position: usize,
    mark: Option<usize>,
    read_only: bool,
}

/// 字节缓冲。
pub type ByteBuffer = Buffer<u8>;
/// 字符缓冲。
pub type CharBuffer = Buffer<char>;
/// 短整型缓冲。
pub type ShortBuffer = Buffer<i16>;
/// 整型缓冲。
pub type IntBuffer = Buffer<i32>;
/// 长整型缓冲。
pub type LongBuffer = Buffer<i64>;
/// 单精度浮点缓冲。
pub type FloatBuffer = Buffer<f32>;
/// 双精度浮点缓冲。
pub type DoubleBuffer = Buffer<f64>;

/// 某一时刻的游标快照，便于断言与日志输出。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub capacity: usize,
    pub limit: usize,
    pub position: usize,
    pub mark: Option<usize>,
}

impl<T: Element> Buffer<T> {
    /// 在堆上分配 `capacity` 个槽位的缓冲。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：`capacity > 0`，否则返回 `buffer.invalid_argument`；
    /// - **后置条件**：`position = 0`、`limit = capacity`、`mark` 未设置，槽位均为默认值。
    ///
    /// ```rust
    /// use spark_nio_buffer::ByteBuffer;
    ///
    /// let buf = ByteBuffer::allocate(1024).expect("容量合法");
    /// assert_eq!((buf.position(), buf.limit(), buf.capacity()), (0, 1024, 1024));
    /// ```
    pub fn allocate(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(error::invalid_argument(
                "allocate: capacity must be greater than zero",
            ));
        }
        Self::from_storage(Box::new(HeapStorage::<T>::zeroed(capacity)))
    }

    /// 以现有元素构造缓冲，`capacity = limit = values.len()`。
    pub fn wrap(values: Vec<T>) -> Result<Self> {
        if values.is_empty() {
            return Err(error::invalid_argument("wrap: values must not be empty"));
        }
        Self::from_storage(Box::new(HeapStorage::from(values)))
    }

    /// 以任意存储后端构造缓冲，容量取自 `storage.slots().len()`。
    ///
    /// 通道 crate 借此把文件映射包装成缓冲；空存储返回 `buffer.invalid_argument`。
    pub fn from_storage(mut storage: Box<dyn Storage<T>>) -> Result<Self> {
        let capacity = storage.slots().len();
        if capacity == 0 {
            return Err(error::invalid_argument(
                "from_storage: storage must expose at least one slot",
            ));
        }
        let read_only = storage.slots_mut().is_none();
        Ok(Self {
            storage,
            capacity,
            limit: capacity,
            position: 0,
            mark: None,
            read_only,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// 当前 mark，未设置时为 `None`。
    pub fn mark_position(&self) -> Option<usize> {
        self.mark
    }

    /// `limit - position`。
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// 槽位是否位于托管堆之外（匿名映射或文件映射）。
    pub fn is_direct(&self) -> bool {
        self.storage.is_direct()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            capacity: self.capacity,
            limit: self.limit,
            position: self.position,
            mark: self.mark,
        }
    }

    /// 设置 `position`；超过 `limit` 返回 `buffer.invalid_argument`，大于新位置的 mark 被丢弃。
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(error::invalid_argument(format!(
                "set_position: {position} exceeds limit {}",
                self.limit
            )));
        }
        self.position = position;
        if self.mark.is_some_and(|mark| mark > position) {
            self.mark = None;
        }
        Ok(())
    }

    /// 设置 `limit`；超过 `capacity` 返回 `buffer.invalid_argument`。
    ///
    /// `position` 大于新 limit 时被截到 limit，mark 大于新 limit 时被丢弃。
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity {
            return Err(error::invalid_argument(format!(
                "set_limit: {limit} exceeds capacity {}",
                self.capacity
            )));
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        if self.mark.is_some_and(|mark| mark > limit) {
            self.mark = None;
        }
        Ok(())
    }

    /// 由填充态切换到排空态：`limit := position`、`position := 0`、清除 mark。
    ///
    /// 纯状态转换，不移动数据。连续调用两次会把 `limit` 置零，丢弃未读区间。
    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
        self.mark = None;
    }

    /// 保留 `limit`，把 `position` 归零以便重读同一区间。
    pub fn rewind(&mut self) {
        self.position = 0;
        self.mark = None;
    }

    /// 回到填充态：`position := 0`、`limit := capacity`。
    ///
    /// 槽位内容不被擦除，只是在逻辑上视为过期。
    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity;
        self.mark = None;
    }

    /// 记录当前 `position`，供 [`reset`](Self::reset) 恢复。
    pub fn mark(&mut self) {
        self.mark = Some(self.position);
    }

    /// 恢复到 mark；未设置 mark 时返回 `buffer.invalid_state`。
    pub fn reset(&mut self) -> Result<()> {
        let mark = self.mark.ok_or_else(error::mark_unset)?;
        self.position = mark;
        Ok(())
    }

    /// 把未读尾部 `position..limit` 挪到开头，并回到填充态。
    ///
    /// # 契约说明（What）
    /// - **后置条件**：`position = 原 remaining`、`limit = capacity`、mark 清除；
    /// - 只读存储返回 `buffer.read_only`，游标不变。
    ///
    /// 典型用法是在一次部分读取后保留尚未处理的字节，再继续向通道读入。
    pub fn compact(&mut self) -> Result<()> {
        let (position, limit) = (self.position, self.limit);
        let slots = self.writable_slots("compact")?;
        slots.copy_within(position..limit, 0);
        self.position = limit - position;
        self.limit = self.capacity;
        self.mark = None;
        Ok(())
    }

    /// 在 `position` 写入一个元素并前进 1；`position == limit` 时返回 `buffer.overflow`。
    pub fn put(&mut self, value: T) -> Result<()> {
        let (position, limit) = (self.position, self.limit);
        let slots = self.writable_slots("put")?;
        if position == limit {
            return Err(error::overflow("put", 1, 0));
        }
        slots[position] = value;
        self.position += 1;
        Ok(())
    }

    /// 批量写入全部元素；剩余空间不足时返回 `buffer.overflow` 且不写入任何元素。
    pub fn put_slice(&mut self, src: &[T]) -> Result<()> {
        let (position, remaining) = (self.position, self.remaining());
        let slots = self.writable_slots("put_slice")?;
        if src.len() > remaining {
            return Err(error::overflow("put_slice", src.len(), remaining));
        }
        slots[position..position + src.len()].copy_from_slice(src);
        self.position += src.len();
        Ok(())
    }

    /// 把 `src` 的剩余区间整体转写进本缓冲，两侧游标同步前进。
    ///
    /// 空间不足时返回 `buffer.overflow`，两个缓冲均保持不变。
    pub fn put_buffer(&mut self, src: &mut Buffer<T>) -> Result<()> {
        let count = src.remaining();
        let (position, remaining) = (self.position, self.remaining());
        let slots = self.writable_slots("put_buffer")?;
        if count > remaining {
            return Err(error::overflow("put_buffer", count, remaining));
        }
        slots[position..position + count].copy_from_slice(src.as_slice());
        self.position += count;
        src.position += count;
        Ok(())
    }

    /// 绝对写，不移动 `position`。
    ///
    /// 以 `capacity` 为界：`limit` 之外、`capacity` 之内的槽位同样可写；
    /// `index >= capacity` 返回 `buffer.index_out_of_range`。
    pub fn put_at(&mut self, index: usize, value: T) -> Result<()> {
        let capacity = self.capacity;
        let slots = self.writable_slots("put_at")?;
        if index >= capacity {
            return Err(error::index_out_of_range("put_at", index, capacity));
        }
        slots[index] = value;
        Ok(())
    }

    /// 读取 `position` 处元素并前进 1；无剩余时返回 `buffer.underflow`，游标不变。
    pub fn get(&mut self) -> Result<T> {
        if self.position == self.limit {
            return Err(error::underflow("get", 1, 0));
        }
        let value = self.storage.slots()[self.position];
        self.position += 1;
        Ok(value)
    }

    /// 读满 `dst`；剩余不足 `dst.len()` 时返回 `buffer.underflow` 且不读取任何元素。
    pub fn get_into(&mut self, dst: &mut [T]) -> Result<()> {
        let remaining = self.remaining();
        if dst.len() > remaining {
            return Err(error::underflow("get_into", dst.len(), remaining));
        }
        let start = self.position;
        dst.copy_from_slice(&self.storage.slots()[start..start + dst.len()]);
        self.position += dst.len();
        Ok(())
    }

    /// 读取 `len` 个元素写入 `dst[offset..offset + len]`。
    ///
    /// 目标区间越出 `dst` 时返回 `buffer.index_out_of_range`；剩余不足时返回 `buffer.underflow`。
    pub fn get_into_range(&mut self, dst: &mut [T], offset: usize, len: usize) -> Result<()> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= dst.len())
            .ok_or_else(|| {
                error::index_out_of_range("get_into_range", offset.saturating_add(len), dst.len())
            })?;
        self.get_into(&mut dst[offset..end])
    }

    /// 读取 `count` 个元素到新分配的 `Vec`。
    pub fn get_slice(&mut self, count: usize) -> Result<Vec<T>> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(error::underflow("get_slice", count, remaining));
        }
        let start = self.position;
        let values = self.storage.slots()[start..start + count].to_vec();
        self.position += count;
        Ok(values)
    }

    /// 绝对读，不移动 `position`；`index >= limit` 返回 `buffer.index_out_of_range`。
    pub fn get_at(&self, index: usize) -> Result<T> {
        if index >= self.limit {
            return Err(error::index_out_of_range("get_at", index, self.limit));
        }
        Ok(self.storage.slots()[index])
    }

    /// 当前可读窗口 `position..limit`。
    pub fn as_slice(&self) -> &[T] {
        &self.storage.slots()[self.position..self.limit]
    }

    /// 当前可写窗口 `position..limit`，只读存储返回 `None`。
    ///
    /// 与 [`advance_mut`](Self::advance_mut) 配合使用：外部（例如通道）直接填充窗口后再推进游标。
    pub fn chunk_mut(&mut self) -> Option<&mut [T]> {
        let (position, limit) = (self.position, self.limit);
        self.storage
            .slots_mut()
            .map(|slots| &mut slots[position..limit])
    }

    /// 声明已从可读窗口消费 `count` 个元素。
    pub fn advance(&mut self, count: usize) -> Result<()> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(error::underflow("advance", count, remaining));
        }
        self.position += count;
        Ok(())
    }

    /// 声明已向可写窗口填充 `count` 个元素。
    pub fn advance_mut(&mut self, count: usize) -> Result<()> {
        if self.read_only {
            return Err(error::read_only("advance_mut"));
        }
        let remaining = self.remaining();
        if count > remaining {
            return Err(error::overflow("advance_mut", count, remaining));
        }
        self.position += count;
        Ok(())
    }

    /// 把存储中尚未落地的写入同步到底层资源；纯内存存储为空操作。
    pub fn flush(&self) -> Result<()> {
        self.storage.flush()
    }

    fn writable_slots(&mut self, op: &'static str) -> Result<&mut [T]> {
        self.storage
            .slots_mut()
            .ok_or_else(|| error::read_only(op))
    }
}

#[cfg(feature = "std")]
impl Buffer<u8> {
    /// 分配直接字节缓冲，槽位来自匿名内存映射。
    ///
    /// 契约与 [`allocate`](Self::allocate) 相同；映射失败返回 `channel.resource_unavailable`。
    pub fn allocate_direct(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(error::invalid_argument(
                "allocate_direct: capacity must be greater than zero",
            ));
        }
        Self::from_storage(Box::new(crate::DirectStorage::allocate(capacity)?))
    }
}

impl<T: Element> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("kind", &T::KIND)
            .field("capacity", &self.capacity)
            .field("limit", &self.limit)
            .field("position", &self.position)
            .field("mark", &self.mark)
            .field("direct", &self.is_direct())
            .field("read_only", &self.read_only)
            .finish()
    }
}

/// 与 `bytes` 生态互通：字节缓冲的可读窗口即 `Buf::chunk`。
///
/// `Buf::advance` 越界时按 `bytes` 约定 panic；需要错误返回时使用固有方法 [`Buffer::advance`]。
impl bytes::Buf for Buffer<u8> {
    fn remaining(&self) -> usize {
        Buffer::remaining(self)
    }

    fn chunk(&self) -> &[u8] {
        self.as_slice()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= Buffer::remaining(self),
            "cannot advance past remaining: {cnt} > {}",
            Buffer::remaining(self)
        );
        self.position += cnt;
    }
}

// SAFETY: `chunk_mut` 只暴露 `position..limit` 内已初始化的槽位，
// `advance_mut` 断言推进量不超过该窗口，因此推进后的区间始终是有效字节。
unsafe impl bytes::BufMut for Buffer<u8> {
    fn remaining_mut(&self) -> usize {
        if self.read_only {
            0
        } else {
            Buffer::remaining(self)
        }
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        assert!(
            cnt <= bytes::BufMut::remaining_mut(self),
            "cannot advance past remaining_mut: {cnt}"
        );
        self.position += cnt;
    }

    fn chunk_mut(&mut self) -> &mut UninitSlice {
        match Buffer::chunk_mut(self) {
            Some(window) => UninitSlice::new(window),
            None => UninitSlice::new(&mut []),
        }
    }
}
