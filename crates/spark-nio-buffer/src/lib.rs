#![cfg_attr(not(feature = "std"), no_std)]

//! `spark-nio-buffer` 提供定长、位置追踪、可在写入与读取之间切换的泛型缓冲。
//!
//! # 模块定位（Why）
//! - 文件通道的读写、直接传输的暂存、字符集转换的输入输出都以同一种缓冲为载体；
//!   本 crate 只负责游标状态机与存储策略，不涉及任何 I/O。
//!
//! # 设计概要（How）
//! - `buffer` 模块实现 [`Buffer<T>`]：以 `capacity/limit/position/mark` 四个游标刻画全部状态；
//! - `storage` 模块定义 [`Storage`] trait，堆分配与匿名映射（`std`）两种后端共享同一套游标逻辑，
//!   文件映射后端由通道 crate 提供；
//! - `element` 模块封闭可承载的元素种类，按种类提供 `ByteBuffer`、`CharBuffer` 等别名。
//!
//! # 命名约定（Consistency）
//! - `put`/`get` 为顺序访问，`put_at`/`get_at` 为绝对访问，批量操作以 `_slice`/`_into` 结尾。

extern crate alloc;

mod buffer;
mod element;
mod error;
mod storage;

pub use buffer::{
    Buffer, ByteBuffer, CharBuffer, CursorSnapshot, DoubleBuffer, FloatBuffer, IntBuffer,
    LongBuffer, ShortBuffer,
};
pub use element::Element;
#[cfg(feature = "std")]
pub use storage::DirectStorage;
pub use storage::{HeapStorage, Storage};
