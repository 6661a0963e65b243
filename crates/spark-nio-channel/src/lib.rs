//! `spark-nio-channel` 在位置追踪缓冲之上提供文件通道。
//!
//! # 模块定位（Why）
//! - 缓冲只描述游标与存储，本 crate 负责与文件系统交互：顺序与定位读写、分散/聚集、
//!   文件到文件的直接传输、内存映射区域，以及缓冲与文本之间的字符集转换。
//!
//! # 设计概要（How）
//! - `channel`：[`FileChannel`] 与 [`ReadOutcome`]；
//! - `transfer`：[`transfer_to`]、[`transfer_from`] 与 [`copy_with_buffer`]，映射与暂存两条路径结果一致；
//! - `mapped`：[`MappedRegion`]，以文件映射作为缓冲存储后端；
//! - `charset`：基于 `encoding_rs` 的 [`Charset`]；
//! - `observability`：`tracing` 订阅器安装入口。
//!
//! # 错误约定（What）
//! - 所有操作返回 `spark_nio_core::Result`，IO 错误按操作映射为稳定错误码并保留原始错误。

mod channel;
pub mod charset;
mod error;
mod mapped;
mod mode;
pub mod observability;
mod transfer;

pub use channel::{FileChannel, ReadOutcome};
pub use charset::{Charset, CodecError};
pub use mapped::MappedRegion;
pub use mode::{MapMode, OpenMode};
pub use transfer::{copy_with_buffer, transfer_from, transfer_to, transfer_to_with};
