#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "spark-nio-core: 位置追踪缓冲与文件通道共享的错误域与配置契约。"]
#![doc = ""]
#![doc = "== 内存分配依赖 =="]
#![doc = "本 crate 定位于 `no_std + alloc`：错误消息与底层原因依赖 `Cow`/`Box`，配置依赖 `String`。"]
#![doc = "启用 `std`（默认）后额外提供 TOML 配置解析。"]

extern crate alloc;

pub mod config;
pub mod error;
pub mod status;

pub use config::{CharsetConfig, NioConfig, TransferConfig, TransferStrategy};
pub use error::{CoreError, ErrorCategory, ErrorCause, ErrorKind, Result, codes};
pub use status::RetryAdvice;
