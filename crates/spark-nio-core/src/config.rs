//! 缓冲与通道层的运行配置。
//!
//! # 模块定位（Why）
//! - 直接传输的策略选择（内存映射还是暂存缓冲）、暂存缓冲大小、默认字符集等参数因部署环境而异，
//!   需要集中在一处声明并可从配置文件加载，而非散落在调用点的魔法数字。
//!
//! # 设计概要（How）
//! - 所有结构均派生 `serde::Deserialize`，字段缺省时回落到 [`Default`] 实现；
//! - 启用 `std` 时提供 [`NioConfig::from_toml_str`]，解析后立即执行 [`NioConfig::validate`]。
//!
//! # 契约说明（What）
//! - 校验失败返回 `buffer.invalid_argument`，并在 `cause` 中保留解析器错误（若有）。

use crate::{CoreError, Result, codes};
use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

/// 默认暂存缓冲容量（字节）。
pub const DEFAULT_STAGING_CAPACITY: usize = 8 * 1024;
/// `Auto` 策略下切换到内存映射路径的默认阈值（字节）。
pub const DEFAULT_MMAP_THRESHOLD: u64 = 1024 * 1024;
/// 默认字符集名称。
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// 工作区顶层配置。
///
/// ```rust
/// use spark_nio_core::config::{NioConfig, TransferStrategy};
///
/// let config = NioConfig::from_toml_str(
///     r#"
///     [transfer]
///     strategy = "staged"
///     staging_capacity = 4096
///     "#,
/// )
/// .expect("合法配置");
/// assert_eq!(config.transfer.strategy, TransferStrategy::Staged);
/// assert_eq!(config.charset.default_charset, "UTF-8");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NioConfig {
    /// 直接传输相关配置。
    pub transfer: TransferConfig,
    /// 字符集相关配置。
    pub charset: CharsetConfig,
}

impl NioConfig {
    /// 从 TOML 文本解析配置并校验。
    #[cfg(feature = "std")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|err| {
            CoreError::new(codes::BUFFER_INVALID_ARGUMENT, "invalid nio configuration")
                .with_cause(err)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 校验各子配置的取值范围。
    pub fn validate(&self) -> Result<()> {
        self.transfer.validate()?;
        self.charset.validate()
    }
}

/// 直接传输的执行策略。
///
/// - `Auto`：长度达到 [`TransferConfig::mmap_threshold`] 时走内存映射，否则走暂存缓冲；
/// - `Mapped`：总是映射源区间后整体写出（零长度除外）；
/// - `Staged`：总是经由固定大小的内部缓冲循环读写。
///
/// 三种策略的可观察结果完全一致（相同字节、相同总量），仅性能不同。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStrategy {
    #[default]
    Auto,
    Mapped,
    Staged,
}

/// 直接传输配置。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransferConfig {
    pub strategy: TransferStrategy,
    /// 暂存缓冲容量，必须大于零。
    pub staging_capacity: usize,
    /// `Auto` 策略的映射阈值。
    pub mmap_threshold: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            strategy: TransferStrategy::Auto,
            staging_capacity: DEFAULT_STAGING_CAPACITY,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl TransferConfig {
    /// 覆盖传输策略。
    pub fn with_strategy(mut self, strategy: TransferStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// 覆盖暂存缓冲容量。
    pub fn with_staging_capacity(mut self, staging_capacity: usize) -> Self {
        self.staging_capacity = staging_capacity;
        self
    }

    /// 判断给定长度在当前配置下是否应走映射路径。
    pub fn prefers_mapping(&self, length: u64) -> bool {
        match self.strategy {
            TransferStrategy::Mapped => length > 0,
            TransferStrategy::Staged => false,
            TransferStrategy::Auto => length > 0 && length >= self.mmap_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.staging_capacity == 0 {
            return Err(CoreError::new(
                codes::BUFFER_INVALID_ARGUMENT,
                "transfer.staging_capacity must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// 字符集配置。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CharsetConfig {
    /// 未显式指定字符集时使用的名称，例如 `UTF-8`、`GBK`。
    pub default_charset: String,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            default_charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

impl CharsetConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_charset.trim().is_empty() {
            return Err(CoreError::new(
                codes::BUFFER_INVALID_ARGUMENT,
                "charset.default_charset must not be empty",
            ));
        }
        Ok(())
    }
}
