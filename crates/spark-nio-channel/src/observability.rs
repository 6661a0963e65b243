//! `tracing` 订阅器的一次性安装入口。
//!
//! 通道在打开、关闭、映射与传输时输出结构化事件（`path`、`bytes`、`strategy` 等字段），
//! 本模块为宿主程序提供 `fmt + EnvFilter` 的最小组合；已自行配置订阅器的宿主无需调用。

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 读取过滤指令的环境变量。
pub const LOG_ENV: &str = "SPARK_NIO_LOG";

/// 安装阶段的失败路径。
#[derive(Debug, Error)]
pub enum InstallError {
    /// 全局 `tracing` 订阅器已存在，不会被覆盖。
    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet,
    /// 过滤指令无法解析。
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
    /// 设置全局订阅器失败。
    #[error("failed to set the global subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// 以 `filter`（`EnvFilter` 语法，例如 `"spark_nio_channel=debug"`）安装全局订阅器。
///
/// # 契约说明（What）
/// - 已存在全局订阅器时返回 [`InstallError::SubscriberAlreadySet`]，不做任何修改；
/// - 成功后进程内的通道事件按过滤规则输出到标准输出。
pub fn install(filter: &str) -> Result<(), InstallError> {
    if dispatcher::has_been_set() {
        return Err(InstallError::SubscriberAlreadySet);
    }
    let filter = EnvFilter::try_new(filter)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()?;
    Ok(())
}

/// 从 [`LOG_ENV`] 读取过滤指令，未设置时回退为 `default_filter`。
pub fn install_from_env(default_filter: &str) -> Result<(), InstallError> {
    match std::env::var(LOG_ENV) {
        Ok(filter) if !filter.trim().is_empty() => install(&filter),
        _ => install(default_filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_filter_is_reported() {
        let err = EnvFilter::try_new("spark_nio_channel=loud").map_err(InstallError::from);
        assert!(matches!(err, Err(InstallError::InvalidFilter(_))));
    }
}
