use alloc::borrow::Cow;
use core::time::Duration;

/// 退避建议，随 [`ErrorCategory::Retryable`](crate::ErrorCategory::Retryable) 返回给调用方。
///
/// 核心层不会自行重试；该结构只描述“至少等待多久再尝试”，是否重试由调用方决定。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryAdvice {
    /// 推荐的等待时长。
    pub wait: Duration,
    /// 可选的原因描述，帮助调用方生成观测日志。
    pub reason: Option<Cow<'static, str>>,
}

impl RetryAdvice {
    /// 构造一个仅包含等待时间的建议。
    ///
    /// # 契约说明
    /// - `wait` 应大于零；若无法提供准确时长，建议使用几十毫秒量级的默认值。
    pub const fn after(wait: Duration) -> Self {
        Self { wait, reason: None }
    }

    /// 为建议附加原因描述。
    pub fn with_reason(mut self, reason: impl Into<Cow<'static, str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
