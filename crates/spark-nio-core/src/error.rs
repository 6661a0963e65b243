use crate::status::RetryAdvice;
use alloc::{borrow::Cow, boxed::Box};
use core::{error::Error, fmt, time::Duration};

/// `CoreError` 是缓冲层与通道层共享的稳定错误形态。
///
/// # 设计背景（Why）
/// - 缓冲的游标越界、通道的资源失效、字符集转换失败来自不同层次，但调用方需要以同一种方式
///   判定“是自身使用错误还是资源暂不可用”，因此全部合流为带稳定错误码的 `CoreError`。
/// - 仍需兼容 `no_std + alloc`，因此仅依赖 [`core::error::Error`]。
///
/// # 逻辑解析（How）
/// - `code` 始终为 `'static` 字符串，承载稳定语义，取值见 [`codes`]；
/// - `message` 面向排障人员；`cause` 通过 `source()` 暴露底层原因（如 `std::io::Error`）；
/// - 分类信息可显式覆盖，未覆盖时按错误码查表。
///
/// # 契约说明（What）
/// - **前置条件**：调用方使用 [`codes`] 中登记的错误码；
/// - **后置条件**：返回值可跨线程移动（`Send + Sync + 'static`），`Display` 输出为 `[code] message`。
#[derive(Debug)]
pub struct CoreError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<ErrorCause>,
    category: Option<ErrorCategory>,
}

/// `ErrorCause` 封装底层原因，保持 `Send + Sync` 以方便跨线程传递。
pub type ErrorCause = Box<dyn Error + Send + Sync + 'static>;

/// 工作区统一的返回值别名，默认错误类型为 [`CoreError`]。
pub type Result<T, E = CoreError> = core::result::Result<T, E>;

impl CoreError {
    /// 构造核心错误。
    ///
    /// # 示例（Examples）
    /// ```rust
    /// use spark_nio_core::{CoreError, ErrorKind, codes};
    ///
    /// let err = CoreError::new(codes::BUFFER_OVERFLOW, "position == limit");
    /// assert_eq!(err.code(), codes::BUFFER_OVERFLOW);
    /// assert_eq!(err.kind(), ErrorKind::BufferOverflow);
    /// assert!(err.cause().is_none());
    /// ```
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
            category: None,
        }
    }

    /// 附带底层原因并返回新的核心错误。
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 为现有错误设置底层原因。
    pub fn set_cause(&mut self, cause: impl Error + Send + Sync + 'static) {
        self.cause = Some(Box::new(cause));
    }

    /// 显式标记错误分类，覆盖按错误码查表得到的默认值。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：分类需与错误码语义一致，避免把调用方缺陷标记为 `Retryable`；
    /// - **后置条件**：之后 [`category`](Self::category) 返回此处设置的值。
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// 查询错误分类。
    ///
    /// 优先返回显式设置的分类；否则按错误码查表，`channel.resource_unavailable` 与
    /// `channel.io` 视为可重试，其余（调用方缺陷、已关闭通道、字符集错误）均为 `NonRetryable`。
    /// 核心层从不自动重试，分类仅供调用方决策。
    pub fn category(&self) -> ErrorCategory {
        self.category
            .clone()
            .unwrap_or_else(|| default_category(self.code))
    }

    /// 将稳定错误码还原为 [`ErrorKind`]。
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_code(self.code)
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取底层原因。
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn Error + 'static))
    }
}

/// 错误分类枚举，告诉调用方“修正用法”还是“稍后再试”。
///
/// - `Retryable`：资源暂时不可用，携带退避建议 [`RetryAdvice`]；
/// - `NonRetryable`：调用方缺陷或确定性失败，重试不会改变结果。
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    Retryable(RetryAdvice),
    NonRetryable,
}

fn default_category(code: &str) -> ErrorCategory {
    match code {
        codes::CHANNEL_RESOURCE_UNAVAILABLE => ErrorCategory::Retryable(
            RetryAdvice::after(Duration::from_millis(50)).with_reason("resource unavailable"),
        ),
        codes::CHANNEL_IO => ErrorCategory::Retryable(RetryAdvice::after(Duration::from_millis(10))),
        _ => ErrorCategory::NonRetryable,
    }
}

/// 与稳定错误码一一对应的错误种类，便于调用方做穷举匹配。
///
/// # 契约说明（What）
/// - 前八个变体对应缓冲与通道的语义错误，`UnsupportedCharset`/`MalformedInput` 来自字符集协作方；
/// - `Io` 表示无法归入上述语义的底层 I/O 故障；
/// - `Unknown` 仅在错误码未在 [`codes`] 中登记时出现。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// 构造或调用参数非法（容量为零、偏移越界等）。
    InvalidArgument,
    /// 顺序写入超出 `limit`。
    BufferOverflow,
    /// 顺序读取时剩余元素不足。
    BufferUnderflow,
    /// 状态不满足前置条件，例如未设置 mark 即调用 reset。
    InvalidState,
    /// 绝对下标越过 `limit`（读）或 `capacity`（写）。
    IndexOutOfRange,
    /// 对只读存储（只读映射）执行写入。
    ReadOnlyBuffer,
    /// 资源无法满足请求：打开、映射或传输失败。
    ResourceUnavailable,
    /// 通道关闭后继续使用。
    ClosedChannel,
    /// 字符集名称未知或不支持编码方向。
    UnsupportedCharset,
    /// 输入字节或字符无法按字符集转换。
    MalformedInput,
    /// 其余底层 I/O 故障。
    Io,
    /// 错误码未登记。
    Unknown,
}

impl ErrorKind {
    /// 根据稳定错误码查找种类。
    pub fn from_code(code: &str) -> Self {
        match code {
            codes::BUFFER_INVALID_ARGUMENT => Self::InvalidArgument,
            codes::BUFFER_OVERFLOW => Self::BufferOverflow,
            codes::BUFFER_UNDERFLOW => Self::BufferUnderflow,
            codes::BUFFER_INVALID_STATE => Self::InvalidState,
            codes::BUFFER_INDEX_OUT_OF_RANGE => Self::IndexOutOfRange,
            codes::BUFFER_READ_ONLY => Self::ReadOnlyBuffer,
            codes::CHANNEL_RESOURCE_UNAVAILABLE => Self::ResourceUnavailable,
            codes::CHANNEL_CLOSED => Self::ClosedChannel,
            codes::CHANNEL_IO => Self::Io,
            codes::CHARSET_UNSUPPORTED => Self::UnsupportedCharset,
            codes::CHARSET_MALFORMED_INPUT => Self::MalformedInput,
            _ => Self::Unknown,
        }
    }

    /// 返回该种类对应的稳定错误码；`Unknown` 没有登记码值。
    pub fn code(self) -> Option<&'static str> {
        let code = match self {
            Self::InvalidArgument => codes::BUFFER_INVALID_ARGUMENT,
            Self::BufferOverflow => codes::BUFFER_OVERFLOW,
            Self::BufferUnderflow => codes::BUFFER_UNDERFLOW,
            Self::InvalidState => codes::BUFFER_INVALID_STATE,
            Self::IndexOutOfRange => codes::BUFFER_INDEX_OUT_OF_RANGE,
            Self::ReadOnlyBuffer => codes::BUFFER_READ_ONLY,
            Self::ResourceUnavailable => codes::CHANNEL_RESOURCE_UNAVAILABLE,
            Self::ClosedChannel => codes::CHANNEL_CLOSED,
            Self::UnsupportedCharset => codes::CHARSET_UNSUPPORTED,
            Self::MalformedInput => codes::CHARSET_MALFORMED_INPUT,
            Self::Io => codes::CHANNEL_IO,
            Self::Unknown => return None,
        };
        Some(code)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 稳定错误码，遵循 `<领域>.<语义>` 命名约定，便于在日志中检索与聚合。
pub mod codes {
    /// 参数非法，属于调用方缺陷。
    pub const BUFFER_INVALID_ARGUMENT: &str = "buffer.invalid_argument";
    /// 顺序写入溢出。
    pub const BUFFER_OVERFLOW: &str = "buffer.overflow";
    /// 顺序读取下溢。
    pub const BUFFER_UNDERFLOW: &str = "buffer.underflow";
    /// 缓冲状态不满足前置条件。
    pub const BUFFER_INVALID_STATE: &str = "buffer.invalid_state";
    /// 绝对下标越界。
    pub const BUFFER_INDEX_OUT_OF_RANGE: &str = "buffer.index_out_of_range";
    /// 写入只读存储。
    pub const BUFFER_READ_ONLY: &str = "buffer.read_only";
    /// 资源不可用（打开、映射、传输失败）。
    pub const CHANNEL_RESOURCE_UNAVAILABLE: &str = "channel.resource_unavailable";
    /// 通道已关闭。
    pub const CHANNEL_CLOSED: &str = "channel.closed";
    /// 其余底层 I/O 故障。
    pub const CHANNEL_IO: &str = "channel.io";
    /// 字符集不受支持。
    pub const CHARSET_UNSUPPORTED: &str = "charset.unsupported";
    /// 字符集转换输入非法。
    pub const CHARSET_MALFORMED_INPUT: &str = "charset.malformed_input";
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{format, string::ToString};

    #[derive(Debug)]
    struct Root;

    impl fmt::Display for Root {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("root cause")
        }
    }

    impl Error for Root {}

    #[test]
    fn display_renders_code_and_message() {
        let err = CoreError::new(codes::BUFFER_UNDERFLOW, "need 4, have 2");
        assert_eq!(format!("{err}"), "[buffer.underflow] need 4, have 2");
    }

    #[test]
    fn source_exposes_attached_cause() {
        let err = CoreError::new(codes::CHANNEL_IO, "read").with_cause(Root);
        let source = err.source().expect("应暴露底层原因");
        assert_eq!(source.to_string(), "root cause");
    }

    #[test]
    fn every_registered_kind_round_trips_through_its_code() {
        let kinds = [
            ErrorKind::InvalidArgument,
            ErrorKind::BufferOverflow,
            ErrorKind::BufferUnderflow,
            ErrorKind::InvalidState,
            ErrorKind::IndexOutOfRange,
            ErrorKind::ReadOnlyBuffer,
            ErrorKind::ResourceUnavailable,
            ErrorKind::ClosedChannel,
            ErrorKind::UnsupportedCharset,
            ErrorKind::MalformedInput,
            ErrorKind::Io,
        ];
        for kind in kinds {
            let code = kind.code().expect("已登记的种类必有错误码");
            assert_eq!(ErrorKind::from_code(code), kind);
        }
        assert_eq!(ErrorKind::from_code("custom.code"), ErrorKind::Unknown);
        assert_eq!(ErrorKind::Unknown.code(), None);
    }

    #[test]
    fn category_defaults_follow_code_and_can_be_overridden() {
        let unavailable = CoreError::new(codes::CHANNEL_RESOURCE_UNAVAILABLE, "open");
        assert!(matches!(unavailable.category(), ErrorCategory::Retryable(_)));

        let misuse = CoreError::new(codes::CHANNEL_CLOSED, "read after close");
        assert_eq!(misuse.category(), ErrorCategory::NonRetryable);

        let forced = CoreError::new(codes::CHANNEL_RESOURCE_UNAVAILABLE, "permission")
            .with_category(ErrorCategory::NonRetryable);
        assert_eq!(forced.category(), ErrorCategory::NonRetryable);
    }
}
