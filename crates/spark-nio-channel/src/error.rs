use spark_nio_core::{CoreError, ErrorCategory, RetryAdvice, codes};
use std::borrow::Cow;
use std::io;
use std::time::Duration;

/// 描述一次底层操作对应的稳定错误码与默认文案。
#[derive(Clone, Copy)]
pub(crate) struct OperationKind {
    pub code: &'static str,
    pub message: &'static str,
}

pub(crate) const OPEN: OperationKind = OperationKind {
    code: codes::CHANNEL_RESOURCE_UNAVAILABLE,
    message: "file open",
};
pub(crate) const READ: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file read",
};
pub(crate) const READ_SCATTER: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file read_vectored",
};
pub(crate) const WRITE: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file write",
};
pub(crate) const WRITE_GATHER: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file write_vectored",
};
pub(crate) const SEEK: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file seek",
};
pub(crate) const METADATA: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file metadata",
};
pub(crate) const TRUNCATE: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file truncate",
};
pub(crate) const SYNC: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "file sync",
};
pub(crate) const MAP: OperationKind = OperationKind {
    code: codes::CHANNEL_RESOURCE_UNAVAILABLE,
    message: "file map",
};
pub(crate) const MAP_FLUSH: OperationKind = OperationKind {
    code: codes::CHANNEL_IO,
    message: "mapped region flush",
};

/// 将 IO 错误映射为稳定的 `CoreError`，附带错误分类并保留原始错误作为 `source`。
///
/// 写入零字节（设备已满或拒绝继续写入）无论发生在哪个操作上都报告为资源不可用。
pub(crate) fn map_io_error(kind: OperationKind, error: io::Error) -> CoreError {
    let category = categorize_io_error(&error);
    let code = if error.kind() == io::ErrorKind::WriteZero {
        codes::CHANNEL_RESOURCE_UNAVAILABLE
    } else {
        kind.code
    };
    CoreError::new(
        code,
        Cow::Owned(format!("{}: {}", kind.message, error)),
    )
    .with_category(category)
    .with_cause(error)
}

/// 通道关闭后继续使用。
pub(crate) fn closed_error(op: &'static str) -> CoreError {
    CoreError::new(codes::CHANNEL_CLOSED, format!("{op}: channel is closed"))
}

/// 通道的打开模式不允许该操作。
pub(crate) fn access_denied(op: &'static str, access: &'static str) -> CoreError {
    CoreError::new(
        codes::CHANNEL_RESOURCE_UNAVAILABLE,
        format!("{op}: channel was not opened for {access}"),
    )
    .with_category(ErrorCategory::NonRetryable)
}

pub(crate) fn invalid_argument(message: impl Into<Cow<'static, str>>) -> CoreError {
    CoreError::new(codes::BUFFER_INVALID_ARGUMENT, message)
}

pub(crate) fn read_only_buffer(op: &'static str) -> CoreError {
    CoreError::new(
        codes::BUFFER_READ_ONLY,
        format!("{op}: destination buffer is read-only"),
    )
}

fn categorize_io_error(error: &io::Error) -> ErrorCategory {
    use io::ErrorKind;
    match error.kind() {
        ErrorKind::Interrupted | ErrorKind::WouldBlock => {
            ErrorCategory::Retryable(RetryAdvice::after(Duration::from_millis(5)))
        }
        ErrorKind::TimedOut | ErrorKind::WriteZero => {
            ErrorCategory::Retryable(RetryAdvice::after(Duration::from_millis(50)))
        }
        ErrorKind::PermissionDenied
        | ErrorKind::NotFound
        | ErrorKind::AlreadyExists
        | ErrorKind::InvalidInput
        | ErrorKind::Unsupported => ErrorCategory::NonRetryable,
        _ => ErrorCategory::Retryable(RetryAdvice::after(Duration::from_millis(50))),
    }
}
