//! 缓冲游标违例到稳定错误码的映射。

use alloc::format;
use spark_nio_core::{CoreError, codes};

pub(crate) fn invalid_argument(message: impl Into<alloc::borrow::Cow<'static, str>>) -> CoreError {
    CoreError::new(codes::BUFFER_INVALID_ARGUMENT, message)
}

pub(crate) fn overflow(op: &'static str, requested: usize, remaining: usize) -> CoreError {
    CoreError::new(
        codes::BUFFER_OVERFLOW,
        format!("{op}: requested {requested}, remaining {remaining}"),
    )
}

pub(crate) fn underflow(op: &'static str, requested: usize, remaining: usize) -> CoreError {
    CoreError::new(
        codes::BUFFER_UNDERFLOW,
        format!("{op}: requested {requested}, remaining {remaining}"),
    )
}

pub(crate) fn index_out_of_range(op: &'static str, index: usize, bound: usize) -> CoreError {
    CoreError::new(
        codes::BUFFER_INDEX_OUT_OF_RANGE,
        format!("{op}: index {index} outside 0..{bound}"),
    )
}

pub(crate) fn read_only(op: &'static str) -> CoreError {
    CoreError::new(
        codes::BUFFER_READ_ONLY,
        format!("{op}: buffer storage is read-only"),
    )
}

pub(crate) fn mark_unset() -> CoreError {
    CoreError::new(codes::BUFFER_INVALID_STATE, "reset: mark is not set")
}
