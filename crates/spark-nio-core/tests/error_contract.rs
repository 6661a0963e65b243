//! `error_contract` 集成测试：校验错误码、错误种类与分类之间的映射在公开 API 上保持稳定。
//!
//! # 测试总览（Why）
//! - 缓冲与通道 crate 只通过 `codes` 常量构造错误，调用方只通过 `kind()`/`category()` 判定；
//!   两端必须看到同一张映射表，否则重试策略会漂移。

use std::error::Error;
use std::io;

use spark_nio_core::{CoreError, ErrorCategory, ErrorKind, codes};

#[test]
fn io_cause_survives_the_error_chain() {
    let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
    let err = CoreError::new(codes::CHANNEL_RESOURCE_UNAVAILABLE, "open /tmp/x").with_cause(io_err);

    assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    let source = err.source().expect("应保留 io::Error");
    let io_source = source
        .downcast_ref::<io::Error>()
        .expect("底层原因应为 io::Error");
    assert_eq!(io_source.kind(), io::ErrorKind::PermissionDenied);
}

#[test]
fn caller_bugs_are_never_retryable() {
    for code in [
        codes::BUFFER_INVALID_ARGUMENT,
        codes::BUFFER_OVERFLOW,
        codes::BUFFER_UNDERFLOW,
        codes::BUFFER_INVALID_STATE,
        codes::BUFFER_INDEX_OUT_OF_RANGE,
        codes::BUFFER_READ_ONLY,
        codes::CHANNEL_CLOSED,
        codes::CHARSET_UNSUPPORTED,
        codes::CHARSET_MALFORMED_INPUT,
    ] {
        let err = CoreError::new(code, "misuse");
        assert_eq!(err.category(), ErrorCategory::NonRetryable, "{code} 不应可重试");
    }
}

#[test]
fn resource_unavailable_carries_retry_advice() {
    let err = CoreError::new(codes::CHANNEL_RESOURCE_UNAVAILABLE, "map");
    match err.category() {
        ErrorCategory::Retryable(advice) => assert!(!advice.wait.is_zero()),
        other => panic!("期望可重试分类，实际 {other:?}"),
    }
}
