//! `buffer_contract` 集成测试：以公开 API 校验缓冲的游标契约。
//!
//! # 测试总览（Why）
//! - 覆盖分配、翻转、重读、清空、mark/reset 在各阶段对四个游标的影响；
//! - 覆盖越界路径，确保错误种类稳定且失败不改变游标；
//! - 以不同元素种类运行同一组断言，验证泛型缓冲在各种类上的语义一致。

use spark_nio_buffer::{
    Buffer, ByteBuffer, CharBuffer, CursorSnapshot, Element, IntBuffer, LongBuffer,
};
use spark_nio_core::ErrorKind;

fn assert_fresh<T: Element>(capacity: usize) {
    let buf = Buffer::<T>::allocate(capacity).expect("容量合法");
    assert_eq!(
        buf.snapshot(),
        CursorSnapshot {
            capacity,
            limit: capacity,
            position: 0,
            mark: None,
        },
        "{} 缓冲的初始游标不符合契约",
        T::KIND
    );
}

#[test]
fn allocate_yields_write_ready_cursors_for_every_element_kind() {
    assert_fresh::<u8>(1);
    assert_fresh::<char>(16);
    assert_fresh::<i16>(3);
    assert_fresh::<i32>(1024);
    assert_fresh::<i64>(7);
    assert_fresh::<f32>(2);
    assert_fresh::<f64>(9);
}

#[test]
fn put_flip_get_round_trip_returns_the_written_elements() {
    let payload = b"scatter and gather";
    let mut buf = ByteBuffer::allocate(64).expect("分配缓冲");
    buf.put_slice(payload).expect("写入");
    buf.flip();
    let read = buf.get_slice(payload.len()).expect("读取");
    assert_eq!(read, payload);
    assert!(!buf.has_remaining());

    let mut chars = CharBuffer::allocate(8).expect("分配缓冲");
    for ch in "测试".chars() {
        chars.put(ch).expect("写入字符");
    }
    chars.flip();
    assert_eq!(chars.get().expect("第一个字符"), '测');
    assert_eq!(chars.get().expect("第二个字符"), '试');
}

#[test]
fn second_flip_before_any_put_discards_the_readable_region() {
    let mut buf = IntBuffer::allocate(4).expect("分配缓冲");
    buf.put_slice(&[1, 2, 3]).expect("写入");
    buf.flip();
    assert_eq!(buf.limit(), 3);
    buf.flip();
    assert_eq!(buf.limit(), 0);
    assert_eq!(buf.remaining(), 0);
}

#[test]
fn get_on_exhausted_buffer_underflows_without_moving_cursors() {
    let mut buf = ByteBuffer::allocate(2).expect("分配缓冲");
    buf.put(9).expect("写入");
    buf.flip();
    buf.get().expect("读取唯一元素");
    let before = buf.snapshot();

    let err = buf.get().expect_err("无剩余");
    assert_eq!(err.kind(), ErrorKind::BufferUnderflow);
    assert_eq!(buf.snapshot(), before);

    let mut dst = [0u8; 1];
    let err = buf.get_into(&mut dst).expect_err("批量读同样下溢");
    assert_eq!(err.kind(), ErrorKind::BufferUnderflow);
    assert_eq!(buf.snapshot(), before);
}

#[test]
fn put_at_position_equal_limit_overflows() {
    let mut buf = LongBuffer::allocate(2).expect("分配缓冲");
    buf.put(1).expect("写入");
    buf.put(2).expect("写入");
    let err = buf.put(3).expect_err("position == limit");
    assert_eq!(err.kind(), ErrorKind::BufferOverflow);
    assert_eq!(buf.position(), 2);
}

#[test]
fn clear_always_restores_full_write_window() {
    let mut buf = ByteBuffer::allocate(16).expect("分配缓冲");
    buf.put_slice(b"abc").expect("写入");
    buf.flip();
    buf.get().expect("读取");
    buf.mark();
    buf.set_limit(2).expect("缩小 limit");
    buf.clear();
    assert_eq!(
        buf.snapshot(),
        CursorSnapshot {
            capacity: 16,
            limit: 16,
            position: 0,
            mark: None,
        }
    );
}

#[test]
fn get_into_range_validates_destination_bounds() {
    let mut buf = ByteBuffer::wrap(b"abcde".to_vec()).expect("包装");
    let mut dst = [0u8; 4];
    let err = buf
        .get_into_range(&mut dst, 3, 2)
        .expect_err("目标区间越界");
    assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    assert_eq!(buf.position(), 0);

    buf.get_into_range(&mut dst, 1, 3).expect("目标区间合法");
    assert_eq!(&dst, b"\0abc");
}

#[test]
fn reset_without_mark_fails_with_invalid_state() {
    let mut buf = ByteBuffer::allocate(4).expect("分配缓冲");
    buf.put(1).expect("写入");
    let err = buf.reset().expect_err("没有 mark");
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    buf.mark();
    buf.flip();
    let err = buf.reset().expect_err("flip 会清除 mark");
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}
