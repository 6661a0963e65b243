/// 缓冲可承载的元素种类。
///
/// # 设计动机（Why）
/// - 字节、字符、短整型、整型、长整型、单双精度浮点的缓冲在游标语义上完全一致，
///   区别只在槽位类型；以一个泛型 [`Buffer<T>`](crate::Buffer) 覆盖全部种类，避免按类型复制实现。
///
/// # 契约说明（What）
/// - 元素必须为 `Copy`，读写均按值拷贝；`Default` 用于初始化新分配的槽位；
/// - 该 trait 已封闭，外部无法为自定义类型实现，保证存储后端只需面对固定集合的元素。
pub trait Element: Copy + Default + Send + Sync + 'static + sealed::Sealed {
    /// 元素种类的可读名称，用于错误消息。
    const KIND: &'static str;
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! impl_element {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const KIND: &'static str = $kind;
            }
        )*
    };
}

impl_element! {
    u8 => "byte",
    i8 => "signed byte",
    char => "char",
    u16 => "unsigned short",
    i16 => "short",
    u32 => "unsigned int",
    i32 => "int",
    u64 => "unsigned long",
    i64 => "long",
    f32 => "float",
    f64 => "double",
}
