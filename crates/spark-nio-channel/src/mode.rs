use std::fs::OpenOptions;
use std::ops::BitOr;

/// 打开文件通道时的访问标志集合。
///
/// # 逻辑解析（How）
/// - 以位集合表示，支持 `OpenMode::READ | OpenMode::CREATE` 形式的组合；
/// - [`OpenMode::to_options`] 逐项映射到 `std::fs::OpenOptions`，非法组合（例如只带 `CREATE`
///   而没有写权限）交由操作系统拒绝，错误在打开阶段统一报告为 `channel.resource_unavailable`。
///
/// # 契约说明（What）
/// - `APPEND` 隐含写访问，打开后游标位于文件末尾；
/// - `TRUNCATE` 与 `CREATE` 需要写访问。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OpenMode {
    bits: u8,
}

impl OpenMode {
    pub const READ: Self = Self { bits: 0b0_0001 };
    pub const WRITE: Self = Self { bits: 0b0_0010 };
    pub const READ_WRITE: Self = Self { bits: 0b0_0011 };
    pub const CREATE: Self = Self { bits: 0b0_0100 };
    pub const APPEND: Self = Self { bits: 0b0_1000 };
    pub const TRUNCATE: Self = Self { bits: 0b1_0000 };

    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    pub const fn is_readable(self) -> bool {
        self.contains(Self::READ)
    }

    /// `WRITE` 或 `APPEND` 任一存在即视为可写。
    pub const fn is_writable(self) -> bool {
        self.contains(Self::WRITE) || self.contains(Self::APPEND)
    }

    pub(crate) fn to_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.is_readable())
            .write(self.contains(Self::WRITE))
            .append(self.contains(Self::APPEND))
            .create(self.contains(Self::CREATE))
            .truncate(self.contains(Self::TRUNCATE));
        options
    }
}

impl BitOr for OpenMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// 内存映射的访问方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// 只读映射，经由区域的任何写入返回 `buffer.read_only`。
    ReadOnly,
    /// 共享可写映射，写入按平台时序传播到文件，`flush` 强制同步。
    ReadWrite,
    /// 写时复制映射，写入只在本区域可见，从不回写文件。
    Private,
}
