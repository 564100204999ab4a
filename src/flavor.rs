//! SQL Flavor（方言）：控制标识符 Quote、占位符与数组谓词的渲染。

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

/// 内置方言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    PostgreSQL,
    Spanner,
    MySQL,
    SQLite,
    SQLServer,
}

static DEFAULT_FLAVOR: AtomicU8 = AtomicU8::new(Flavor::PostgreSQL as u8);
static DEFAULT_FLAVOR_LOCK: Mutex<()> = Mutex::new(());

impl Flavor {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::PostgreSQL,
            1 => Self::Spanner,
            2 => Self::MySQL,
            3 => Self::SQLite,
            4 => Self::SQLServer,
            _ => Self::PostgreSQL,
        }
    }

    fn to_u8(self) -> u8 {
        self as u8
    }

    /// 是否使用命名占位符（`@paramN` / `@pN`）。
    ///
    /// 命名方言的驱动通常需要 `QueryBuilder::params_map()` 而不是位置参数列表。
    pub fn is_named(self) -> bool {
        matches!(self, Self::Spanner | Self::SQLServer)
    }

    /// 为标识符加引号（无条件）；名字中的结束引号会被双写转义。
    pub fn quote(self, name: &str) -> String {
        match self {
            Self::PostgreSQL | Self::SQLite => format!("\"{}\"", name.replace('"', "\"\"")),
            Self::Spanner | Self::MySQL => format!("`{}`", name.replace('`', "``")),
            Self::SQLServer => format!("[{}]", name.replace(']', "]]")),
        }
    }
}

/// 获取当前全局默认 Flavor。`QueryBuilder::new()` 会在构造时读取它。
pub fn default_flavor() -> Flavor {
    Flavor::from_u8(DEFAULT_FLAVOR.load(Ordering::Relaxed))
}

/// 设置全局默认 Flavor，返回旧值。
pub fn set_default_flavor(flavor: Flavor) -> Flavor {
    let old = DEFAULT_FLAVOR.swap(flavor.to_u8(), Ordering::Relaxed);
    Flavor::from_u8(old)
}

/// 修改全局默认 Flavor 的 RAII guard（会持有一个全局锁，避免并行测试互相干扰）。
pub struct DefaultFlavorGuard {
    _lock: MutexGuard<'static, ()>,
    old: Flavor,
}

impl Drop for DefaultFlavorGuard {
    fn drop(&mut self) {
        set_default_flavor(self.old);
    }
}

/// 在一个作用域内临时设置 DefaultFlavor，并保证退出作用域后自动恢复。
pub fn set_default_flavor_scoped(flavor: Flavor) -> DefaultFlavorGuard {
    let lock = DEFAULT_FLAVOR_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_flavor(flavor);
    DefaultFlavorGuard { _lock: lock, old }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::Spanner => "Spanner",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
        };
        f.write_str(s)
    }
}
