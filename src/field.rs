//! Field：builder 的列名类型参数。
//!
//! 任何能借出 `&str` 的可克隆类型都可以作为列名；按表生成强类型列名请用 [`fields!`](crate::fields)。

/// 列名约束。
pub trait Field: AsRef<str> + Clone {}

impl<T: AsRef<str> + Clone> Field for T {}
