//! halo-query-builder：按子句增量拼接、支持多方言占位符的泛型 SQL 查询构建库。

pub mod args;
pub mod builder;
mod clause;
pub mod dialect;
pub mod field;
pub mod flavor;
pub mod macros;
pub use crate::macros::*;
pub mod scan;
pub mod table;
#[cfg(test)]
mod table_tests;
pub mod value;
pub mod valuer;
pub mod where_clause;

pub use crate::args::{Arg, Args, NAMED_PARAM_PREFIX};
pub use crate::builder::{BuildError, QueryBuilder};
pub use crate::dialect::{Dialect, needs_quoting};
pub use crate::field::Field;
pub use crate::flavor::{Flavor, default_flavor, set_default_flavor, set_default_flavor_scoped};
pub use crate::scan::{FromSqlValue, ScanError, scan_into};
pub use crate::table::{Executor, Facade, FacadeError, Row, Table};
pub use crate::value::SqlValue;
pub use crate::valuer::{SqlValuer, ValuerError};
pub use crate::where_clause::WhereContinuation;

/// 推荐的便捷命名空间：允许 `use halo_space::querybuilder::{...}` 形式导入。
pub mod querybuilder {
    pub use crate::*;
}
