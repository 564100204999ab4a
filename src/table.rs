//! Table / Executor / Facade：把 builder 的输出交给执行器，并把结果行写回表结构体。
//!
//! 按表生成的数据访问代码只需实现 [`Table`]（表名、列、行结构体的绑定），
//! 执行器既可以是连接池，也可以是外部传入的事务句柄（`&mut tx` 同样实现 [`Executor`]）。

use crate::args::Arg;
use crate::builder::{BuildError, QueryBuilder};
use crate::dialect::Dialect;
use crate::field::Field;
use crate::scan::{FromSqlValue, ScanError};
use crate::value::SqlValue;
use crate::valuer::ValuerError;
use std::fmt;
use std::marker::PhantomData;

/// 表描述：表名、有序列清单、零值行，以及绑定函数。
pub trait Table: Default {
    const NAME: &'static str;

    type Field: Field + Copy + fmt::Debug + 'static;

    /// 全部列，按表定义顺序。
    fn all_fields() -> &'static [Self::Field];

    /// 把一列的值写入对应字段。
    fn bind(&mut self, field: Self::Field, value: SqlValue) -> Result<(), ScanError>;
}

/// 执行器返回的一行。
pub trait Row {
    fn len(&self) -> usize;

    fn get(&self, idx: usize) -> Option<&SqlValue>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Row for Vec<SqlValue> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, idx: usize) -> Option<&SqlValue> {
        self.as_slice().get(idx)
    }
}

/// 最小执行抽象：执行查询并返回所有行。
///
/// 命名占位符方言的实现应按 `Args::param_name(i + 1)` 为 `params[i]` 命名。
pub trait Executor {
    type Row: Row;
    type Error: std::error::Error + 'static;

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Self::Row>, Self::Error>;
}

impl<X: Executor + ?Sized> Executor for &mut X {
    type Row = X::Row;
    type Error = X::Error;

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Self::Row>, Self::Error> {
        (**self).query(sql, params)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FacadeError<E: std::error::Error + 'static> {
    #[error("builder cannot be absent")]
    MissingBuilder,
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Valuer(#[from] ValuerError),
    #[error("builder failed to scan column `{field}`: {source}")]
    Scan {
        field: String,
        #[source]
        source: ScanError,
    },
    #[error("builder query failed: {0}")]
    Execute(#[source] E),
}

/// 单表的数据访问入口。
pub struct Facade<T, X> {
    executor: X,
    _table: PhantomData<fn() -> T>,
}

impl<T: Table, X: Executor> Facade<T, X> {
    pub fn new(executor: X) -> Self {
        Self {
            executor,
            _table: PhantomData,
        }
    }

    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.executor
    }

    /// `SELECT <全部列> FROM <表>`，使用默认 Flavor。
    pub fn init_builder(&self) -> QueryBuilder<T::Field> {
        let mut qb = QueryBuilder::<T::Field>::new();
        qb.select(T::all_fields().iter().copied()).from(T::NAME);
        qb
    }

    /// `SELECT COUNT(*) FROM <表>`，使用默认 Flavor。
    pub fn init_count_builder(&self) -> QueryBuilder<T::Field> {
        let mut qb = QueryBuilder::<T::Field>::new();
        qb.select_count([]).from(T::NAME);
        qb
    }

    /// 执行 builder 并把每一行绑定为 `T`。
    ///
    /// 绑定的列取自 `builder.fields()`；未记录时按 `T::all_fields()`。
    pub fn get_by_builder<D: Dialect>(
        &mut self,
        builder: Option<&QueryBuilder<T::Field, D>>,
    ) -> Result<Vec<T>, FacadeError<X::Error>> {
        let mut out = Vec::new();
        self.get_by_builder_iter(builder, |row| out.push(row))?;
        Ok(out)
    }

    /// 与 `get_by_builder` 相同，但每绑定一行就交给 `callback`。
    pub fn get_by_builder_iter<D, C>(
        &mut self,
        builder: Option<&QueryBuilder<T::Field, D>>,
        mut callback: C,
    ) -> Result<(), FacadeError<X::Error>>
    where
        D: Dialect,
        C: FnMut(T),
    {
        let builder = builder.ok_or(FacadeError::MissingBuilder)?;
        let fields = builder.fields().unwrap_or(T::all_fields());
        let rows = self.run("get_by_builder", builder)?;

        for row in rows {
            let data = bind_row::<T, _, X::Error>(&row, fields).inspect_err(|e| {
                tracing::error!(
                    table = T::NAME,
                    op = "get_by_builder",
                    fields = ?fields,
                    error = %e,
                    "failed to scan row"
                );
            })?;
            callback(data);
        }
        Ok(())
    }

    /// 执行计数 builder，返回首行首列。
    pub fn count<D: Dialect>(
        &mut self,
        builder: Option<&QueryBuilder<T::Field, D>>,
    ) -> Result<i64, FacadeError<X::Error>> {
        let builder = builder.ok_or(FacadeError::MissingBuilder)?;
        let rows = self.run("count", builder)?;
        let first = rows
            .first()
            .and_then(|r| r.get(0))
            .cloned()
            .ok_or(FacadeError::Scan {
                field: "count".to_string(),
                source: ScanError::NotEnoughColumns {
                    expected: 1,
                    got: 0,
                },
            })?;
        i64::from_sql_value(first).map_err(|source| FacadeError::Scan {
            field: "count".to_string(),
            source,
        })
    }

    fn run<D: Dialect>(
        &mut self,
        op: &'static str,
        builder: &QueryBuilder<T::Field, D>,
    ) -> Result<Vec<X::Row>, FacadeError<X::Error>> {
        let (sql, args) = builder.build().inspect_err(|e| {
            tracing::error!(table = T::NAME, op, error = %e, "refusing to run misused builder");
        })?;
        let params = args
            .iter()
            .map(Arg::resolve)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(table = T::NAME, op, sql = %sql, params = params.len(), "query");
        self.executor.query(&sql, &params).map_err(|e| {
            tracing::error!(table = T::NAME, op, sql = %sql, error = %e, "failed to query");
            FacadeError::Execute(e)
        })
    }
}

fn bind_row<T, R, E>(row: &R, fields: &[T::Field]) -> Result<T, FacadeError<E>>
where
    T: Table,
    R: Row,
    E: std::error::Error + 'static,
{
    if row.len() < fields.len() {
        return Err(FacadeError::Scan {
            field: fields[row.len()].as_ref().to_string(),
            source: ScanError::NotEnoughColumns {
                expected: fields.len(),
                got: row.len(),
            },
        });
    }
    let mut data = T::default();
    for (i, field) in fields.iter().enumerate() {
        let value = row.get(i).cloned().unwrap_or(SqlValue::Null);
        data.bind(*field, value).map_err(|source| FacadeError::Scan {
            field: field.as_ref().to_string(),
            source,
        })?;
    }
    Ok(data)
}
