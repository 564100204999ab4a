//! QueryBuilder：按子句增量拼接 SELECT 语句，并按发出顺序收集参数。
//!
//! 每个子句各有一个缓冲区，`select`/`from`/`where_`/`group_by`/`order_by`/`limit`/`offset`
//! 只重写自己的缓冲区，`join`/`and`/`or`/`having`/`then_by` 只追加。
//! 渲染顺序固定：select、from、where、group by、order by、limit、offset。

use crate::args::{Arg, Args};
use crate::clause::ClauseBuffer;
use crate::dialect::Dialect;
use crate::field::Field;
use crate::flavor::{Flavor, default_flavor};
use crate::value::SqlValue;
use crate::valuer::ValuerError;
use crate::where_clause::WhereContinuation;
use std::collections::BTreeMap;
use std::fmt;

/// builder 误用。builder 不会因为误用而 panic，只记录第一次误用，由 [`QueryBuilder::build`] 返回。
///
/// `EmptyIn`/`PredicateWithoutWhere` 属于当前 WHERE 子句，重写 WHERE 时随之丢弃；
/// `EmptySelect` 属于当前 SELECT 子句；其余误用保留到 `reset()`。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("builder IN on column `{column}` requires at least one value")]
    EmptyIn { column: String },
    #[error("builder then_by called before order_by")]
    ThenByWithoutOrderBy,
    #[error("builder asc/desc called before order_by")]
    OrderDirectionWithoutOrderBy,
    #[error("builder having called before group_by")]
    HavingWithoutGroupBy,
    #[error("builder and/or on column `{column}` called before where")]
    PredicateWithoutWhere { column: String },
    #[error("builder select requires at least one column")]
    EmptySelect,
}

/// 列名包装方式（`LOWER(col)` / `UPPER(col)`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wrap {
    None,
    Lower,
    Upper,
}

impl Wrap {
    fn open(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lower => "LOWER(",
            Self::Upper => "UPPER(",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lower | Self::Upper => ")",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder<F, D = Flavor> {
    dialect: D,
    args: Args,
    fields: Option<Vec<F>>,

    select_clause: ClauseBuffer,
    from_clause: ClauseBuffer,
    pub(crate) where_clause: ClauseBuffer,
    group_by_clause: ClauseBuffer,
    order_by_clause: ClauseBuffer,
    limit_clause: ClauseBuffer,
    offset_clause: ClauseBuffer,

    having: bool,
    misuse: Option<BuildError>,
    select_misuse: Option<BuildError>,
    where_misuse: Option<BuildError>,
}

impl<F: Field> QueryBuilder<F, Flavor> {
    /// 使用当前全局默认 Flavor 构造。
    pub fn new() -> Self {
        Self::with_dialect(default_flavor())
    }

    pub fn set_flavor(&mut self, flavor: Flavor) -> Flavor {
        std::mem::replace(&mut self.dialect, flavor)
    }

    pub fn flavor(&self) -> Flavor {
        self.dialect
    }
}

impl<F: Field> Default for QueryBuilder<F, Flavor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field, D: Dialect> QueryBuilder<F, D> {
    pub fn with_dialect(dialect: D) -> Self {
        Self {
            dialect,
            args: Args::new(),
            fields: None,
            select_clause: ClauseBuffer::new(),
            from_clause: ClauseBuffer::new(),
            where_clause: ClauseBuffer::new(),
            group_by_clause: ClauseBuffer::new(),
            order_by_clause: ClauseBuffer::new(),
            limit_clause: ClauseBuffer::new(),
            offset_clause: ClauseBuffer::new(),
            having: false,
            misuse: None,
            select_misuse: None,
            where_misuse: None,
        }
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// 重写 SELECT 子句，并记录所选列（供调用方扫描行时使用）。
    ///
    /// 空列表会输出 `SELECT `、`fields()` 返回 `None`，并记录 [`BuildError::EmptySelect`]，
    /// 直到下一次 `select`/`select_count`。
    pub fn select<I>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
    {
        let cols: Vec<F> = cols.into_iter().collect();
        self.select_clause.reset();
        self.select_clause.write_str("SELECT ");
        self.select_clause.write_idents(&cols);
        if cols.is_empty() {
            self.fields = None;
            self.select_misuse = Some(BuildError::EmptySelect);
        } else {
            self.fields = Some(cols);
            self.select_misuse = None;
        }
        self
    }

    /// 重写 SELECT 子句为 `SELECT COUNT(*)` 或 `SELECT COUNT(c1, ...)`，并清空 `fields`。
    pub fn select_count<I>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
    {
        let cols: Vec<F> = cols.into_iter().collect();
        self.select_clause.reset();
        self.select_clause.write_str("SELECT COUNT(");
        if cols.is_empty() {
            self.select_clause.write_str("*");
        } else {
            self.select_clause.write_idents(&cols);
        }
        self.select_clause.write_str(")");
        self.fields = None;
        self.select_misuse = None;
        self
    }

    /// 重写 FROM 子句。表名原样输出。
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from_clause.reset();
        self.write_table(" FROM ", table, None);
        self
    }

    /// 重写 FROM 子句，带别名。
    pub fn from_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.from_clause.reset();
        self.write_table(" FROM ", table, Some(alias));
        self
    }

    /// 在 FROM 子句后追加 `JOIN <table>`；多次调用按顺序累积。
    pub fn join(&mut self, table: &str) -> &mut Self {
        self.write_table(" JOIN ", table, None);
        self
    }

    pub fn join_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.write_table(" JOIN ", table, Some(alias));
        self
    }

    fn write_table(&mut self, keyword: &str, table: &str, alias: Option<&str>) {
        self.from_clause.write_str(keyword);
        self.from_clause.write_str(table);
        if let Some(alias) = alias {
            self.from_clause.write_str(" ");
            self.from_clause.write_str(alias);
        }
    }

    /// 重写 WHERE 子句为 `WHERE <col>`，返回等待比较运算符的 [`WhereContinuation`]。
    ///
    /// 之前的谓词、参数以及属于它们的误用都会被丢弃。
    pub fn where_(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" WHERE ", col, Wrap::None, true)
    }

    pub fn where_lower(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" WHERE ", col, Wrap::Lower, true)
    }

    pub fn where_upper(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" WHERE ", col, Wrap::Upper, true)
    }

    /// 追加 `AND <col>`。WHERE 尚未开始时改为输出 `WHERE <col>`，并记录
    /// [`BuildError::PredicateWithoutWhere`]。
    pub fn and(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" AND ", col, Wrap::None, false)
    }

    pub fn and_lower(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" AND ", col, Wrap::Lower, false)
    }

    pub fn and_upper(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" AND ", col, Wrap::Upper, false)
    }

    /// 追加 `OR <col>`；WHERE 尚未开始时的处理同 [`and`](Self::and)。
    pub fn or(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" OR ", col, Wrap::None, false)
    }

    pub fn or_lower(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" OR ", col, Wrap::Lower, false)
    }

    pub fn or_upper(&mut self, col: F) -> WhereContinuation<'_, F, D> {
        self.open_predicate(" OR ", col, Wrap::Upper, false)
    }

    fn open_predicate(
        &mut self,
        keyword: &str,
        col: F,
        wrap: Wrap,
        restart: bool,
    ) -> WhereContinuation<'_, F, D> {
        // 只有 WHERE 子句会发出占位符，重写 WHERE 时参数一并清空。
        let keyword = if restart {
            self.where_clause.reset();
            self.args.clear();
            self.where_misuse = None;
            keyword
        } else if self.where_clause.is_empty() {
            self.record_where_misuse(BuildError::PredicateWithoutWhere {
                column: col.as_ref().to_string(),
            });
            " WHERE "
        } else {
            keyword
        };
        self.where_clause.write_str(keyword);
        self.where_clause.write_str(wrap.open());
        self.where_clause.write_ident(col.as_ref());
        self.where_clause.write_str(wrap.close());
        WhereContinuation::new(self, col.as_ref().to_string())
    }

    /// 重写 GROUP BY 子句。
    pub fn group_by<I>(&mut self, col: F, more: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
    {
        let mut cols = vec![col];
        cols.extend(more);
        self.group_by_clause.reset();
        self.group_by_clause.write_str(" GROUP BY ");
        self.group_by_clause.write_idents(&cols);
        self.having = false;
        self
    }

    /// 追加 HAVING 条件：第一次输出 `HAVING <cond>`，之后输出 `AND <cond>`。条件原样输出。
    pub fn having(&mut self, condition: &str) -> &mut Self {
        if self.group_by_clause.is_empty() {
            self.record_misuse(BuildError::HavingWithoutGroupBy);
            return self;
        }
        if self.having {
            self.group_by_clause.write_str(" AND ");
        } else {
            self.group_by_clause.write_str(" HAVING ");
            self.having = true;
        }
        self.group_by_clause.write_str(condition);
        self
    }

    /// 重写 ORDER BY 子句。
    pub fn order_by<I>(&mut self, col: F, more: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
    {
        let mut cols = vec![col];
        cols.extend(more);
        self.order_by_clause.reset();
        self.order_by_clause.write_str(" ORDER BY ");
        self.order_by_clause.write_idents(&cols);
        self
    }

    /// 在已有的 ORDER BY 后追加 `, col`。
    pub fn then_by(&mut self, col: F) -> &mut Self {
        if self.order_by_clause.is_empty() {
            self.record_misuse(BuildError::ThenByWithoutOrderBy);
            return self;
        }
        self.order_by_clause.write_str(", ");
        self.order_by_clause.write_ident(col.as_ref());
        self
    }

    pub fn asc(&mut self) -> &mut Self {
        self.order_direction(" ASC")
    }

    pub fn desc(&mut self) -> &mut Self {
        self.order_direction(" DESC")
    }

    fn order_direction(&mut self, dir: &str) -> &mut Self {
        if self.order_by_clause.is_empty() {
            self.record_misuse(BuildError::OrderDirectionWithoutOrderBy);
            return self;
        }
        self.order_by_clause.write_str(dir);
        self
    }

    /// 重写 LIMIT 子句；数值直接写入 SQL，不占用参数。
    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit_clause.reset();
        self.limit_clause.write_str(" LIMIT ");
        self.limit_clause.write_str(&n.to_string());
        self
    }

    /// 重写 OFFSET 子句；数值直接写入 SQL，不占用参数。
    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset_clause.reset();
        self.offset_clause.write_str(" OFFSET ");
        self.offset_clause.write_str(&n.to_string());
        self
    }

    pub(crate) fn add_param(&mut self, arg: impl Into<Arg>) -> usize {
        self.args.add(arg)
    }

    pub(crate) fn record_misuse(&mut self, err: BuildError) {
        if self.misuse.is_none() {
            self.misuse = Some(err);
        }
    }

    /// 记录属于当前 WHERE 子句的误用。
    pub(crate) fn record_where_misuse(&mut self, err: BuildError) {
        if self.where_misuse.is_none() {
            self.where_misuse = Some(err);
        }
    }

    fn clauses(&self) -> [&ClauseBuffer; 7] {
        [
            &self.select_clause,
            &self.from_clause,
            &self.where_clause,
            &self.group_by_clause,
            &self.order_by_clause,
            &self.limit_clause,
            &self.offset_clause,
        ]
    }

    /// 渲染 SQL（不检查误用）。
    pub fn sql(&self) -> String {
        self.sql_with_dialect(&self.dialect)
    }

    /// 用另一个方言渲染同一组子句；参数列表不变。
    pub fn sql_with_dialect<E: Dialect + ?Sized>(&self, dialect: &E) -> String {
        let mut out = String::new();
        for clause in self.clauses() {
            clause.render(dialect, &mut out);
        }
        out
    }

    /// 渲染 SQL 与参数；记录过误用时返回第一次误用。
    pub fn build(&self) -> Result<(String, Vec<Arg>), BuildError> {
        self.build_with_dialect(&self.dialect)
    }

    pub fn build_with_dialect<E: Dialect + ?Sized>(
        &self,
        dialect: &E,
    ) -> Result<(String, Vec<Arg>), BuildError> {
        if let Some(err) = self.error() {
            return Err(err.clone());
        }
        Ok((self.sql_with_dialect(dialect), self.args.to_vec()))
    }

    /// 按发出顺序返回参数。
    pub fn params(&self) -> &[Arg] {
        self.args.as_slice()
    }

    /// 命名方言使用的参数映射：`param1`、`param2`……
    pub fn params_map(&self) -> BTreeMap<String, Arg> {
        self.args.to_named_map()
    }

    /// 计算所有参数的实际值（调用 `SqlValuer`）。
    pub fn resolved_params(&self) -> Result<Vec<SqlValue>, ValuerError> {
        self.args.resolve_all()
    }

    /// 最近一次 `select` 记录的列；未记录时为 `None`。
    pub fn fields(&self) -> Option<&[F]> {
        self.fields.as_deref()
    }

    /// 当前生效的误用：先看保留到 `reset()` 的，再看 SELECT、WHERE 子句各自的。
    pub fn error(&self) -> Option<&BuildError> {
        self.misuse
            .as_ref()
            .or(self.select_misuse.as_ref())
            .or(self.where_misuse.as_ref())
    }

    /// 所有子句中占位符的个数。
    pub fn placeholder_count(&self) -> usize {
        self.clauses().iter().map(|c| c.placeholder_count()).sum()
    }

    /// 清空所有子句、参数、字段与误用记录，回到刚构造时的状态（方言保留）。
    pub fn reset(&mut self) -> &mut Self {
        self.select_clause.reset();
        self.from_clause.reset();
        self.where_clause.reset();
        self.group_by_clause.reset();
        self.order_by_clause.reset();
        self.limit_clause.reset();
        self.offset_clause.reset();
        self.args.clear();
        self.fields = None;
        self.having = false;
        self.misuse = None;
        self.select_misuse = None;
        self.where_misuse = None;
        self
    }
}

impl<F: Field, D: Dialect> fmt::Display for QueryBuilder<F, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}
