//! WhereContinuation：已写入列名、尚未写入比较运算符的谓词。
//!
//! 只有这里的方法能闭合谓词；每个方法消费 continuation 并把 builder 交还给调用方，
//! 因此一次 `where_`/`and`/`or` 恰好对应一个运算符。

use crate::args::Arg;
use crate::builder::{BuildError, QueryBuilder};
use crate::dialect::Dialect;
use crate::field::Field;
use crate::value::SqlValue;

#[must_use = "a predicate must be closed with an operator such as `eq` or `in_`"]
pub struct WhereContinuation<'a, F, D> {
    builder: &'a mut QueryBuilder<F, D>,
    column: String,
}

impl<'a, F: Field, D: Dialect> WhereContinuation<'a, F, D> {
    pub(crate) fn new(builder: &'a mut QueryBuilder<F, D>, column: String) -> Self {
        Self { builder, column }
    }

    /// 当前谓词的列名。
    pub fn column(&self) -> &str {
        &self.column
    }

    fn binary(self, op: &str, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        let idx = self.builder.add_param(value);
        let wc = &mut self.builder.where_clause;
        wc.write_str(op);
        wc.write_param(idx);
        self.builder
    }

    fn keyword(self, text: &str) -> &'a mut QueryBuilder<F, D> {
        self.builder.where_clause.write_str(text);
        self.builder
    }

    /// `= p`
    pub fn eq(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" = ", value)
    }

    /// `!= p`
    pub fn not_equal(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" != ", value)
    }

    /// `IS p`，用于三态布尔或 NULL 判断。
    pub fn is(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" IS ", value)
    }

    pub fn is_null(self) -> &'a mut QueryBuilder<F, D> {
        self.keyword(" IS NULL")
    }

    pub fn not_null(self) -> &'a mut QueryBuilder<F, D> {
        self.keyword(" IS NOT NULL")
    }

    pub fn less_than(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" < ", value)
    }

    pub fn gr_than(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" > ", value)
    }

    pub fn less_than_or_eq(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" <= ", value)
    }

    pub fn gr_than_or_eq(self, value: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" >= ", value)
    }

    pub fn like(self, pattern: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        self.binary(" LIKE ", pattern)
    }

    /// `LIKE LOWER(p)`，配合 `where_lower`/`and_lower` 做大小写无关匹配。
    pub fn like_lower(self, pattern: impl Into<Arg>) -> &'a mut QueryBuilder<F, D> {
        let idx = self.builder.add_param(pattern);
        let wc = &mut self.builder.where_clause;
        wc.write_str(" LIKE LOWER(");
        wc.write_param(idx);
        wc.write_str(")");
        self.builder
    }

    /// `BETWEEN p1 AND p2`，参数顺序与实参一致。
    pub fn between(
        self,
        low: impl Into<Arg>,
        high: impl Into<Arg>,
    ) -> &'a mut QueryBuilder<F, D> {
        let lo = self.builder.add_param(low);
        let hi = self.builder.add_param(high);
        let wc = &mut self.builder.where_clause;
        wc.write_str(" BETWEEN ");
        wc.write_param(lo);
        wc.write_str(" AND ");
        wc.write_param(hi);
        self.builder
    }

    /// `IN (p1, p2, ...)`。
    ///
    /// 没有值时输出 `IN (NULL)`（不匹配任何行、SQL 仍然完整），并记录
    /// [`BuildError::EmptyIn`]，`build()` 会返回该错误。
    pub fn in_<I>(self, values: I) -> &'a mut QueryBuilder<F, D>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let idxs: Vec<usize> = values
            .into_iter()
            .map(|v| self.builder.add_param(v))
            .collect();
        if idxs.is_empty() {
            self.builder.where_clause.write_str(" IN (NULL)");
            self.builder.record_where_misuse(BuildError::EmptyIn {
                column: self.column,
            });
            return self.builder;
        }

        let wc = &mut self.builder.where_clause;
        wc.write_str(" IN (");
        for (i, idx) in idxs.into_iter().enumerate() {
            if i > 0 {
                wc.write_str(", ");
            }
            wc.write_param(idx);
        }
        wc.write_str(")");
        self.builder
    }

    /// “等于数组中任意一个值”，整个集合绑定到一个占位符；具体写法由方言决定
    /// （`= ANY($n)`、`IN UNNEST(@paramN)` 等）。
    pub fn any<T, I>(self, values: I) -> &'a mut QueryBuilder<F, D>
    where
        T: Into<SqlValue>,
        I: IntoIterator<Item = T>,
    {
        let idx = self.builder.add_param(SqlValue::array(values));
        self.builder.where_clause.write_array_param(idx);
        self.builder
    }
}
