//! Args：按发出顺序保存参数，并为命名方言派生 `paramN` 映射。

use crate::value::SqlValue;
use crate::valuer::{SqlValuer, ValuerError};
use std::collections::BTreeMap;

/// 命名参数的名字前缀：第 n 个参数对应 `param{n}`。
pub const NAMED_PARAM_PREFIX: &str = "param";

/// 绑定到占位符的参数。
#[derive(Clone)]
pub enum Arg {
    Value(SqlValue),
    Valuer(Box<dyn SqlValuer>),
}

impl Arg {
    /// 计算实际值；`Valuer` 会在这里被调用。
    pub fn resolve(&self) -> Result<SqlValue, ValuerError> {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Valuer(v) => v.value(),
        }
    }

    pub fn as_value(&self) -> Option<&SqlValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Valuer(_) => None,
        }
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Valuer(v) => f.debug_tuple("Valuer").field(v).finish(),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! arg_from {
    ($($t:ty),+ $(,)?) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Self::Value(v.into())
            }
        })+
    };
}

arg_from!(
    SqlValue,
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &'static str,
    Vec<u8>,
    time::OffsetDateTime,
);

impl<T: Into<SqlValue>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

impl From<Box<dyn SqlValuer>> for Arg {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

/// 有序参数列表；索引即占位符编号减一。
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<Arg>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个参数，返回它的 1-based 占位符编号。
    pub fn add(&mut self, arg: impl Into<Arg>) -> usize {
        self.values.push(arg.into());
        self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Arg] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<Arg> {
        self.values.clone()
    }

    /// 第 `index_1_based` 个参数的命名占位符名（不含 `@`）。
    pub fn param_name(index_1_based: usize) -> String {
        format!("{NAMED_PARAM_PREFIX}{index_1_based}")
    }

    /// 命名映射：`param1 => 第一个参数`……与位置列表一一对应。
    pub fn to_named_map(&self) -> BTreeMap<String, Arg> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, a)| (Self::param_name(i + 1), a.clone()))
            .collect()
    }

    /// 依次计算所有参数的实际值，遇到第一个错误即返回。
    pub fn resolve_all(&self) -> Result<Vec<SqlValue>, ValuerError> {
        self.values.iter().map(Arg::resolve).collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
