//! Scan：把执行器返回的 `SqlValue` 写入行结构体的字段。
//!
//! 生成的 `Table::bind` 通常是一个按列名分派的 `match`，每个分支调用一次 [`scan_into`]。

use crate::value::SqlValue;

/// 扫描/转换错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("builder not enough columns: expected {expected}, got {got}")]
    NotEnoughColumns { expected: usize, got: usize },
    #[error("builder unexpected NULL")]
    UnexpectedNull,
    #[error("builder cannot scan {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("builder integer out of range for {0}")]
    OutOfRange(&'static str),
}

impl SqlValue {
    /// 值的类型名（用于错误信息）。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F64(_) => "f64",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::DateTime(_) => "datetime",
            Self::Array(_) => "array",
        }
    }
}

/// 从 `SqlValue` 转换成自身。
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError>;
}

fn mismatch<T>(expected: &'static str, found: &SqlValue) -> Result<T, ScanError> {
    match found {
        SqlValue::Null => Err(ScanError::UnexpectedNull),
        other => Err(ScanError::TypeMismatch {
            expected,
            found: other.kind(),
        }),
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        Ok(value)
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::String(s) => Ok(s.into_owned()),
            other => mismatch("String", &other),
        }
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::I64(v) => Ok(v),
            SqlValue::U64(v) => i64::try_from(v).map_err(|_| ScanError::OutOfRange("i64")),
            other => mismatch("i64", &other),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        let v = i64::from_sql_value(value).map_err(|e| match e {
            ScanError::TypeMismatch { found, .. } => ScanError::TypeMismatch {
                expected: "i32",
                found,
            },
            other => other,
        })?;
        i32::try_from(v).map_err(|_| ScanError::OutOfRange("i32"))
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::U64(v) => Ok(v),
            SqlValue::I64(v) => u64::try_from(v).map_err(|_| ScanError::OutOfRange("u64")),
            other => mismatch("u64", &other),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::F64(v) => Ok(v),
            SqlValue::I64(v) => Ok(v as f64),
            SqlValue::U64(v) => Ok(v as f64),
            other => mismatch("f64", &other),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Bool(v) => Ok(v),
            SqlValue::I64(0) | SqlValue::U64(0) => Ok(false),
            SqlValue::I64(1) | SqlValue::U64(1) => Ok(true),
            other => mismatch("bool", &other),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Bytes(v) => Ok(v),
            SqlValue::String(s) => Ok(s.into_owned().into_bytes()),
            other => mismatch("bytes", &other),
        }
    }
}

impl FromSqlValue for time::OffsetDateTime {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::DateTime(v) => Ok(v),
            other => mismatch("OffsetDateTime", &other),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ScanError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// 把 `value` 转换后写入 `dest`。
pub fn scan_into<T: FromSqlValue>(dest: &mut T, value: SqlValue) -> Result<(), ScanError> {
    *dest = T::from_sql_value(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scan_string_and_numbers() {
        let mut name = String::new();
        scan_into(&mut name, "bob".into()).unwrap();
        assert_eq!(name, "bob");

        let mut age = 0_i32;
        scan_into(&mut age, SqlValue::I64(18)).unwrap();
        assert_eq!(age, 18);

        let mut amount = 0.0_f64;
        scan_into(&mut amount, SqlValue::I64(3)).unwrap();
        assert_eq!(amount, 3.0);
    }

    #[test]
    fn scan_null_into_option() {
        let mut v: Option<String> = Some("x".to_string());
        scan_into(&mut v, SqlValue::Null).unwrap();
        assert_eq!(v, None);

        scan_into(&mut v, "y".into()).unwrap();
        assert_eq!(v.as_deref(), Some("y"));
    }

    #[test]
    fn scan_null_into_plain_type_fails() {
        let mut v = 0_i64;
        assert_eq!(
            scan_into(&mut v, SqlValue::Null),
            Err(ScanError::UnexpectedNull)
        );
    }

    #[test]
    fn scan_type_mismatch_reports_kinds() {
        let mut v = false;
        assert_eq!(
            scan_into(&mut v, "true".into()),
            Err(ScanError::TypeMismatch {
                expected: "bool",
                found: "string"
            })
        );

        let mut n = 0_i32;
        assert_eq!(
            scan_into(&mut n, SqlValue::Bool(true)),
            Err(ScanError::TypeMismatch {
                expected: "i32",
                found: "bool"
            })
        );
    }

    #[test]
    fn scan_out_of_range() {
        let mut n = 0_i32;
        assert_eq!(
            scan_into(&mut n, SqlValue::I64(i64::MAX)),
            Err(ScanError::OutOfRange("i32"))
        );
        let mut u = 0_u64;
        assert_eq!(
            scan_into(&mut u, SqlValue::I64(-1)),
            Err(ScanError::OutOfRange("u64"))
        );
    }
}
