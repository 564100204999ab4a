//! 宏集合：为 builder 提供可变参数调用封装，以及按表生成列名枚举的 `fields!`。

/// 为 `QueryBuilder::select` 提供可变参数调用。
#[macro_export]
macro_rules! select_fields {
    ($builder:expr $(, $col:expr)* $(,)?) => {
        $builder.select([$($col),*])
    };
}
pub use crate::select_fields;

/// 为 `QueryBuilder::group_by` 提供可变参数调用（至少一列）。
#[macro_export]
macro_rules! group_by_fields {
    ($builder:expr, $first:expr $(, $col:expr)* $(,)?) => {
        $builder.group_by($first, [$($col),*])
    };
}
pub use crate::group_by_fields;

/// 为 `QueryBuilder::order_by` 提供可变参数调用（至少一列）。
#[macro_export]
macro_rules! order_by_fields {
    ($builder:expr, $first:expr $(, $col:expr)* $(,)?) => {
        $builder.order_by($first, [$($col),*])
    };
}
pub use crate::order_by_fields;

/// 为 `WhereContinuation::in_` 提供可混合类型的可变参数调用。
#[macro_export]
macro_rules! in_values {
    ($cont:expr $(, $value:expr)* $(,)?) => {
        $cont.in_(::std::vec![$($crate::Arg::from($value)),*] as ::std::vec::Vec<$crate::Arg>)
    };
}
pub use crate::in_values;

/// 按表声明列名枚举：实现 `AsRef<str>`、`Display`，并提供 `ALL`/`all()`/`from_name()`。
///
/// ```
/// halo_space::fields! {
///     pub enum IncomeField {
///         IncomeId => "income_id",
///         IncomeAmount => "income_amount",
///     }
/// }
///
/// assert_eq!(IncomeField::IncomeAmount.as_str(), "income_amount");
/// ```
#[macro_export]
macro_rules! fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $col:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            /// 表中全部列，按声明顺序。
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn all() -> ::std::vec::Vec<$name> {
                Self::ALL.to_vec()
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $col),+
                }
            }

            pub fn from_name(name: &str) -> ::std::option::Option<Self> {
                match name {
                    $($col => ::std::option::Option::Some($name::$variant),)+
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
pub use crate::fields;
