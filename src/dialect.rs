//! Dialect：标识符、占位符与数组谓词的渲染策略。
//!
//! 子句拼接逻辑只依赖这个 trait；内置实现见 [`Flavor`]。

use crate::flavor::Flavor;

/// 后端方言的渲染规则。
pub trait Dialect {
    /// 写入一个列名；默认只在 [`needs_quoting`] 为真时加引号。
    fn render_identifier(&self, name: &str, out: &mut String);

    /// 写入第 `index_1_based` 个参数的占位符。
    fn render_placeholder(&self, index_1_based: usize, out: &mut String);

    /// 写入“等于数组中任意一个值”的谓词（含前导空格），整个数组只绑定一个占位符。
    fn render_array_predicate(&self, index_1_based: usize, out: &mut String) {
        out.push_str(" = ");
        self.render_placeholder(index_1_based, out);
    }
}

/// 列名是否需要加引号：包含空白、`-`、`.`、ASCII 大写字母或任一方言的引号字符。
pub fn needs_quoting(name: &str) -> bool {
    name.chars().any(|c| {
        c.is_whitespace()
            || c.is_ascii_uppercase()
            || matches!(c, '-' | '.' | '"' | '`' | '[' | ']')
    })
}

impl Dialect for Flavor {
    fn render_identifier(&self, name: &str, out: &mut String) {
        if needs_quoting(name) {
            out.push_str(&self.quote(name));
        } else {
            out.push_str(name);
        }
    }

    fn render_placeholder(&self, index_1_based: usize, out: &mut String) {
        match self {
            Self::PostgreSQL => {
                out.push('$');
                out.push_str(&index_1_based.to_string());
            }
            Self::Spanner => {
                out.push_str("@param");
                out.push_str(&index_1_based.to_string());
            }
            Self::SQLServer => {
                out.push_str("@p");
                out.push_str(&index_1_based.to_string());
            }
            Self::MySQL | Self::SQLite => out.push('?'),
        }
    }

    fn render_array_predicate(&self, index_1_based: usize, out: &mut String) {
        match self {
            Self::PostgreSQL => {
                out.push_str(" = ANY(");
                self.render_placeholder(index_1_based, out);
                out.push(')');
            }
            Self::Spanner => {
                out.push_str(" IN UNNEST(");
                self.render_placeholder(index_1_based, out);
                out.push(')');
            }
            // 由驱动在服务端展开数组
            Self::MySQL | Self::SQLite | Self::SQLServer => {
                out.push_str(" = ");
                self.render_placeholder(index_1_based, out);
            }
        }
    }
}

impl<D: Dialect + ?Sized> Dialect for &D {
    fn render_identifier(&self, name: &str, out: &mut String) {
        (**self).render_identifier(name, out)
    }

    fn render_placeholder(&self, index_1_based: usize, out: &mut String) {
        (**self).render_placeholder(index_1_based, out)
    }

    fn render_array_predicate(&self, index_1_based: usize, out: &mut String) {
        (**self).render_array_predicate(index_1_based, out)
    }
}
