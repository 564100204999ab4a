//! ClauseBuffer：单个子句的累积内容。
//!
//! 字面文本按写入顺序拼接；列名与占位符只记录“是什么”，等渲染时再交给 [`Dialect`]，
//! 因此同一个 builder 可以按不同方言输出。

use crate::dialect::Dialect;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Ident(String),
    Param(usize),
    ArrayParam(usize),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ClauseBuffer {
    segments: Vec<Segment>,
}

impl ClauseBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(s);
        } else {
            self.segments.push(Segment::Text(s.to_string()));
        }
    }

    pub(crate) fn write_ident(&mut self, name: &str) {
        self.segments.push(Segment::Ident(name.to_string()));
    }

    /// 逗号分隔写入一组列名。
    pub(crate) fn write_idents<F: AsRef<str>>(&mut self, names: &[F]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.write_str(", ");
            }
            self.write_ident(name.as_ref());
        }
    }

    pub(crate) fn write_param(&mut self, index_1_based: usize) {
        self.segments.push(Segment::Param(index_1_based));
    }

    pub(crate) fn write_array_param(&mut self, index_1_based: usize) {
        self.segments.push(Segment::ArrayParam(index_1_based));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn reset(&mut self) {
        self.segments.clear();
    }

    pub(crate) fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_) | Segment::ArrayParam(_)))
            .count()
    }

    pub(crate) fn render<D: Dialect + ?Sized>(&self, dialect: &D, out: &mut String) {
        for seg in &self.segments {
            match seg {
                Segment::Text(s) => out.push_str(s),
                Segment::Ident(name) => dialect.render_identifier(name, out),
                Segment::Param(idx) => dialect.render_placeholder(*idx, out),
                Segment::ArrayParam(idx) => dialect.render_array_predicate(*idx, out),
            }
        }
    }
}
