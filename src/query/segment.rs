use std::fmt;
use serde::{Serialize, Deserialize};
use crate::core::types::FieldValue;

/// Comparison applied to a field's exact-value index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldMode {
    Exact,
    Prefix,
    Lt,
    Lte,
    Gt,
    Gte,
    Neq,
}

impl FieldMode {
    /// Suffix appended to the field name in the encoded descriptor.
    pub fn marker(&self) -> &'static str {
        match self {
            FieldMode::Exact => "",
            FieldMode::Prefix => "%",
            FieldMode::Lt => "<",
            FieldMode::Lte => "<=",
            FieldMode::Gt => ">",
            FieldMode::Gte => ">=",
            FieldMode::Neq => "!=",
        }
    }

    fn from_marker(marker: &str) -> Self {
        match marker {
            "%" => FieldMode::Prefix,
            "<" => FieldMode::Lt,
            "<=" => FieldMode::Lte,
            ">" => FieldMode::Gt,
            ">=" => FieldMode::Gte,
            "!=" => FieldMode::Neq,
            _ => FieldMode::Exact,
        }
    }
}

/// `(negated, mode, field)`, encoded as `[-]field[marker]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub negated: bool,
    pub mode: FieldMode,
    pub field: String,
}

impl FieldDescriptor {
    pub fn new(field: &str, mode: FieldMode) -> Self {
        FieldDescriptor {
            negated: false,
            mode,
            field: field.to_string(),
        }
    }

    /// Decodes `[-]field[marker]`.
    ///
    /// The leading `-` is stripped first. A trailing `<`, `>` or `=` is a
    /// comparison marker, widened to two characters when preceded by `<`,
    /// `>` or `!`. A trailing `%` marks prefix mode instead.
    pub fn parse(encoded: &str) -> Self {
        let (negated, mut field) = match encoded.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, encoded),
        };

        let mut marker = String::new();
        if let Some(last) = field.chars().last() {
            if matches!(last, '<' | '>' | '=') {
                field = &field[..field.len() - last.len_utf8()];
                marker.push(last);
                if let Some(prev) = field.chars().last() {
                    if matches!(prev, '<' | '>' | '!') {
                        field = &field[..field.len() - prev.len_utf8()];
                        marker.insert(0, prev);
                    }
                }
            } else if last == '%' {
                field = &field[..field.len() - 1];
                marker.push(last);
            }
        }

        FieldDescriptor {
            negated,
            mode: FieldMode::from_marker(&marker),
            field: field.to_string(),
        }
    }

    pub fn negate(&self) -> Self {
        FieldDescriptor {
            negated: !self.negated,
            ..self.clone()
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("-")?;
        }
        write!(f, "{}{}", self.field, self.mode.marker())
    }
}

/// Boolean query tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuerySegment {
    Nothing,
    Field {
        descriptor: FieldDescriptor,
        values: Vec<FieldValue>,
    },
    And(Vec<QuerySegment>),
    Or(Vec<QuerySegment>),
    Not(Box<QuerySegment>),
    Search {
        text: String,
        child: Option<Box<QuerySegment>>,
    },
}

/// One entry of a compiled boolean node.
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled<'a> {
    Values(FieldDescriptor, Vec<FieldValue>),
    Nested(&'a QuerySegment),
}

impl QuerySegment {
    fn field(field: &str, mode: FieldMode, value: impl Into<FieldValue>) -> Self {
        QuerySegment::Field {
            descriptor: FieldDescriptor::new(field, mode),
            values: vec![value.into()],
        }
    }

    pub fn exact(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Exact, value)
    }

    pub fn prefix(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Prefix, value)
    }

    pub fn lt(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Lt, value)
    }

    pub fn lte(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Lte, value)
    }

    pub fn gt(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Gt, value)
    }

    pub fn gte(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Gte, value)
    }

    pub fn neq(field: &str, value: impl Into<FieldValue>) -> Self {
        Self::field(field, FieldMode::Neq, value)
    }

    pub fn bulk_exact<V: Into<FieldValue>>(field: &str, values: impl IntoIterator<Item = V>) -> Vec<Self> {
        values.into_iter().map(|v| Self::exact(field, v)).collect()
    }

    pub fn bulk_prefix<V: Into<FieldValue>>(field: &str, values: impl IntoIterator<Item = V>) -> Vec<Self> {
        values.into_iter().map(|v| Self::prefix(field, v)).collect()
    }

    /// `None` when `segments` is empty.
    pub fn and(segments: impl IntoIterator<Item = QuerySegment>) -> Option<Self> {
        let children: Vec<_> = segments.into_iter().collect();
        if children.is_empty() { None } else { Some(QuerySegment::And(children)) }
    }

    pub fn or(segments: impl IntoIterator<Item = QuerySegment>) -> Option<Self> {
        let children: Vec<_> = segments.into_iter().collect();
        if children.is_empty() { None } else { Some(QuerySegment::Or(children)) }
    }

    /// Negated copy. Field leaves toggle their descriptor, so negating twice
    /// yields the original segment.
    pub fn not(segment: &QuerySegment) -> Self {
        match segment {
            QuerySegment::Field { descriptor, values } => QuerySegment::Field {
                descriptor: descriptor.negate(),
                values: values.clone(),
            },
            QuerySegment::Not(inner) => (**inner).clone(),
            other => QuerySegment::Not(Box::new(other.clone())),
        }
    }

    pub fn search(text: &str, child: Option<QuerySegment>) -> Self {
        QuerySegment::Search {
            text: text.to_string(),
            child: child.map(Box::new),
        }
    }

    /// Descriptor → values for leaf children, nested nodes kept as is.
    /// Leaves sharing a descriptor are merged in first-seen position.
    pub fn compile(&self) -> Vec<Compiled<'_>> {
        let mut compiled = Vec::new();
        match self {
            QuerySegment::And(children) | QuerySegment::Or(children) => {
                for child in children {
                    child.compile_into(&mut compiled);
                }
            }
            other => other.compile_into(&mut compiled),
        }
        compiled
    }

    fn compile_into<'a>(&'a self, compiled: &mut Vec<Compiled<'a>>) {
        match self {
            QuerySegment::Nothing => {}
            QuerySegment::Field { descriptor, values } => {
                let existing = compiled.iter_mut().find_map(|entry| match entry {
                    Compiled::Values(d, v) if d == descriptor => Some(v),
                    _ => None,
                });
                match existing {
                    Some(existing) => existing.extend(values.iter().cloned()),
                    None => compiled.push(Compiled::Values(descriptor.clone(), values.clone())),
                }
            }
            nested => compiled.push(Compiled::Nested(nested)),
        }
    }

    /// Every leaf value and free text of the subtree, rendered as text.
    pub fn terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        self.collect_terms(&mut terms);
        terms
    }

    fn collect_terms(&self, terms: &mut Vec<String>) {
        match self {
            QuerySegment::Nothing => {}
            QuerySegment::Field { values, .. } => {
                terms.extend(values.iter().map(FieldValue::as_text));
            }
            QuerySegment::And(children) | QuerySegment::Or(children) => {
                for child in children {
                    child.collect_terms(terms);
                }
            }
            QuerySegment::Not(inner) => inner.collect_terms(terms),
            QuerySegment::Search { text, child } => {
                if !text.is_empty() {
                    terms.push(text.clone());
                }
                if let Some(child) = child {
                    child.collect_terms(terms);
                }
            }
        }
    }

    /// Human readable rendering, e.g.
    /// `SEARCH hello WITH (title:"a" AND NOT date<:"2020")`.
    pub fn debug(&self) -> String {
        match self {
            QuerySegment::Nothing => String::new(),
            QuerySegment::Field { .. } => self.debug_entries("AND"),
            QuerySegment::And(_) => self.debug_entries("AND"),
            QuerySegment::Or(_) => self.debug_entries("OR"),
            QuerySegment::Not(inner) => format!("NOT {}", inner.debug_nested()),
            QuerySegment::Search { text, child } => {
                let inner = child.as_ref().map(|c| c.debug_nested()).unwrap_or_default();
                match (text.is_empty(), inner.is_empty()) {
                    (true, _) => inner,
                    (false, true) => format!("SEARCH {}", text),
                    (false, false) => format!("SEARCH {} WITH {}", text, inner),
                }
            }
        }
    }

    fn debug_nested(&self) -> String {
        match self {
            QuerySegment::And(_) | QuerySegment::Or(_) => format!("({})", self.debug()),
            _ => self.debug(),
        }
    }

    fn debug_entries(&self, operator: &str) -> String {
        let mut parts = Vec::new();
        for entry in self.compile() {
            match entry {
                Compiled::Values(descriptor, values) => {
                    let prefix = if descriptor.negated { "NOT " } else { "" };
                    let name = format!("{}{}", descriptor.field, descriptor.mode.marker());
                    for value in values {
                        parts.push(format!("{}{}:\"{}\"", prefix, name, value.as_text()));
                    }
                }
                Compiled::Nested(segment) => parts.push(segment.debug_nested()),
            }
        }
        parts.join(&format!(" {} ", operator))
    }
}
