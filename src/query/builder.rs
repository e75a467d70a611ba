use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};
use crate::query::segment::QuerySegment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

/// A search request's query part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    Text(String),
    Segment(QuerySegment),
    /// Field → terms mapping of the removed query-construction API.
    FieldMap(BTreeMap<String, Vec<String>>),
}

impl Query {
    /// Segment form of the request; legacy field maps are rejected.
    pub fn to_segment(&self) -> Result<QuerySegment> {
        match self {
            Query::Text(text) => Ok(QuerySegment::search(text, None)),
            Query::Segment(segment) => Ok(segment.clone()),
            Query::FieldMap(_) => Err(Error::configuration(
                "Field map queries are not supported anymore, use QuerySegment::search(text, segment) instead",
            )),
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<QuerySegment> for Query {
    fn from(segment: QuerySegment) -> Self {
        Query::Segment(segment)
    }
}

/// Ordering, pagination, facets and connex switch of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub limit: Option<usize>,
    pub offset: usize,
    pub order: Vec<(String, Direction)>,
    pub facets: Vec<String>,
    pub connex: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            limit: Some(10),
            offset: 0,
            order: Vec::new(),
            facets: Vec::new(),
            connex: false,
        }
    }
}

impl SearchFilters {
    pub fn unlimited() -> Self {
        SearchFilters {
            limit: None,
            ..Self::default()
        }
    }
}

/// Assembles a `(Query, SearchFilters)` request.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
    filters: SearchFilters,
}

fn removed(method: &str, replacement: &str) -> Error {
    Error::configuration(format!(
        "QueryBuilder::{} is not supported anymore, use {} instead",
        method, replacement
    ))
}

impl QueryBuilder {
    pub fn new(text: &str, child: Option<QuerySegment>) -> Self {
        QueryBuilder {
            query: Query::Segment(QuerySegment::search(text, child)),
            filters: SearchFilters::default(),
        }
    }

    pub fn from_segment(segment: QuerySegment) -> Self {
        QueryBuilder {
            query: Query::Segment(segment),
            filters: SearchFilters::default(),
        }
    }

    pub fn set_query_segment(&mut self, segment: QuerySegment) {
        self.query = Query::Segment(segment);
    }

    /// Replaces any previous ordering.
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.filters.order = vec![(field.to_string(), direction)];
        self
    }

    pub fn add_facet(&mut self, field: &str) {
        if !self.filters.facets.iter().any(|f| f == field) {
            self.filters.facets.push(field.to_string());
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.filters.limit = Some(limit);
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.filters.offset = offset;
    }

    pub fn enable_connex(&mut self) {
        self.filters.connex = true;
    }

    pub fn disable_connex(&mut self) {
        self.filters.connex = false;
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn build(self) -> (Query, SearchFilters) {
        (self.query, self.filters)
    }

    pub fn search(&self, _text: &str) -> Result<()> {
        Err(removed("search", "QuerySegment::search(text, segment)"))
    }

    pub fn exact_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("exact_search", "QuerySegment::exact(field, value)"))
    }

    pub fn add_exact_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("add_exact_search", "QuerySegment::exact(field, value)"))
    }

    pub fn field_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("field_search", "QuerySegment::prefix(field, value)"))
    }

    pub fn add_field_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("add_field_search", "QuerySegment::prefix(field, value)"))
    }

    pub fn lesser_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("lesser_search", "QuerySegment::lt(field, value)"))
    }

    pub fn lesser_equal_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("lesser_equal_search", "QuerySegment::lte(field, value)"))
    }

    pub fn greater_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("greater_search", "QuerySegment::gt(field, value)"))
    }

    pub fn greater_equal_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("greater_equal_search", "QuerySegment::gte(field, value)"))
    }

    pub fn not_equal_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("not_equal_search", "QuerySegment::neq(field, value)"))
    }

    pub fn not_search(&self, _field: &str, _terms: &str) -> Result<()> {
        Err(removed("not_search", "QuerySegment::not(&QuerySegment::prefix(field, value))"))
    }
}
