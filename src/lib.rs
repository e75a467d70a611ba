pub mod core;
pub mod storage;
pub mod analysis;
pub mod schema;
pub mod index;
pub mod search;
pub mod query;
pub mod writer;

pub use crate::core::config::Config;
pub use crate::core::database::{Database, SpanWrap};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{DocId, FieldValue};
pub use crate::query::builder::{Direction, Query, QueryBuilder, SearchFilters};
pub use crate::query::segment::QuerySegment;
pub use crate::schema::schema::{FieldDefinition, FieldType};
pub use crate::search::results::SearchResponse;

/*
┌──────────────────────────────────── LEXIDEX LAYOUT ─────────────────────────────────────┐
│                                                                                         │
│  struct Database                                                                        │
│  • config: Config               • analyzers: Arc<AnalyzerRegistry>                      │
│  • inverted: Arc<InvertedIndex> • fields: Arc<FieldIndexes>                             │
│  • documents: Arc<Directory>    • cache: Arc<ResponseCache>                             │
│  • writer: IndexWriter          (single writer, retract before reinsert)                │
│                                                                                         │
│  write path                                                                             │
│    Value ─► DocumentBuilder ─► (stored Map, TermVector, Vec<FieldEntry>)                │
│          ─► FieldIndexes::apply (exact_ / values_ / facet_)                             │
│          ─► InvertedIndex::upsert (t_<hex> shards, "all" registry, docs/<id>)           │
│          ─► documents/<id>  ─► ResponseCache::clear                                     │
│                                                                                         │
│  read path                                                                              │
│    Query ─► QuerySegment ─► QueryExecutor (FuzzyMatcher) ─► ScoreMap                    │
│          ─► ConnexExpander (optional) ─► ResultCompiler ─► SearchResponse ─► cache      │
│                                                                                         │
│  storage                                                                                │
│    Directory (typed, Mergeable) ─► codec [crc32][tag][bincode/lz4] ─► Store (fs, mem)   │
└─────────────────────────────────────────────────────────────────────────────────────────┘
*/
