use std::sync::Arc;
use log::debug;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::analysis::analyzer::AnalyzerRegistry;
use crate::core::config::{Config, ConnexConfig};
use crate::core::error::Result;
use crate::core::stats::IndexStats;
use crate::core::types::DocId;
use crate::index::field_index::FieldIndexes;
use crate::index::inverted::InvertedIndex;
use crate::index::posting::ScoreMap;
use crate::query::builder::{Query, QueryBuilder, SearchFilters};
use crate::query::cache::{cache_key, ResponseCache};
use crate::query::segment::QuerySegment;
use crate::schema::schema::SchemaRegistry;
use crate::search::connex::ConnexExpander;
use crate::search::executor::QueryExecutor;
use crate::search::fuzzy::{char_position, suggest_terms, FuzzyMatcher};
use crate::search::results::{paginate, rank, ConnexResponse, ResultCompiler, SearchResponse};
use crate::storage::directory::Directory;
use crate::storage::layout::StorageLayout;
use crate::storage::store::{FsStore, MemoryStore, Store};
use crate::writer::batch::BatchWriter;
use crate::writer::index_writer::{IndexWriter, RebuildError};

const MAX_SUGGESTIONS: usize = 10;

/// How `Database::suggest_field` marks the matched part of a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanWrap {
    Plain,
    Span,
    Class(String),
}

impl SpanWrap {
    fn open_tag(&self) -> Option<String> {
        match self {
            SpanWrap::Plain => None,
            SpanWrap::Span => Some("<span>".to_string()),
            SpanWrap::Class(class) => Some(format!("<span class=\"{}\">", class)),
        }
    }
}

/// Canonical form of a search request for the response cache. Free text is
/// reduced to its distinct tokens so "Hello  world" and "world hello" share
/// an entry.
#[derive(Serialize)]
enum CachedQuery<'a> {
    Search {
        tokens: Vec<String>,
        child: Option<&'a QuerySegment>,
    },
    Segment(&'a QuerySegment),
}

/// Everything a cached response depends on.
#[derive(Serialize)]
struct CacheRequest<'a> {
    query: CachedQuery<'a>,
    filters: &'a SearchFilters,
    fuzzy_cost: usize,
    approximate_limit: Option<usize>,
    connex: &'a ConnexConfig,
}

pub struct Database {
    config: Config,
    layout: Option<StorageLayout>,

    analyzers: Arc<AnalyzerRegistry>,
    inverted: Arc<InvertedIndex>,
    fields: Arc<FieldIndexes>,
    documents: Arc<Directory>,
    cache: Arc<ResponseCache>,

    writer: IndexWriter, // single writer over every namespace
}

impl Database {
    /// Opens (or creates) a file-backed index under `config.storage_path`.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let layout = StorageLayout::new(&config)?;

        let index = FsStore::open(&layout.index_dir)?;
        let vectors = FsStore::open(&layout.vectors_dir)?;
        let documents = FsStore::open(&layout.documents_dir)?;
        let cache = FsStore::open(&layout.cache_dir)?;

        Self::assemble(
            config,
            Some(layout),
            Box::new(index),
            Box::new(vectors),
            Box::new(documents),
            Box::new(cache),
        )
    }

    /// Volatile index, nothing touches the disk.
    pub fn open_in_memory(config: Config) -> Result<Self> {
        config.validate()?;
        Self::assemble(
            config,
            None,
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
        )
    }

    fn assemble(
        config: Config,
        layout: Option<StorageLayout>,
        index: Box<dyn Store>,
        vectors: Box<dyn Store>,
        documents: Box<dyn Store>,
        cache: Box<dyn Store>,
    ) -> Result<Self> {
        let analyzers = Arc::new(AnalyzerRegistry::from_types(&config.types)?);
        let schemas = Arc::new(SchemaRegistry::new(config.schemas.clone()));

        let index = Arc::new(Directory::new(index, config.compression, config.keep_files_open));
        let vectors = Arc::new(Directory::new(vectors, config.compression, false));
        let documents = Arc::new(Directory::new(documents, config.compression, false));
        let cached = Arc::new(Directory::new(cache, config.compression, false));

        let inverted = Arc::new(InvertedIndex::new(index.clone(), vectors));
        let fields = Arc::new(FieldIndexes::new(index));
        let cache = Arc::new(ResponseCache::new(cached, config.cache_size));

        let writer = IndexWriter::new(
            inverted.clone(),
            fields.clone(),
            documents.clone(),
            analyzers.clone(),
            schemas,
            cache.clone(),
        );

        Ok(Database {
            config,
            layout,
            analyzers,
            inverted,
            fields,
            documents,
            cache,
            writer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// On-disk layout, `None` for in-memory databases.
    pub fn layout(&self) -> Option<&StorageLayout> {
        self.layout.as_ref()
    }

    pub fn update(&self, document: &Value) -> Result<DocId> {
        self.writer.update(document)
    }

    /// Batch ingestion. On failure the documents indexed so far stay
    /// indexed and the cache is still invalidated.
    pub fn update_multiple(&self, documents: &[Value]) -> Result<usize> {
        let mut batch = BatchWriter::new(&self.writer, self.config.batch_free_interval);
        for document in documents {
            if let Err(e) = batch.add(document) {
                batch.finish()?;
                return Err(e);
            }
        }
        batch.finish()
    }

    /// Returns whether the document existed.
    pub fn delete(&self, id: impl Into<DocId>) -> Result<bool> {
        self.writer.delete(&id.into())
    }

    pub fn rebuild(&self) -> Result<Vec<RebuildError>> {
        self.writer.rebuild()
    }

    pub fn get_document(&self, id: impl Into<DocId>) -> Result<Option<Value>> {
        let id: DocId = id.into();
        self.documents.open_json(id.as_str())
    }

    pub fn search(&self, query: impl Into<Query>, filters: &SearchFilters) -> Result<SearchResponse> {
        let query: Query = query.into();
        let segment = query.to_segment()?;

        let key = cache_key("search", &self.cache_request(&segment, filters))?;
        if let Some(response) = self.cache.get::<SearchResponse>(&key)? {
            return Ok(response);
        }

        let response = self.execute(&segment, filters)?;
        self.cache.put(&key, &response)?;
        Ok(response)
    }

    pub fn search_with(&self, builder: QueryBuilder) -> Result<SearchResponse> {
        let (query, filters) = builder.build();
        self.search(query, &filters)
    }

    fn cache_request<'a>(&'a self, segment: &'a QuerySegment, filters: &'a SearchFilters) -> CacheRequest<'a> {
        let query = match segment {
            QuerySegment::Search { text, child } => {
                let mut tokens = self.analyzers.tokenize_query(text);
                tokens.sort();
                tokens.dedup();
                CachedQuery::Search {
                    tokens,
                    child: child.as_deref(),
                }
            }
            segment => CachedQuery::Segment(segment),
        };

        CacheRequest {
            query,
            filters,
            fuzzy_cost: self.config.fuzzy_cost,
            approximate_limit: self.config.approximate_limit,
            connex: &self.config.connex,
        }
    }

    fn execute(&self, segment: &QuerySegment, filters: &SearchFilters) -> Result<SearchResponse> {
        let mut matcher = FuzzyMatcher::new(&self.inverted, self.config.fuzzy_cost, self.config.approximate_limit);
        let executor = QueryExecutor::new(&self.fields, &self.analyzers, &self.documents);
        let results = executor.evaluate(segment, &mut matcher)?;
        debug!(
            "Evaluated {} into {} results ({} approximate lookups)",
            segment.debug(),
            results.len(),
            matcher.approximate_calls()
        );

        let compiler = ResultCompiler::new(&self.fields, &self.documents);
        let connex = if filters.connex && !results.is_empty() {
            self.connex(&compiler, &results, segment)?
        } else {
            None
        };

        compiler.compile(&results, filters, !executor.is_match_all(segment), connex)
    }

    fn connex(&self, compiler: &ResultCompiler, results: &ScoreMap, segment: &QuerySegment) -> Result<Option<ConnexResponse>> {
        let search_terms: Vec<String> = segment.terms()
            .iter()
            .flat_map(|term| self.analyzers.tokenize_query(term))
            .collect();

        let expander = ConnexExpander::new(&self.inverted, &self.config.connex);
        let Some(expansion) = expander.expand(&rank(results), &search_terms)? else {
            return Ok(None);
        };

        let page = paginate(&rank(&expansion.documents), 0, Some(self.config.connex.limit_docs));
        Ok(Some(ConnexResponse {
            tokens: expansion.tokens,
            documents: compiler.materialize(&page)?,
        }))
    }

    /// Completes the last word of `query` with registry terms, keeping the
    /// preceding words.
    pub fn suggest(&self, query: &str) -> Result<Vec<String>> {
        let mut words: Vec<&str> = query.split(' ').collect();
        let last = words.pop().unwrap_or_default();
        let before = words.join(" ");

        let mut suggestions: Vec<String> = Vec::new();
        for token in self.analyzers.tokenize_query(last) {
            for (term, _) in self.suggest_token(&token)? {
                if !suggestions.contains(&term) {
                    suggestions.push(term);
                }
            }
        }

        Ok(suggestions.into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|term| if before.is_empty() { term } else { format!("{} {}", before, term) })
            .collect())
    }

    /// Registry terms containing `token` with their match position, best
    /// first.
    pub fn suggest_token(&self, token: &str) -> Result<Vec<(String, usize)>> {
        if token.is_empty() {
            return Ok(Vec::new());
        }

        let key = cache_key("suggest_token", &token)?;
        if let Some(cached) = self.cache.get(&key)? {
            return Ok(cached);
        }

        let terms: Vec<String> = self.inverted.registry()?.into_keys().collect();
        let matching = suggest_terms(&terms, token);
        self.cache.put(&key, &matching)?;
        Ok(matching)
    }

    /// Lowercased values of `field` containing `value`, best match position
    /// first.
    pub fn suggest_field(&self, field: &str, value: &str, wrap: &SpanWrap) -> Result<Vec<String>> {
        let key = cache_key("suggest_field", &(field, value, wrap))?;
        if let Some(cached) = self.cache.get(&key)? {
            return Ok(cached);
        }

        let Some(index) = self.fields.exact(field)? else {
            return Ok(Vec::new());
        };
        let needle = value.to_lowercase();
        let tag = wrap.open_tag();

        let mut matching: Vec<(String, usize)> = Vec::new();
        for raw in index.keys() {
            let candidate = raw.as_str().to_lowercase();
            let Some(position) = char_position(&candidate, &needle) else {
                continue;
            };
            let rendered = match &tag {
                Some(tag) if !needle.is_empty() => {
                    candidate.replace(&needle, &format!("{}{}</span>", tag, needle))
                }
                _ => candidate,
            };
            if !matching.iter().any(|(existing, _)| *existing == rendered) {
                matching.push((rendered, position));
            }
        }
        matching.sort_by_key(|(_, position)| *position);

        let matching: Vec<String> = matching.into_iter().map(|(value, _)| value).collect();
        self.cache.put(&key, &matching)?;
        Ok(matching)
    }

    /// Query text as the evaluator sees it.
    pub fn tokenize_query(&self, text: &str) -> Vec<String> {
        self.analyzers.tokenize_query(text)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            document_count: self.documents.len()?,
            total_tokens: self.inverted.registry()?.len(),
            shard_count: self.inverted.shard_count()?,
            cache_entries: self.cache.len()?,
            cache: self.cache.stats(),
        })
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.writer.clear_cache()
    }

    pub fn free_memory(&self) {
        self.writer.free();
    }
}
