use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use crate::analysis::filters::date::{DateFormatFilter, DateSplitFilter};
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::punctuation::TrimPunctuationFilter;
use crate::analysis::filters::quote::SingleQuoteFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::token::TermVector;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer, WhitespaceTokenizer};
use crate::core::error::{Error, Result};

/// Pipeline key used when a field type has no pipeline of its own.
pub const DEFAULT_PIPELINE: &str = "_default";

/// Pipeline key used for free-text queries.
pub const SEARCH_PIPELINE: &str = "search";

/// Text analysis pipeline
#[derive(Clone)]
pub struct Analyzer {
    pub stages: Vec<Box<dyn Tokenizer>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String) -> Self {
        Analyzer {
            stages: Vec::new(),
            name,
        }
    }

    pub fn add_stage(mut self, stage: Box<dyn Tokenizer>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Runs every stage in order and drops empty terms.
    pub fn run(&self, values: Vec<String>) -> Vec<String> {
        let mut terms = values;

        for stage in &self.stages {
            terms = stage.tokenize(terms);
        }

        terms.retain(|term| !term.is_empty());
        terms
    }

    /// Each occurrence of a term adds `boost` to it.
    pub fn analyze(&self, values: Vec<String>, boost: f64) -> TermVector {
        let mut vector = TermVector::new();
        for term in self.run(values) {
            vector.add(&term, boost);
        }
        vector
    }

    /// Distinct terms of `text`, in first-seen order.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.analyze(vec![text.to_string()], 0.0)
            .terms()
            .map(str::to_string)
            .collect()
    }

    pub fn standard() -> Self {
        Analyzer::new(DEFAULT_PIPELINE.to_string())
            .add_stage(Box::new(LowercaseFilter))
            .add_stage(Box::new(WhitespaceTokenizer))
            .add_stage(Box::new(SingleQuoteFilter))
            .add_stage(Box::new(TrimPunctuationFilter))
    }
}

/// Field type name → analysis pipeline.
pub struct AnalyzerRegistry {
    analyzers: HashMap<String, Arc<Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        let mut registry = AnalyzerRegistry {
            analyzers: HashMap::new(),
        };

        registry.register(DEFAULT_PIPELINE, Analyzer::standard());
        registry
    }

    /// Builds every configured pipeline; unknown stage names are rejected.
    pub fn from_types(types: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut registry = AnalyzerRegistry::new();

        for (type_name, stage_names) in types {
            let mut analyzer = Analyzer::new(type_name.clone());
            for stage_name in stage_names {
                analyzer = analyzer.add_stage(Self::stage(stage_name)?);
            }
            registry.register(type_name, analyzer);
        }

        Ok(registry)
    }

    /// Built-in stage catalog.
    pub fn stage(name: &str) -> Result<Box<dyn Tokenizer>> {
        let stage: Box<dyn Tokenizer> = match name {
            "lowercase" => Box::new(LowercaseFilter),
            "whitespace" => Box::new(WhitespaceTokenizer),
            "standard" => Box::new(StandardTokenizer::default()),
            "single_quote" => Box::new(SingleQuoteFilter),
            "trim_punctuation" => Box::new(TrimPunctuationFilter),
            "date_format" => Box::new(DateFormatFilter),
            "date_split" => Box::new(DateSplitFilter),
            other => match StemmerFilter::from_name(other) {
                Some(stemmer) => Box::new(stemmer),
                None => {
                    return Err(Error::configuration(format!("Unknown tokenizer stage '{}'", other)));
                }
            },
        };
        Ok(stage)
    }

    pub fn register(&mut self, name: &str, analyzer: Analyzer) {
        self.analyzers.insert(name.to_string(), Arc::new(analyzer));
    }

    /// Pipeline for `type_name`, falling back to `_default`.
    pub fn get(&self, type_name: &str) -> Arc<Analyzer> {
        self.analyzers.get(type_name)
            .or_else(|| self.analyzers.get(DEFAULT_PIPELINE))
            .cloned()
            .unwrap_or_else(|| Arc::new(Analyzer::standard()))
    }

    pub fn tokenize(&self, type_name: &str, values: Vec<String>, boost: f64) -> TermVector {
        self.get(type_name).analyze(values, boost)
    }

    /// Distinct query terms of free text.
    pub fn tokenize_query(&self, text: &str) -> Vec<String> {
        self.get(SEARCH_PIPELINE).terms(text)
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_types;

    #[test]
    fn default_pipeline_normalizes_text() {
        let registry = AnalyzerRegistry::from_types(&default_types()).unwrap();
        let vector = registry.tokenize("string", vec!["Hello, World! hello".to_string()], 10.0);

        assert_eq!(vector.get("hello"), Some(20.0));
        assert_eq!(vector.get("world"), Some(10.0));
        assert_eq!(vector.len(), 2);
    }

    #[test]
    fn datetime_pipeline_decomposes_dates() {
        let registry = AnalyzerRegistry::from_types(&default_types()).unwrap();
        let vector = registry.tokenize("datetime", vec!["2020-01-01T00:00:00+00:00".to_string()], 2.0);
        let terms: Vec<&str> = vector.terms().collect();

        assert_eq!(terms, vec!["2020-01-01T00:00:00+00:00", "2020-01-01", "00:00:00"]);
    }

    #[test]
    fn query_terms_are_distinct() {
        let registry = AnalyzerRegistry::new();
        assert_eq!(registry.tokenize_query("Hello hello WORLD"), vec!["hello", "world"]);
        assert!(registry.tokenize_query("  !!! ").is_empty());
    }

    #[test]
    fn unknown_stage_is_a_configuration_error() {
        let mut types = default_types();
        types.insert("text".to_string(), vec!["soundex".to_string()]);
        let err = AnalyzerRegistry::from_types(&types).err().unwrap();
        assert!(err.is_configuration());
    }
}
