use crate::analysis::tokenizer::Tokenizer;

/// Characters stripped from both ends of every token.
pub const TRIMMED_PUNCTUATION: &[char] = &[
    ',', '?', ';', '.', ':', '!', '(', ')', '/', '\\', '-', '_', '\'', '"',
];

pub struct TrimPunctuationFilter;

impl Tokenizer for TrimPunctuationFilter {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        values.into_iter()
            .map(|value| value.trim_matches(TRIMMED_PUNCTUATION).to_string())
            .collect()
    }

    fn name(&self) -> &str {
        "trim_punctuation"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(TrimPunctuationFilter)
    }
}
