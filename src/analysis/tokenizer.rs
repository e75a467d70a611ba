use unicode_segmentation::UnicodeSegmentation;

/// One stage of an analysis pipeline.
///
/// A stage receives the flattened output of the previous stage (or the raw
/// field values for the first one) and returns its own flat output. Stages
/// are stateless and pure.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, values: Vec<String>) -> Vec<String>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

impl Clone for Box<dyn Tokenizer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Splits values on whitespace.
#[derive(Clone, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        values.iter()
            .flat_map(|value| value.split_whitespace().map(str::to_string))
            .collect()
    }

    fn name(&self) -> &str {
        "whitespace"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(WhitespaceTokenizer)
    }
}

/// Unicode word segmentation (UAX #29); drops punctuation on its own.
#[derive(Clone)]
pub struct StandardTokenizer {
    pub max_token_length: usize,
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        StandardTokenizer {
            max_token_length: 255,
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        let mut tokens = Vec::new();

        for value in &values {
            for word in value.unicode_words() {
                if word.len() <= self.max_token_length {
                    tokens.push(word.to_string());
                }
            }
        }

        tokens
    }

    fn name(&self) -> &str {
        "standard"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn whitespace_split_keeps_punctuation() {
        let tokens = WhitespaceTokenizer.tokenize(strings(&["Hello,  World!", "again"]));
        assert_eq!(tokens, strings(&["Hello,", "World!", "again"]));
    }

    #[test]
    fn standard_tokenizer_segments_words() {
        let tokens = StandardTokenizer::default().tokenize(strings(&["The quick (brown) fox."]));
        assert_eq!(tokens, strings(&["The", "quick", "brown", "fox"]));
    }
}
