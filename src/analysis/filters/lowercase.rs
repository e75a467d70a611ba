use crate::analysis::tokenizer::Tokenizer;

pub struct LowercaseFilter;

impl Tokenizer for LowercaseFilter {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        values.into_iter()
            .map(|value| value.to_lowercase())
            .collect()
    }

    fn name(&self) -> &str {
        "lowercase"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(LowercaseFilter)
    }
}
