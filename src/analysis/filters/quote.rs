use crate::analysis::tokenizer::Tokenizer;

const TYPOGRAPHIC_QUOTES: &[char] = &['\u{2019}', '\u{2018}', '\u{00B4}', '`'];

/// Normalizes typographic apostrophes to `'` and splits elisions such as
/// `l'arbre` into their parts.
pub struct SingleQuoteFilter;

impl Tokenizer for SingleQuoteFilter {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        values.iter()
            .flat_map(|value| {
                value.replace(TYPOGRAPHIC_QUOTES, "'")
                    .split('\'')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn name(&self) -> &str {
        "single_quote"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(SingleQuoteFilter)
    }
}
