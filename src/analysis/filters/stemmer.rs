use rust_stemmers::{Algorithm, Stemmer};
use crate::analysis::tokenizer::Tokenizer;

/// Emits the stem of each value followed by the value itself, once each.
pub struct StemmerFilter {
    pub algorithm: Algorithm,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter { algorithm }
    }

    /// Resolves `stem_<language>` stage names.
    pub fn from_name(name: &str) -> Option<Self> {
        let algorithm = match name.strip_prefix("stem_")? {
            "english" => Algorithm::English,
            "french" => Algorithm::French,
            "spanish" => Algorithm::Spanish,
            "portuguese" => Algorithm::Portuguese,
            "dutch" => Algorithm::Dutch,
            "russian" => Algorithm::Russian,
            "swedish" => Algorithm::Swedish,
            "german" => Algorithm::German,
            "italian" => Algorithm::Italian,
            _ => return None,
        };
        Some(StemmerFilter::new(algorithm))
    }
}

impl Tokenizer for StemmerFilter {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        let stemmer = Stemmer::create(self.algorithm);

        values.into_iter()
            .flat_map(|value| {
                let stem = stemmer.stem(&value).to_string();
                if stem == value {
                    vec![value]
                } else {
                    vec![stem, value]
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        match self.algorithm {
            Algorithm::English => "stem_english",
            Algorithm::French => "stem_french",
            Algorithm::Spanish => "stem_spanish",
            Algorithm::Portuguese => "stem_portuguese",
            Algorithm::Dutch => "stem_dutch",
            Algorithm::Russian => "stem_russian",
            Algorithm::Swedish => "stem_swedish",
            Algorithm::German => "stem_german",
            Algorithm::Italian => "stem_italian",
            _ => "stemmer",
        }
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(StemmerFilter::new(self.algorithm))
    }
}
