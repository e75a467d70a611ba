pub mod date;
pub mod lowercase;
pub mod punctuation;
pub mod quote;
pub mod stemmer;
