use crate::analysis::tokenizer::Tokenizer;
use crate::core::types::{format_date, parse_date};

/// Re-renders every parseable date as RFC 3339; other values pass through.
pub struct DateFormatFilter;

impl Tokenizer for DateFormatFilter {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        values.into_iter()
            .map(|value| match parse_date(&value) {
                Some(date) => format_date(&date),
                None => value,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "date_format"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(DateFormatFilter)
    }
}

/// Expands `2020-01-01T10:00:00+00:00` into itself, its date part
/// (`2020-01-01`) and its time part (`10:00:00`).
pub struct DateSplitFilter;

fn substring(value: &str, start: usize, len: usize) -> String {
    value.chars().skip(start).take(len).collect()
}

impl Tokenizer for DateSplitFilter {
    fn tokenize(&self, values: Vec<String>) -> Vec<String> {
        values.into_iter()
            .flat_map(|value| {
                let date = substring(&value, 0, 10);
                let time = substring(&value, 11, 8);
                [value, date, time]
            })
            .collect()
    }

    fn name(&self) -> &str {
        "date_split"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(DateSplitFilter)
    }
}
