pub mod connex;
pub mod executor;
pub mod fuzzy;
pub mod results;
