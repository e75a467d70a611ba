pub mod builder;
pub mod cache;
pub mod segment;
