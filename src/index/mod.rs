pub mod field_index;
pub mod inverted;
pub mod posting;
