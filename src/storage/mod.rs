pub mod codec;
pub mod directory;
pub mod layout;
pub mod store;
