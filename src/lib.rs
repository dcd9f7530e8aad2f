pub mod cascade;
pub mod error;
pub mod schema;
pub mod source;
