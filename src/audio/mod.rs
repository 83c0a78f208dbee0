pub mod decoder;
pub mod engine;
pub mod fetch;
pub mod types;
