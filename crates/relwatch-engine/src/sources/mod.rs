//! Concrete entity sources.

pub mod file;

pub use file::JsonFileSource;
