pub mod batch;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod transaction;
