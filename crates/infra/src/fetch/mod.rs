//! Binary document download

pub mod binary_fetcher;

pub use binary_fetcher::HttpBinaryFetcher;
