pub mod ai;
pub mod analytics;
pub mod analyzer;
pub mod cache;
pub mod pipeline;
pub mod scrape;
pub mod store;
pub mod templates;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
